use std::fmt;

use crate::{Domain, Node, Timestamp};

/// Represents a Universally Unique IDentifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

/// Represents the variant field of a UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum Variant {
    /// NCS backward compatibility (`0xxx`).
    Var0,

    /// RFC4122 layout (`10xx`).
    Var10,

    /// Microsoft backward compatibility (`110x`).
    Var110,

    /// Reserved for future definition (`111x`).
    VarFuture,
}

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Creates a UUIDv1 from its timestamp, clock sequence and node.
    ///
    /// Only the low 60 bits of `timestamp` and the low 14 bits of `sequence` are used.
    pub const fn from_fields_v1(timestamp: Timestamp, sequence: u16, node: &Node) -> Self {
        let ts = timestamp.ticks();
        Self::from_layout(ts as u32, ts, sequence, node, 1)
    }

    /// Creates a UUIDv2 from its domain, local domain identifier, timestamp, clock sequence and
    /// node.
    ///
    /// The identifier replaces the low 32 bits of the timestamp, and the domain replaces the low
    /// byte of the clock sequence.
    pub const fn from_fields_v2(
        domain: Domain,
        id: u32,
        timestamp: Timestamp,
        sequence: u16,
        node: &Node,
    ) -> Self {
        let mut bytes = Self::from_layout(id, timestamp.ticks(), sequence, node, 2).0;
        bytes[9] = domain as u8;
        Self(bytes)
    }

    /// Creates a UUIDv4 from random bytes.
    pub const fn from_random_bytes(mut bytes: [u8; 16]) -> Self {
        bytes[6] = 0x40 | (bytes[6] & 0x0f);
        bytes[8] = 0x80 | (bytes[8] & 0x3f);
        Self(bytes)
    }

    const fn from_layout(low: u32, ts: u64, sequence: u16, node: &Node, version: u8) -> Self {
        let n = node.as_bytes();
        Self([
            (low >> 24) as u8,
            (low >> 16) as u8,
            (low >> 8) as u8,
            low as u8,
            (ts >> 40) as u8,
            (ts >> 32) as u8,
            (version << 4) | ((ts >> 56) as u8 & 0x0f),
            (ts >> 48) as u8,
            0x80 | ((sequence >> 8) as u8 & 0x3f),
            sequence as u8,
            n[0],
            n[1],
            n[2],
            n[3],
            n[4],
            n[5],
        ])
    }

    /// Returns the variant field value of the UUID.
    pub const fn variant(&self) -> Variant {
        match self.0[8] >> 4 {
            0x0..=0x7 => Variant::Var0,
            0x8..=0xb => Variant::Var10,
            0xc..=0xd => Variant::Var110,
            _ => Variant::VarFuture,
        }
    }

    /// Returns the version field value of an RFC4122 UUID, or `None` for other variants.
    pub const fn version(&self) -> Option<u8> {
        match self.variant() {
            Variant::Var10 => Some(self.0[6] >> 4),
            _ => None,
        }
    }

    /// Returns the timestamp of a UUIDv1, or `None` for other versions.
    pub const fn timestamp(&self) -> Option<Timestamp> {
        match self.version() {
            Some(1) => {
                let b = &self.0;
                let ts = (b[6] as u64 & 0x0f) << 56
                    | (b[7] as u64) << 48
                    | (b[4] as u64) << 40
                    | (b[5] as u64) << 32
                    | (b[0] as u64) << 24
                    | (b[1] as u64) << 16
                    | (b[2] as u64) << 8
                    | b[3] as u64;
                Some(Timestamp::from_ticks(ts))
            }
            _ => None,
        }
    }

    /// Returns the 14-bit clock sequence of a UUIDv1, or the 6 high bits of the clock sequence of a
    /// UUIDv2.
    pub const fn clock_sequence(&self) -> u16 {
        let hi = (self.0[8] as u16 & 0x3f) << 8;
        match self.version() {
            Some(2) => hi,
            _ => hi | self.0[9] as u16,
        }
    }

    /// Returns the node field.
    pub const fn node(&self) -> Node {
        let b = &self.0;
        Node::from_bytes([b[10], b[11], b[12], b[13], b[14], b[15]])
    }

    /// Returns the domain and local domain identifier of a UUIDv2, or `None` otherwise.
    pub const fn domain(&self) -> Option<(Domain, u32)> {
        let domain = match (self.version(), self.0[9]) {
            (Some(2), 1) => Domain::User,
            (Some(2), 2) => Domain::Group,
            _ => return None,
        };
        let b = &self.0;
        Some((domain, u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
    }
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i == 4 || i == 6 || i == 8 || i == 10 {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", e)?;
        }
        Ok(())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}
