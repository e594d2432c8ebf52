//! Node identifiers and the resolvers that find them.

use std::fmt;

/// Represents the 48-bit spatial component of a time-based UUID.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Node([u8; 6]);

impl Node {
    /// Creates a node from a hardware address or another authentic source.
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Creates a node from random bytes, setting the lowest bit of the first byte to mark it as
    /// randomly generated (RFC4122 Section 4.1.6).
    pub const fn random_from(mut bytes: [u8; 6]) -> Self {
        bytes[0] |= 0x01;
        Self(bytes)
    }

    /// Returns a reference to the underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Returns `true` if the random-indicator bit is set.
    ///
    /// Note that multicast hardware addresses carry the same bit.
    pub const fn is_random(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl From<[u8; 6]> for Node {
    fn from(src: [u8; 6]) -> Self {
        Self(src)
    }
}

impl From<Node> for [u8; 6] {
    fn from(src: Node) -> Self {
        src.0
    }
}

impl fmt::Display for Node {
    /// Returns the colon-separated hexadecimal representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// A trait that supplies the node of a generator.
///
/// Returning `None` makes the generator fall back to a random node.
pub trait NodeResolver: Send {
    /// Looks up the node to use for the lifetime of the generator.
    fn resolve(&mut self) -> Option<Node>;
}

/// Default [`NodeResolver`] that takes the hardware address of the first network interface the
/// host enumerates as up with a non-empty address.
///
/// On targets without `getifaddrs` link addresses, the first non-empty address is taken regardless
/// of the interface state.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct HardwareAddress;

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos"
))]
impl NodeResolver for HardwareAddress {
    fn resolve(&mut self) -> Option<Node> {
        use nix::{ifaddrs, net::if_::InterfaceFlags};

        match ifaddrs::getifaddrs() {
            Ok(interfaces) => first_hardware_address(interfaces.map(|ifa| {
                let up = ifa.flags.contains(InterfaceFlags::IFF_UP);
                let addr = ifa
                    .address
                    .as_ref()
                    .and_then(|addr| addr.as_link_addr())
                    .and_then(|link| link.addr());
                (up, addr)
            })),
            Err(err) => {
                log::debug!("rfc4122: could not enumerate interfaces: {}", err);
                None
            }
        }
    }
}

#[cfg(not(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "ios",
    target_os = "linux",
    target_os = "macos"
)))]
impl NodeResolver for HardwareAddress {
    fn resolve(&mut self) -> Option<Node> {
        match mac_address::get_mac_address() {
            Ok(addr) => first_hardware_address(addr.map(|addr| (true, Some(addr.bytes())))),
            Err(err) => {
                log::debug!("rfc4122: could not enumerate interfaces: {}", err);
                None
            }
        }
    }
}

/// Picks the first address of an interface that is up, skipping missing and all-zero addresses.
fn first_hardware_address<I>(interfaces: I) -> Option<Node>
where
    I: IntoIterator<Item = (bool, Option<[u8; 6]>)>,
{
    let node = interfaces
        .into_iter()
        .filter(|(up, _)| *up)
        .filter_map(|(_, addr)| addr)
        .find(|addr| addr != &[0u8; 6])
        .map(Node);
    match node {
        Some(node) => log::info!("rfc4122: found hardware address [{}]", node),
        None => log::debug!("rfc4122: no interface is up with a hardware address"),
    }
    node
}

/// [`NodeResolver`] serving a preconfigured node, or none at all.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct FixedNode(/** The node served. */ pub Option<Node>);

impl NodeResolver for FixedNode {
    fn resolve(&mut self) -> Option<Node> {
        self.0
    }
}
