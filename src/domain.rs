//! DCE security domains used by UUIDv2.

/// Local domain of a DCE security (version 2) UUID.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Domain {
    /// POSIX user ID domain.
    User = 1,

    /// POSIX group ID domain.
    Group = 2,
}

impl Domain {
    /// Returns the identifier of the calling process in this domain: the real user or group ID.
    ///
    /// Platforms without POSIX IDs get `u32::MAX`.
    pub fn local_id(self) -> u32 {
        #[cfg(unix)]
        {
            use nix::unistd::{getgid, getuid};
            match self {
                Domain::User => getuid().as_raw(),
                Domain::Group => getgid().as_raw(),
            }
        }

        #[cfg(not(unix))]
        {
            u32::MAX
        }
    }
}
