//! Random byte sources and the policy applied when they fail.

use rand::{rngs::OsRng, CryptoRng, RngCore};

/// A trait that defines the cryptographically secure byte source of a generator.
///
/// The source seeds random nodes and clock sequences, and fills UUIDv4 values.
pub trait RandomSource: Send {
    /// Fills `dest` with random data, returning the number of bytes written.
    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, rand::Error>;
}

/// An adapter that implements [`RandomSource`] for [`RngCore`] types marked as [`CryptoRng`].
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore + CryptoRng + Send> RandomSource for Adapter<T> {
    fn fill(&mut self, dest: &mut [u8]) -> Result<usize, rand::Error> {
        self.0.try_fill_bytes(dest)?;
        Ok(dest.len())
    }
}

/// Returns the default source backed by the operating system.
pub fn os_random() -> Adapter<OsRng> {
    Adapter(OsRng)
}

/// Decides whether a failed random read is retried.
///
/// Returning `true` retries the read exactly once; returning `false` fails the operation that
/// needed the bytes.
pub type ErrorPolicy = Box<dyn FnMut(&rand::Error) -> bool + Send>;

/// Default policy that treats a failing CSPRNG as fatal to the process.
pub fn abort_on_error(err: &rand::Error) -> bool {
    log::error!(
        "rfc4122: there seems to be a serious problem with the system's CSPRNG: {}",
        err
    );
    panic!("rfc4122: random number generator failed: {err}");
}

/// Fills `dest` from `source`, consulting `policy` once on failure.
pub(crate) fn fill_with_policy(
    source: &mut dyn RandomSource,
    policy: &mut dyn FnMut(&rand::Error) -> bool,
    dest: &mut [u8],
) -> Result<(), rand::Error> {
    match source.fill(dest) {
        Ok(_) => Ok(()),
        Err(err) => {
            log::error!("rfc4122: could not read random bytes: {}", err);
            if policy(&err) {
                source.fill(dest).map(|_| ())
            } else {
                Err(err)
            }
        }
    }
}
