use crate::store::StoreError;

/// Error raised by the generator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The random number generator could not supply bytes, even after the retry allowed by the
    /// error policy.
    #[error("random source exhausted: {0}")]
    RandomSource(#[from] rand::Error),

    /// The state store could not be read. The generator drops the store and reports this through
    /// [`Generator::take_error`](crate::Generator::take_error) while generating as if nothing was
    /// saved.
    #[error("persistence unavailable: {0}")]
    Persistence(#[from] StoreError),

    /// The process-wide generator has already been set up.
    #[error("generator already initialized")]
    AlreadyInitialized,
}
