//! Process-wide generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync::OnceLock;

use crate::{Domain, Error, Generator, GeneratorConfig, Uuid};

static GLOBAL_GEN: OnceLock<Generator> = OnceLock::new();

/// Returns the process-wide generator, creating one with the default configuration if none exists.
pub fn global_gen() -> &'static Generator {
    GLOBAL_GEN.get_or_init(|| Generator::new(GeneratorConfig::default()))
}

/// Installs and initializes the process-wide generator.
///
/// This succeeds only if no entry point function has run before. Otherwise the generator already in
/// place is kept and [`Error::AlreadyInitialized`] is returned.
///
/// # Examples
///
/// ```rust
/// use rfc4122::{store::FileStore, GeneratorConfig};
///
/// let path = std::env::temp_dir().join("rfc4122-doc-state.json");
/// match rfc4122::register(GeneratorConfig::default().with_store(FileStore::new(path))) {
///     Ok(()) | Err(rfc4122::Error::AlreadyInitialized) => {}
///     Err(err) => eprintln!("generator initialized with error: {err}"),
/// }
/// println!("{}", rfc4122::uuid1());
/// ```
pub fn register(config: GeneratorConfig) -> Result<(), Error> {
    GLOBAL_GEN
        .set(Generator::new(config))
        .map_err(|_| Error::AlreadyInitialized)?;
    global_gen().init()
}

/// Generates a UUIDv1 object.
///
/// # Examples
///
/// ```rust
/// let uuid = rfc4122::uuid1();
/// println!("{}", uuid); // e.g., "5b4d6c1a-4b0e-11ef-9b3e-001b638445e6"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
/// ```
pub fn uuid1() -> Uuid {
    global_gen().new_v1()
}

/// Generates a UUIDv2 object carrying the POSIX user or group ID of the current process.
pub fn uuid2(domain: Domain) -> Uuid {
    global_gen().new_v2(domain, domain.local_id())
}

/// Generates a UUIDv4 object.
///
/// # Examples
///
/// ```rust
/// let uuid = rfc4122::uuid4()?;
/// println!("{}", uuid); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// # Ok::<(), rfc4122::Error>(())
/// ```
pub fn uuid4() -> Result<Uuid, Error> {
    global_gen().new_v4()
}

/// Returns and clears the initialization error of the process-wide generator.
pub fn take_error() -> Option<Error> {
    global_gen().take_error()
}

#[cfg(test)]
fn count_bits(samples: &[String]) -> [u32; 128] {
    // count '1' of each bit, most significant first
    let mut bins = [0u32; 128];
    for e in samples {
        let value = u128::from_str_radix(&e.replace('-', ""), 16).unwrap();
        for (i, bin) in bins.iter_mut().enumerate() {
            *bin += (value >> (127 - i)) as u32 & 1;
        }
    }
    bins
}
