//! RFC4122 time-based, DCE security and random UUID generation
//!
//! ```rust
//! let uuid = rfc4122::uuid1();
//! println!("{}", uuid); // e.g., "5b4d6c1a-4b0e-11ef-9b3e-001b638445e6"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//! ```
//!
//! See [RFC 4122](https://www.rfc-editor.org/rfc/rfc4122).
//!
//! # Field and bit layout
//!
//! Time-based identifiers have the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_high       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             node                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 60-bit timestamp counts 100-nanosecond intervals since 00:00:00.00, 15 October 1582,
//!   split into the 32-bit `time_low`, 16-bit `time_mid` and 12-bit `time_high` fields.
//! - The 4-bit `ver` field is set at `0001` (or `0010` for version 2).
//! - The 2-bit `var` field is set at `10`.
//! - The 14-bit `clock_seq` field holds the clock sequence that disambiguates identifiers whose
//!   timestamp did not advance.
//! - The 48-bit `node` field holds a hardware address, or random bytes with the lowest bit of the
//!   first byte set when no hardware address is available.
//!
//! DCE security (version 2) identifiers replace `time_low` with a POSIX user or group ID and the
//! low byte of `clock_seq` with the [`Domain`].
//!
//! # Clock sequence
//!
//! A [`Generator`] keeps the last timestamp, clock sequence and node, optionally in a durable
//! [`store::StateStore`]. At startup the clock sequence is randomized if no state was saved or the
//! node changed, and incremented if the clock is behind the saved timestamp. Afterwards it is
//! incremented whenever the timestamp does not advance, so identifiers stay unique across clock
//! rollbacks and restarts.
//!
//! ```rust
//! use rfc4122::{store::MemoryStore, Generator, GeneratorConfig};
//!
//! let store = MemoryStore::default();
//! let g = Generator::new(GeneratorConfig::default().with_store(store.clone()));
//! let uuid = g.new_v1();
//! assert_eq!(store.snapshot().unwrap().sequence, uuid.clock_sequence());
//! ```
//!
//! # Other features
//!
//! This library also supports the generation of UUID version 4:
//!
//! ```rust
//! let uuid = rfc4122::uuid4()?;
//! println!("{}", uuid); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
//! # Ok::<(), rfc4122::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{Uuid, Variant};

mod domain;
pub use domain::Domain;

mod error;
pub use error::Error;

pub mod node;
pub use node::Node;

pub mod random;
pub use random::RandomSource;

pub mod sequence;

pub mod store;

pub mod timestamp;
pub use timestamp::{TimeSource, Timestamp};

mod generator;
pub use generator::{Generator, GeneratorConfig};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{global_gen, register, take_error, uuid1, uuid2, uuid4};
