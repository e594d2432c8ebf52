//! Durable storage of the generator state across process restarts.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

use crate::{Node, Timestamp};

/// Snapshot of the generator state: the timestamp, clock sequence and node of the last UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct PersistedState {
    /// Timestamp of the last generated UUID.
    pub timestamp: u64,

    /// Clock sequence of the last generated UUID.
    pub sequence: u16,

    /// Node of the last generated UUID.
    pub node: [u8; 6],
}

impl PersistedState {
    /// Returns the timestamp as a [`Timestamp`].
    pub const fn timestamp(&self) -> Timestamp {
        Timestamp::from_ticks(self.timestamp)
    }

    /// Returns the node as a [`Node`].
    pub const fn node(&self) -> Node {
        Node::from_bytes(self.node)
    }
}

/// Error reading or writing a [`StateStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying storage failed.
    #[error("state store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The stored snapshot is corrupt.
    #[error("state store holds a corrupt snapshot: {0}")]
    Format(#[from] serde_json::Error),
}

/// A trait for the stable store of the generator state.
///
/// The generator loads the state once when it initializes and saves it after every time-based
/// UUID it generates.
pub trait StateStore: Send {
    /// Reads the last saved state, returning `None` if nothing has been saved yet.
    fn load(&mut self) -> Result<Option<PersistedState>, StoreError>;

    /// Replaces the saved state.
    fn save(&mut self, state: &PersistedState) -> Result<(), StoreError>;
}

/// [`StateStore`] that keeps a JSON snapshot in a file.
///
/// Saves write a sibling temporary file and rename it over the snapshot, so a crash never leaves a
/// half-written snapshot behind.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the file at `path`; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStore {
    fn load(&mut self) -> Result<Option<PersistedState>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StoreError> {
        let tmp = self.temporary_path();
        fs::write(&tmp, serde_json::to_vec(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// [`StateStore`] held in memory; clones share the same snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<Mutex<Option<PersistedState>>>);

impl MemoryStore {
    /// Creates a store already holding `state`.
    pub fn with_state(state: PersistedState) -> Self {
        Self(Arc::new(Mutex::new(Some(state))))
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Option<PersistedState> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> Result<Option<PersistedState>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), StoreError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(*state);
        Ok(())
    }
}
