//! Fjall-backed local store for Vitrine catalogs.

use std::path::Path;

use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use thiserror::Error;
use tracing::debug;
use vitrine_core::{FailureKind, KeyValueStore, QuotaExceeded, StoreFailure};

pub const DEFAULT_KEYSPACE: &str = "catalog";

#[derive(Debug, Error)]
pub enum FjallError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),
}

impl StoreFailure for FjallError {
    fn kind(&self) -> FailureKind {
        match self {
            FjallError::Quota(_) => FailureKind::Quota,
            FjallError::Fjall(fjall::Error::Io(err)) => FailureKind::from_error(err),
            FjallError::Fjall(err) => FailureKind::from_error(err),
        }
    }
}

/// A persistent store backed by Fjall.
///
/// With a capacity set, values larger than the capacity are refused.
pub struct FjallStore {
    keyspace: Keyspace,
    capacity: Option<u64>,
    _database: Database, // Keep keyspace alive
}

impl FjallStore {
    /// Opens a Fjall store at the given path using the default keyspace.
    ///
    /// Creates the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FjallError> {
        Self::open_keyspace(path, DEFAULT_KEYSPACE)
    }

    /// Opens a Fjall store at the given path with a specific keyspace name.
    pub fn open_keyspace(path: impl AsRef<Path>, keyspace: &str) -> Result<Self, FjallError> {
        let database = Database::builder(path).open()?;
        let keyspace = database.keyspace(keyspace, || KeyspaceCreateOptions::default())?;
        Ok(Self {
            keyspace,
            capacity: None,
            _database: database,
        })
    }

    /// Limits the size of each stored value.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl KeyValueStore for FjallStore {
    type Error = FjallError;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.keyspace.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        QuotaExceeded::check(self.capacity, value.len())?;
        self.keyspace.insert(key.as_bytes(), value)?;
        debug!(key, bytes = value.len(), "Wrote value");
        Ok(())
    }
}
