//! RocksDB-backed local store for Vitrine catalogs.

use std::path::Path;

use rocksdb::{DB, ErrorKind, Options};
use thiserror::Error;
use tracing::debug;
use vitrine_core::{FailureKind, KeyValueStore, QuotaExceeded, StoreFailure};

#[derive(Debug, Error)]
pub enum RocksError {
    #[error("RocksDB error: {0}")]
    Rocks(#[from] rocksdb::Error),
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),
}

impl StoreFailure for RocksError {
    fn kind(&self) -> FailureKind {
        match self {
            RocksError::Quota(_) => FailureKind::Quota,
            RocksError::Rocks(err) => rocks_failure_kind(err.kind(), &err.to_string()),
        }
    }
}

/// RocksDB reports a full device as an I/O status whose message carries the OS error text.
fn rocks_failure_kind(kind: ErrorKind, message: &str) -> FailureKind {
    let out_of_space = ["No space left", "Disk quota exceeded"]
        .iter()
        .any(|text| message.contains(text));
    if kind == ErrorKind::IOError && out_of_space {
        FailureKind::Quota
    } else {
        FailureKind::Other
    }
}

/// A persistent store backed by RocksDB.
pub struct RocksStore {
    db: DB,
    capacity: Option<u64>,
}

impl RocksStore {
    /// Opens a RocksDB store at the given path.
    ///
    /// Creates the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RocksError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db, capacity: None })
    }

    /// Limits the size of each stored value.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl KeyValueStore for RocksStore {
    type Error = RocksError;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.db.get(key)?)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        QuotaExceeded::check(self.capacity, value.len())?;
        self.db.put(key, value)?;
        debug!(key, bytes = value.len(), "Wrote value");
        Ok(())
    }
}
