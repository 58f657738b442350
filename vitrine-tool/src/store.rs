use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use vitrine_core::{FailureKind, KeyValueStore, LocalCatalog, StoreFailure};
use vitrine_fjall::FjallStore;
use vitrine_rocks::RocksStore;

#[derive(Debug, Error)]
pub enum AnyStoreError {
    #[error("fjall error: {0}")]
    Fjall(#[from] vitrine_fjall::FjallError),
    #[error("rocks error: {0}")]
    Rocks(#[from] vitrine_rocks::RocksError),
}

impl StoreFailure for AnyStoreError {
    fn kind(&self) -> FailureKind {
        match self {
            AnyStoreError::Fjall(e) => e.kind(),
            AnyStoreError::Rocks(e) => e.kind(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    Fjall,
    Rocks,
}

impl std::str::FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fjall" => Ok(StoreType::Fjall),
            "rocks" | "rocksdb" => Ok(StoreType::Rocks),
            _ => Err(format!("unknown store type: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::Fjall => write!(f, "fjall"),
            StoreType::Rocks => write!(f, "rocks"),
        }
    }
}

pub enum AnyStore {
    Fjall(FjallStore),
    Rocks(RocksStore),
}

impl AnyStore {
    pub fn open(store_type: StoreType, path: impl AsRef<Path>, capacity: u64) -> Result<Self, AnyStoreError> {
        match store_type {
            StoreType::Fjall => Ok(Self::Fjall(FjallStore::open(path)?.with_capacity(capacity))),
            StoreType::Rocks => Ok(Self::Rocks(RocksStore::open(path)?.with_capacity(capacity))),
        }
    }
}

impl KeyValueStore for AnyStore {
    type Error = AnyStoreError;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        match self {
            AnyStore::Fjall(s) => s.get(key).map_err(Into::into),
            AnyStore::Rocks(s) => s.get(key).map_err(Into::into),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        match self {
            AnyStore::Fjall(s) => s.put(key, value).map_err(Into::into),
            AnyStore::Rocks(s) => s.put(key, value).map_err(Into::into),
        }
    }
}

pub fn open_backend(
    store_type: StoreType,
    path: &Path,
    capacity: u64,
) -> Result<LocalCatalog<AnyStore>, AnyStoreError> {
    Ok(LocalCatalog::new(AnyStore::open(store_type, path, capacity)?))
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vitrine")
        .join("store")
}
