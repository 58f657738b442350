use std::collections::HashMap;
use std::convert::Infallible;
use std::io;
use std::sync::RwLock;

use thiserror::Error;

/// How a store failure should be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The store has no room for the write.
    Quota,
    Other,
}

impl FailureKind {
    /// Classifies an error by its source chain: an I/O error reporting a
    /// full device or an exhausted disk quota is a [`Quota`](Self::Quota) failure.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let out_of_space = std::iter::successors(Some(err), |err| err.source())
            .filter_map(|err| err.downcast_ref::<io::Error>())
            .any(|err| matches!(err.kind(), io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded));
        if out_of_space {
            Self::Quota
        } else {
            Self::Other
        }
    }
}

/// Classification of store errors, reported by the store itself.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
    fn kind(&self) -> FailureKind;
}

impl StoreFailure for Infallible {
    fn kind(&self) -> FailureKind {
        match *self {}
    }
}

/// A write refused because the value does not fit in the store's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quota exceeded: {needed} bytes requested, capacity is {capacity} bytes")]
pub struct QuotaExceeded {
    pub needed: u64,
    pub capacity: u64,
}

impl QuotaExceeded {
    /// Fails when `value_len` exceeds `capacity`. `None` means unbounded.
    pub fn check(capacity: Option<u64>, value_len: usize) -> Result<(), Self> {
        match capacity {
            Some(capacity) if value_len as u64 > capacity => Err(Self {
                needed: value_len as u64,
                capacity,
            }),
            _ => Ok(()),
        }
    }
}

impl StoreFailure for QuotaExceeded {
    fn kind(&self) -> FailureKind {
        FailureKind::Quota
    }
}

/// A string-keyed store of byte values, the local persistence layer.
///
/// Each value is written in a single operation; a failed `put` leaves the
/// previous value in place. All methods take `&self` so that stores with
/// internal locking can be shared.
pub trait KeyValueStore {
    type Error: StoreFailure;

    /// Retrieves the value stored under `key`, or None if not present.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Replaces the value stored under `key`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error>;
}

impl<S: KeyValueStore> KeyValueStore for &S {
    type Error = S::Error;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        (*self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        (*self).put(key, value)
    }
}

/// An in-memory store backed by a HashMap.
///
/// Useful for testing and as a reference implementation. An optional
/// capacity bounds the size of each stored value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
    capacity: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            data: RwLock::default(),
            capacity: Some(capacity),
        }
    }
}

impl KeyValueStore for MemoryStore {
    type Error = QuotaExceeded;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.data.read().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        QuotaExceeded::check(self.capacity, value.len())?;
        self.data.write().unwrap().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_put_get() {
        let store = MemoryStore::new();

        store.put("products", b"[]").unwrap();

        assert_eq!(store.get("products").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn memory_store_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("products").unwrap(), None);
    }

    #[test]
    fn memory_store_overwrite() {
        let store = MemoryStore::new();

        store.put("products", b"first").unwrap();
        store.put("products", b"second").unwrap();

        assert_eq!(store.get("products").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn memory_store_refuses_oversized_values() {
        let store = MemoryStore::with_capacity(4);
        store.put("products", b"1234").unwrap();

        let err = store.put("products", b"12345").unwrap_err();

        assert_eq!(err, QuotaExceeded { needed: 5, capacity: 4 });
        assert_eq!(err.kind(), FailureKind::Quota);
        assert_eq!(store.get("products").unwrap(), Some(b"1234".to_vec()));
    }

    #[derive(Debug, Error)]
    #[error("write failed")]
    struct WriteFailed(#[source] io::Error);

    #[test]
    fn full_device_is_a_quota_failure() {
        let full = WriteFailed(io::Error::from(io::ErrorKind::StorageFull));
        let quota = io::Error::from(io::ErrorKind::QuotaExceeded);
        let denied = WriteFailed(io::Error::from(io::ErrorKind::PermissionDenied));

        assert_eq!(FailureKind::from_error(&full), FailureKind::Quota);
        assert_eq!(FailureKind::from_error(&quota), FailureKind::Quota);
        assert_eq!(FailureKind::from_error(&denied), FailureKind::Other);
    }

    #[test]
    fn store_by_reference() {
        let store = MemoryStore::new();
        let by_ref = &store;

        by_ref.put("k", b"v").unwrap();

        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
