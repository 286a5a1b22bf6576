use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{PoisonError, RwLock};

use crate::Key;

/// Storage for encoded dataset snapshots plus named heads.
///
/// Snapshots are immutable byte blobs addressed by their content [`Key`].
/// A head is a mutable name (one per dataset, e.g. `"default"`) pointing
/// at the most recently committed snapshot. Stores know nothing about
/// presets; encoding is done by the snapshot layer. All methods take
/// `&self` so backends can lock internally.
pub trait Store {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, Self::Error>;

    fn put(&self, key: &Key, value: &[u8]) -> Result<(), Self::Error>;

    fn has(&self, key: &Key) -> Result<bool, Self::Error>;

    /// Returns the snapshot a head points at, if the head exists.
    fn head(&self, name: &str) -> Result<Option<Key>, Self::Error>;

    /// Moves (or creates) a head.
    fn set_head(&self, name: &str, key: &Key) -> Result<(), Self::Error>;
}

/// Store kept entirely in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<Key, Vec<u8>>>,
    heads: RwLock<HashMap<String, Key>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct snapshots held, regardless of heads.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Store for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, Self::Error> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots.get(key).cloned())
    }

    fn put(&self, key: &Key, value: &[u8]) -> Result<(), Self::Error> {
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        snapshots.entry(*key).or_insert_with(|| value.to_vec());
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, Self::Error> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots.contains_key(key))
    }

    fn head(&self, name: &str) -> Result<Option<Key>, Self::Error> {
        let heads = self.heads.read().unwrap_or_else(PoisonError::into_inner);
        Ok(heads.get(name).copied())
    }

    fn set_head(&self, name: &str, key: &Key) -> Result<(), Self::Error> {
        let mut heads = self.heads.write().unwrap_or_else(PoisonError::into_inner);
        heads.insert(name.to_string(), *key);
        Ok(())
    }
}
