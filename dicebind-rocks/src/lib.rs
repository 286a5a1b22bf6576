//! RocksDB-backed snapshot store for Dicebind.
//!
//! One database holds two kinds of entries, kept apart by key prefix:
//! - `snap/<32 key bytes>` → encoded snapshot, written once
//! - `head/<name>` → hex key of the snapshot the head points at

use std::path::Path;

use dicebind_core::{Key, KeyParseError, Store};
use rocksdb::{DB, Options};
use thiserror::Error;

const SNAPSHOT_PREFIX: &[u8] = b"snap/";
const HEAD_PREFIX: &[u8] = b"head/";

#[derive(Debug, Error)]
pub enum RocksError {
    #[error("RocksDB error: {0}")]
    Db(#[from] rocksdb::Error),
    #[error("head {name:?} is not a valid key")]
    CorruptHead {
        name: String,
        #[source]
        source: KeyParseError,
    },
}

/// Persistent snapshot store.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Opens the store at `path`, creating the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RocksError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }
}

fn snapshot_key(key: &Key) -> Vec<u8> {
    [SNAPSHOT_PREFIX, &key.as_bytes()[..]].concat()
}

fn head_key(name: &str) -> Vec<u8> {
    [HEAD_PREFIX, name.as_bytes()].concat()
}

impl Store for RocksStore {
    type Error = RocksError;

    fn get(&self, key: &Key) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.db.get(snapshot_key(key))?)
    }

    fn put(&self, key: &Key, value: &[u8]) -> Result<(), Self::Error> {
        let db_key = snapshot_key(key);
        // Content-addressed: an existing entry already holds these bytes.
        if self.db.get_pinned(&db_key)?.is_none() {
            self.db.put(db_key, value)?;
        }
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, Self::Error> {
        Ok(self.db.get_pinned(snapshot_key(key))?.is_some())
    }

    fn head(&self, name: &str) -> Result<Option<Key>, Self::Error> {
        let Some(raw) = self.db.get(head_key(name))? else {
            return Ok(None);
        };
        String::from_utf8_lossy(&raw)
            .parse::<Key>()
            .map(Some)
            .map_err(|source| RocksError::CorruptHead {
                name: name.to_string(),
                source,
            })
    }

    fn set_head(&self, name: &str, key: &Key) -> Result<(), Self::Error> {
        self.db.put(head_key(name), key.to_string())?;
        Ok(())
    }
}
