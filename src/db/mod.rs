// Copyright (c) 2026 Meridian Foundation

//! Key-value store abstraction.
//!
//! The ledger store is written against this trait and nothing else: an
//! ordered byte-key space with get/put. Individual puts are durable in
//! whatever way the backend provides, but there is no cross-key atomicity --
//! a crash mid-append can leave the store partially updated, which the ledger
//! store documents and tolerates by fixing its write order.

pub mod lmdb;

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

pub use self::lmdb::{LmdbEnv, LmdbKvStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}

/// Map-backed store for tests and ephemeral replay.
#[derive(Default)]
pub struct MemoryKvStore {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
