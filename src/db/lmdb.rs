// Copyright (c) 2026 Meridian Foundation

//! LMDB-backed key-value store.
//!
//! One environment per data directory, one named database per logical
//! namespace ("index", "block"). Each put runs in its own write transaction;
//! the `KvStore` contract deliberately offers no batching, so the ledger
//! store's write ordering is the only consistency mechanism.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lmdb::{Database, Environment, EnvironmentFlags, Transaction, WriteFlags};

use super::{KvStore, StoreError};

const MAX_NAMESPACES: u32 = 4;
const MAP_SIZE: usize = 1024 * 1024 * 1024; // 1GB

impl From<lmdb::Error> for StoreError {
    fn from(e: lmdb::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// A shared LMDB environment from which namespaces are opened.
pub struct LmdbEnv {
    env: Arc<Environment>,
}

impl LmdbEnv {
    /// Open or create the environment at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(path).map_err(|e| StoreError::Database(e.to_string()))?;

        let env = Environment::new()
            .set_flags(EnvironmentFlags::NO_SUB_DIR)
            .set_max_dbs(MAX_NAMESPACES)
            .set_map_size(MAP_SIZE)
            .open(path.join("chain.mdb").as_ref())?;

        Ok(Self { env: Arc::new(env) })
    }

    /// Open or create the named namespace.
    pub fn namespace(&self, name: &str) -> Result<LmdbKvStore, StoreError> {
        let db = self.env.create_db(Some(name), lmdb::DatabaseFlags::empty())?;
        Ok(LmdbKvStore {
            env: Arc::clone(&self.env),
            db,
        })
    }
}

pub struct LmdbKvStore {
    env: Arc<Environment>,
    db: Database,
}

impl KvStore for LmdbKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        match txn.get(self.db, &key) {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }
}
