// Copyright (c) 2026 Meridian Foundation

//! The append-only ledger.
//!
//! [`ChainStore`] persists blocks and their derived indexes over two
//! key-value namespaces and serves all read paths. Blocks only ever get
//! appended; nothing is deleted or rewritten.

mod store;

pub use store::ChainStore;

use thiserror::Error;

use crate::block::Block;
use crate::codec::DecodeError;
use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("non-sequential block: got {got}, expected {expected}")]
    NonSequentialBlock { got: u64, expected: u64 },

    /// An index entry points at data that is missing or inconsistent. The
    /// database needs to be rebuilt from a trusted source.
    #[error("corrupted database: {0}")]
    Corrupted(String),
}

/// Notified after each block is fully persisted and the latest-block pointer
/// has moved. Listener failures are logged and never affect the append.
pub trait BlockListener: Send + Sync {
    fn on_block_added(&self, block: &Block) -> anyhow::Result<()>;
}
