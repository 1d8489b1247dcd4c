// Copyright (c) 2026 Meridian Foundation

//! Meridian ledger core - block storage and deterministic execution.
//!
//! This library provides the append-only ledger of a Meridian node: block
//! and transaction persistence with derived indexes, the deterministic
//! transaction executor, and the delegate/validator bookkeeping that a
//! consensus layer builds on. Networking, signature verification and block
//! production live elsewhere.

#![deny(clippy::print_stdout)]

pub mod amount;
pub mod block;
pub mod codec;
pub mod config;
pub mod db;
pub mod executor;
pub mod genesis;
pub mod ledger;
pub mod state;
pub mod transaction;
pub mod validator;

pub use amount::Amount;
pub use block::{Block, BlockHeader};
pub use config::{ChainConfig, Network};
pub use executor::TransactionExecutor;
pub use genesis::Genesis;
pub use ledger::{BlockListener, ChainError, ChainStore};
pub use transaction::{Address, Hash, Transaction, TransactionResult, TxError, TxType};
