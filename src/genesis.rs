// Copyright (c) 2026 Meridian Foundation

//! Genesis descriptor.
//!
//! A genesis file fixes block 0 and the initial state: premined balances and
//! the founding delegate set. The descriptor is loaded from TOML with
//! hex-encoded addresses; materialization into the state layers happens in
//! the ledger store the first time a database is opened.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::amount::Amount;
use crate::block::{results_root, transactions_root, Block, BlockHeader};
use crate::transaction::Address;

/// A premined balance credited at genesis.
#[derive(Debug, Clone, Deserialize)]
pub struct Premine {
    #[serde(deserialize_with = "deserialize_address")]
    pub address: Address,
    /// In nanos.
    pub amount: Amount,
}

/// A delegate registered at genesis, forming the initial validator set.
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisDelegate {
    #[serde(deserialize_with = "deserialize_address")]
    pub address: Address,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genesis {
    /// Block 0 fields. The genesis block carries no transactions and mints
    /// no reward.
    #[serde(deserialize_with = "deserialize_address")]
    pub coinbase: Address,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    #[serde(default)]
    pub data: Vec<u8>,

    #[serde(default)]
    pub premines: Vec<Premine>,
    #[serde(default)]
    pub delegates: Vec<GenesisDelegate>,
}

impl Genesis {
    /// Load a genesis descriptor from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read genesis file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse genesis file {}", path.display()))
    }

    /// A small fixed genesis for local development and tests: four funded
    /// accounts, four delegates.
    pub fn devnet() -> Self {
        let premines = (1u8..=4)
            .map(|i| Premine {
                address: [i; 20],
                amount: Amount::from_coins(1_000_000),
            })
            .collect();
        let delegates = (1u8..=4)
            .map(|i| GenesisDelegate {
                address: [i; 20],
                name: format!("devnet_{i}"),
            })
            .collect();
        Self {
            coinbase: [0xff; 20],
            timestamp: 1_600_000_000_000,
            data: b"devnet".to_vec(),
            premines,
            delegates,
        }
    }

    /// The genesis block itself: number 0, all-zero parent hash, empty
    /// transaction list.
    pub fn block(&self) -> Block {
        let header = BlockHeader {
            number: 0,
            coinbase: self.coinbase,
            parent_hash: [0u8; 32],
            timestamp: self.timestamp,
            transactions_root: transactions_root(&[]),
            results_root: results_root(&[]),
            state_root: [0u8; 32],
            data: self.data.clone(),
        };
        Block::new(header, Vec::new(), Vec::new())
    }
}

fn deserialize_address<'de, D>(deserializer: D) -> std::result::Result<Address, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
    bytes
        .try_into()
        .map_err(|_| serde::de::Error::custom("address must be 20 bytes"))
}
