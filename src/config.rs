// Copyright (c) 2026 Meridian Foundation

//! Chain parameters.
//!
//! Everything the ledger store and the transaction executor need to know about
//! the network they run on: fee floors, data-size limits, the block-reward
//! schedule and the validator rotation. Loadable from TOML; every field has a
//! default so a partial config file is fine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::transaction::{Address, TxType};

/// Blocks per day at the 30-second block interval.
pub const BLOCKS_PER_DAY: u64 = 2 * 60 * 24;

/// Maximum length of a delegate name, which doubles as the data-size limit
/// for DELEGATE transactions.
pub const DELEGATE_NAME_MAX_LEN: usize = 16;

/// Network identifier, part of every transaction's signed payload so that
/// transactions cannot be replayed across networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    pub fn id(&self) -> u8 {
        match self {
            Network::Mainnet => 0,
            Network::Testnet => 1,
            Network::Devnet => 2,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Devnet
    }
}

/// Consensus-relevant chain parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub network: Network,

    /// Minimum fee for any transaction, in nanos.
    #[serde(default = "default_min_transaction_fee")]
    pub min_transaction_fee: Amount,

    /// Minimum amount burned by a DELEGATE registration, in nanos.
    #[serde(default = "default_min_delegate_burn")]
    pub min_delegate_burn: Amount,

    /// Data-size limit for every transaction type except DELEGATE.
    #[serde(default = "default_max_transaction_data_size")]
    pub max_transaction_data_size: usize,

    /// Flat per-block reward, in nanos.
    #[serde(default = "default_block_reward")]
    pub block_reward: Amount,

    /// Validator-set size at block 0.
    #[serde(default = "default_initial_validators")]
    pub initial_validators: u64,

    /// Validator-set size ceiling.
    #[serde(default = "default_max_validators")]
    pub max_validators: u64,

    /// The validator set is recomputed every this many blocks.
    #[serde(default = "default_validator_update_interval")]
    pub validator_update_interval: u64,
}

fn default_min_transaction_fee() -> Amount {
    Amount::from_nanos(5_000_000)
}

fn default_min_delegate_burn() -> Amount {
    Amount::from_coins(1000)
}

fn default_max_transaction_data_size() -> usize {
    128
}

fn default_block_reward() -> Amount {
    Amount::from_coins(3)
}

fn default_initial_validators() -> u64 {
    16
}

fn default_max_validators() -> u64 {
    100
}

fn default_validator_update_interval() -> u64 {
    200
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            min_transaction_fee: default_min_transaction_fee(),
            min_delegate_burn: default_min_delegate_burn(),
            max_transaction_data_size: default_max_transaction_data_size(),
            block_reward: default_block_reward(),
            initial_validators: default_initial_validators(),
            max_validators: default_max_validators(),
            validator_update_interval: default_validator_update_interval(),
        }
    }
}

impl ChainConfig {
    /// Load from a TOML file; missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// A permissive configuration for local development and tests.
    pub fn devnet() -> Self {
        Self {
            network: Network::Devnet,
            min_transaction_fee: Amount::from_nanos(1),
            min_delegate_burn: Amount::from_coins(1),
            validator_update_interval: 10,
            ..Self::default()
        }
    }

    pub fn min_transaction_fee(&self) -> Amount {
        self.min_transaction_fee
    }

    pub fn min_delegate_burn(&self) -> Amount {
        self.min_delegate_burn
    }

    /// Per-type data-size limit. A DELEGATE's data blob is its name, so it is
    /// capped at the maximum name length.
    pub fn max_transaction_data_size(&self, tx_type: TxType) -> usize {
        match tx_type {
            TxType::Delegate => DELEGATE_NAME_MAX_LEN,
            _ => self.max_transaction_data_size,
        }
    }

    /// Reward minted by the block at `number`. Genesis mints nothing.
    pub fn block_reward(&self, number: u64) -> Amount {
        if number == 0 {
            Amount::ZERO
        } else {
            self.block_reward
        }
    }

    /// Target validator-set size at `number`: grows by two per day from the
    /// initial size up to the ceiling.
    pub fn number_of_validators(&self, number: u64) -> u64 {
        (self.initial_validators + number / BLOCKS_PER_DAY * 2).min(self.max_validators)
    }

    pub fn validator_update_interval(&self) -> u64 {
        self.validator_update_interval
    }

    /// The validator whose turn it is to forge block `number` at `round`.
    /// Returns `None` only when the validator set is empty.
    pub fn primary_validator(
        &self,
        validators: &[Address],
        number: u64,
        round: u64,
    ) -> Option<Address> {
        if validators.is_empty() {
            return None;
        }
        let idx = (number.wrapping_add(round) % validators.len() as u64) as usize;
        Some(validators[idx])
    }
}
