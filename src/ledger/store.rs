// Copyright (c) 2026 Meridian Foundation

//! Block persistence and derived indexes.
//!
//! Two key-value namespaces back the store. The block namespace holds the
//! four serialized parts of each block keyed by type tag plus block number.
//! The index namespace holds everything derived: the latest-block pointer,
//! the active validator set, per-validator statistics, hash-to-number
//! mappings, per-transaction locators and per-account transaction lists.
//!
//! Key layout, index namespace (first byte is the type tag):
//!
//! ```text
//! [0x00]                     latest block number (u64 BE)
//! [0x01]                     active validator set
//! [0x02, address]            lifetime validator stats
//! [0x03, block hash]         block number (u64 BE)
//! [0x04, tx hash]            coinbase bytes, or {number, tx off, result off}
//! [0x05, address]            account transaction count (u32 BE)
//! [0x05, address, n u32 BE]  hash of the account's n-th transaction
//! [0x06, address]            recent (windowed) validator stats
//! ```
//!
//! A coinbase transaction is stored inline under `[0x04, hash]` because it is
//! synthesized at append time and never part of the block body. The locator
//! triple for ordinary transactions is 16 bytes; a serialized transaction is
//! always longer than 64, so the value length discriminates the two forms.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::amount::Amount;
use crate::block::{Block, BlockHeader};
use crate::codec::{Decoder, Encoder};
use crate::config::ChainConfig;
use crate::db::KvStore;
use crate::genesis::Genesis;
use crate::state::{AccountState, DelegateState};
use crate::transaction::{read_address, Address, Hash, Transaction, TransactionResult};
use crate::validator::{RecentValidatorStats, StatsKind, ValidatorStats};

use super::{BlockListener, ChainError};

// index namespace tags
const TYPE_LATEST_BLOCK_NUMBER: u8 = 0x00;
const TYPE_VALIDATORS: u8 = 0x01;
const TYPE_VALIDATOR_STATS: u8 = 0x02;
const TYPE_BLOCK_NUMBER_BY_HASH: u8 = 0x03;
const TYPE_TRANSACTION_LOCATOR: u8 = 0x04;
const TYPE_ACCOUNT_TRANSACTION: u8 = 0x05;
const TYPE_RECENT_VALIDATOR_STATS: u8 = 0x06;

// block namespace tags
const TYPE_BLOCK_HEADER: u8 = 0x00;
const TYPE_BLOCK_TRANSACTIONS: u8 = 0x01;
const TYPE_BLOCK_RESULTS: u8 = 0x02;
const TYPE_BLOCK_VOTES: u8 = 0x03;

/// A value under `[0x04, hash]` at most this long is a locator triple; a
/// longer one is an inline coinbase transaction.
const LOCATOR_MAX_LEN: usize = 64;

pub struct ChainStore {
    config: Arc<ChainConfig>,
    index: Arc<dyn KvStore>,
    blocks: Arc<dyn KvStore>,

    /// Published last on append, so readers never observe a latest block
    /// whose indexes are still being written.
    latest: RwLock<Block>,

    listeners: RwLock<Vec<Box<dyn BlockListener>>>,

    /// Serializes appends. Readers go through `latest` and the stores
    /// directly and never take this.
    write_lock: Mutex<()>,
}

impl ChainStore {
    /// Open the store over the given namespaces. On a fresh database the
    /// genesis state is materialized first: premines are credited, founding
    /// delegates registered, both states committed, and block 0 appended.
    pub fn open(
        config: Arc<ChainConfig>,
        genesis: &Genesis,
        index: Arc<dyn KvStore>,
        blocks: Arc<dyn KvStore>,
        accounts: &mut dyn AccountState,
        delegates: &mut dyn DelegateState,
    ) -> Result<Self, ChainError> {
        let mut fresh = false;
        let latest = match index.get(&[TYPE_LATEST_BLOCK_NUMBER])? {
            Some(bytes) => {
                let number = Decoder::new(&bytes).read_u64()?;
                let block = read_block(blocks.as_ref(), number)?.ok_or_else(|| {
                    ChainError::Corrupted(format!("latest block {number} missing"))
                })?;
                info!(number, "opened chain database");
                block
            }
            None => {
                for premine in &genesis.premines {
                    accounts.adjust_available(&premine.address, premine.amount.nanos() as i128);
                }
                for delegate in &genesis.delegates {
                    if !delegates.register(&delegate.address, delegate.name.as_bytes()) {
                        return Err(ChainError::Corrupted(format!(
                            "duplicate genesis delegate {}",
                            delegate.name
                        )));
                    }
                }
                accounts.commit();
                delegates.commit();
                info!(
                    premines = genesis.premines.len(),
                    delegates = genesis.delegates.len(),
                    "initialized fresh chain database"
                );
                fresh = true;
                genesis.block()
            }
        };

        let store = Self {
            config,
            index,
            blocks,
            latest: RwLock::new(latest.clone()),
            listeners: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
        };
        if fresh {
            store.append(&latest, delegates)?;
        }
        Ok(store)
    }

    pub fn add_listener(&self, listener: Box<dyn BlockListener>) {
        self.listeners.write().push(listener);
    }

    pub fn latest_block(&self) -> Block {
        self.latest.read().clone()
    }

    pub fn latest_block_number(&self) -> u64 {
        self.latest.read().number()
    }

    pub fn latest_block_hash(&self) -> Hash {
        self.latest.read().hash()
    }

    /// Append the next block. Rejects anything but `latest + 1` (or block 0
    /// on an empty chain) without writing.
    pub fn add_block(
        &self,
        block: &Block,
        delegates: &dyn DelegateState,
    ) -> Result<(), ChainError> {
        let _guard = self.write_lock.lock();

        let expected = self.latest.read().number() + 1;
        if block.number() != expected {
            return Err(ChainError::NonSequentialBlock {
                got: block.number(),
                expected,
            });
        }
        self.append(block, delegates)
    }

    /// Persist a block and all derived indexes. Sequence checking is the
    /// caller's job; the write lock must be held (or the store not yet
    /// shared, as during genesis).
    fn append(&self, block: &Block, delegates: &dyn DelegateState) -> Result<(), ChainError> {
        let number = block.number();

        // 1. block parts
        self.blocks
            .put(&block_key(TYPE_BLOCK_HEADER, number), &block.to_bytes_header())?;
        self.blocks.put(
            &block_key(TYPE_BLOCK_TRANSACTIONS, number),
            &block.to_bytes_transactions(),
        )?;
        self.blocks
            .put(&block_key(TYPE_BLOCK_RESULTS, number), &block.to_bytes_results())?;
        self.blocks
            .put(&block_key(TYPE_BLOCK_VOTES, number), &block.to_bytes_votes())?;

        // 2. hash to number
        self.index.put(
            &prefixed_key(TYPE_BLOCK_NUMBER_BY_HASH, &block.hash()),
            &number.to_be_bytes(),
        )?;

        // 3. transaction locators and per-account lists
        for (tx, (tx_offset, result_offset)) in
            block.transactions.iter().zip(block.transaction_indices())
        {
            let mut locator = Encoder::with_capacity(16);
            locator.write_u64(number);
            locator.write_u32(tx_offset);
            locator.write_u32(result_offset);
            self.index.put(
                &prefixed_key(TYPE_TRANSACTION_LOCATOR, &tx.hash()),
                &locator.into_bytes(),
            )?;

            self.add_transaction_to_account(&tx.from, &tx.hash())?;
            if tx.to != tx.from {
                self.add_transaction_to_account(&tx.to, &tx.hash())?;
            }
        }

        // 4. coinbase and validator statistics; genesis mints nothing and has
        // no forging turn to account for
        if number > 0 {
            let fees = block
                .transactions
                .iter()
                .fold(Amount::ZERO, |acc, tx| acc.saturating_add(tx.fee));
            let coinbase_tx = Transaction::coinbase(
                self.config.network,
                block.coinbase(),
                self.config.block_reward(number).saturating_add(fees),
                number,
                block.timestamp(),
            );
            self.index.put(
                &prefixed_key(TYPE_TRANSACTION_LOCATOR, &coinbase_tx.hash()),
                &coinbase_tx.to_bytes(),
            )?;
            self.add_transaction_to_account(&coinbase_tx.to, &coinbase_tx.hash())?;

            // stats go against the set in effect when the block was forged
            let validators = self.get_validators()?;
            self.record_stats(&block.coinbase(), StatsKind::Forged, number)?;
            if let Some(primary) = self.config.primary_validator(&validators, number, 0) {
                if primary == block.coinbase() {
                    self.record_stats(&primary, StatsKind::Hit, number)?;
                } else {
                    self.record_stats(&primary, StatsKind::Missed, number)?;
                }
            }
        }

        // 5. validator set, recomputed on schedule
        if number % self.config.validator_update_interval() == 0 {
            self.update_validators(number, delegates)?;
        }

        // 6. latest pointer, after every other write
        self.index
            .put(&[TYPE_LATEST_BLOCK_NUMBER], &number.to_be_bytes())?;

        // 7. publish and notify
        *self.latest.write() = block.clone();
        debug!(
            number,
            hash = %hex::encode(block.hash()),
            transactions = block.transactions.len(),
            "block added"
        );
        for listener in self.listeners.read().iter() {
            if let Err(err) = listener.on_block_added(block) {
                warn!(number, "block listener failed: {err:#}");
            }
        }
        Ok(())
    }

    pub fn get_block(&self, number: u64) -> Result<Option<Block>, ChainError> {
        read_block(self.blocks.as_ref(), number)
    }

    pub fn get_block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, ChainError> {
        match self.get_block_number(hash)? {
            Some(number) => self.get_block(number),
            None => Ok(None),
        }
    }

    pub fn get_block_number(&self, hash: &Hash) -> Result<Option<u64>, ChainError> {
        self.index
            .get(&prefixed_key(TYPE_BLOCK_NUMBER_BY_HASH, hash))?
            .map(|bytes| Ok(Decoder::new(&bytes).read_u64()?))
            .transpose()
    }

    pub fn get_block_header(&self, number: u64) -> Result<Option<BlockHeader>, ChainError> {
        self.blocks
            .get(&block_key(TYPE_BLOCK_HEADER, number))?
            .map(|bytes| Ok(BlockHeader::from_bytes(&bytes)?))
            .transpose()
    }

    pub fn get_block_header_by_hash(
        &self,
        hash: &Hash,
    ) -> Result<Option<BlockHeader>, ChainError> {
        match self.get_block_number(hash)? {
            Some(number) => self.get_block_header(number),
            None => Ok(None),
        }
    }

    pub fn has_block(&self, number: u64) -> Result<bool, ChainError> {
        Ok(self
            .blocks
            .get(&block_key(TYPE_BLOCK_HEADER, number))?
            .is_some())
    }

    pub fn has_transaction(&self, hash: &Hash) -> Result<bool, ChainError> {
        Ok(self
            .index
            .get(&prefixed_key(TYPE_TRANSACTION_LOCATOR, hash))?
            .is_some())
    }

    /// Look a transaction up by hash. Ordinary transactions are sliced out of
    /// the stored block body via their locator; coinbase transactions decode
    /// straight from the inline entry.
    pub fn get_transaction(&self, hash: &Hash) -> Result<Option<Transaction>, ChainError> {
        let bytes = match self.index.get(&prefixed_key(TYPE_TRANSACTION_LOCATOR, hash))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if bytes.len() > LOCATOR_MAX_LEN {
            return Ok(Some(Transaction::from_bytes(&bytes)?));
        }

        let mut dec = Decoder::new(&bytes);
        let number = dec.read_u64()?;
        let tx_offset = dec.read_u32()?;
        let body = self
            .blocks
            .get(&block_key(TYPE_BLOCK_TRANSACTIONS, number))?
            .ok_or_else(|| {
                ChainError::Corrupted(format!("transactions of block {number} missing"))
            })?;
        let mut dec = Decoder::new_at(&body, tx_offset as usize);
        Ok(Some(Transaction::from_bytes(dec.read_slice()?)?))
    }

    /// The persisted execution result. Coinbase transactions are never
    /// executed and always read back as success.
    pub fn get_transaction_result(
        &self,
        hash: &Hash,
    ) -> Result<Option<TransactionResult>, ChainError> {
        let bytes = match self.index.get(&prefixed_key(TYPE_TRANSACTION_LOCATOR, hash))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if bytes.len() > LOCATOR_MAX_LEN {
            return Ok(Some(TransactionResult::success()));
        }

        let mut dec = Decoder::new(&bytes);
        let number = dec.read_u64()?;
        let _ = dec.read_u32()?;
        let result_offset = dec.read_u32()?;
        let body = self
            .blocks
            .get(&block_key(TYPE_BLOCK_RESULTS, number))?
            .ok_or_else(|| ChainError::Corrupted(format!("results of block {number} missing")))?;
        let mut dec = Decoder::new_at(&body, result_offset as usize);
        Ok(Some(TransactionResult::from_bytes(dec.read_slice()?)?))
    }

    /// Number of the block containing the transaction. A coinbase carries its
    /// block number in the nonce field.
    pub fn get_transaction_block_number(&self, hash: &Hash) -> Result<Option<u64>, ChainError> {
        let bytes = match self.index.get(&prefixed_key(TYPE_TRANSACTION_LOCATOR, hash))? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if bytes.len() > LOCATOR_MAX_LEN {
            let tx = Transaction::from_bytes(&bytes)?;
            return Ok(Some(tx.nonce));
        }
        Ok(Some(Decoder::new(&bytes).read_u64()?))
    }

    /// How many transactions touch `address`, coinbase credits included.
    pub fn get_transaction_count(&self, address: &Address) -> Result<u32, ChainError> {
        match self.index.get(&prefixed_key(TYPE_ACCOUNT_TRANSACTION, address))? {
            Some(bytes) => Ok(Decoder::new(&bytes).read_u32()?),
            None => Ok(0),
        }
    }

    /// The half-open slice `[from, to)` of the address's transactions in
    /// chronological order, clamped to the indexed count.
    pub fn get_transactions(
        &self,
        address: &Address,
        from: u32,
        to: u32,
    ) -> Result<Vec<Transaction>, ChainError> {
        let to = to.min(self.get_transaction_count(address)?);
        let mut txs = Vec::with_capacity(to.saturating_sub(from) as usize);
        for n in from..to {
            let hash_bytes = self
                .index
                .get(&account_transaction_key(address, n))?
                .ok_or_else(|| {
                    ChainError::Corrupted(format!(
                        "account transaction entry {n} of {} missing",
                        hex::encode(address)
                    ))
                })?;
            let hash: Hash = hash_bytes.as_slice().try_into().map_err(|_| {
                ChainError::Corrupted("account transaction entry is not a hash".into())
            })?;
            let tx = self.get_transaction(&hash)?.ok_or_else(|| {
                ChainError::Corrupted(format!("indexed transaction {} missing", hex::encode(hash)))
            })?;
            txs.push(tx);
        }
        Ok(txs)
    }

    /// The active validator set, in rank order. Empty only before genesis
    /// has been appended.
    pub fn get_validators(&self) -> Result<Vec<Address>, ChainError> {
        let bytes = match self.index.get(&[TYPE_VALIDATORS])? {
            Some(bytes) => bytes,
            None => return Ok(Vec::new()),
        };
        let mut dec = Decoder::new(&bytes);
        let count = dec.read_u32()?;
        let mut validators = Vec::with_capacity(count as usize);
        for _ in 0..count {
            validators.push(read_address(&mut dec)?);
        }
        Ok(validators)
    }

    pub fn get_validator_stats(&self, address: &Address) -> Result<ValidatorStats, ChainError> {
        match self.index.get(&prefixed_key(TYPE_VALIDATOR_STATS, address))? {
            Some(bytes) => Ok(ValidatorStats::from_bytes(&bytes)?),
            None => Ok(ValidatorStats::default()),
        }
    }

    pub fn get_recent_validator_stats(
        &self,
        address: &Address,
    ) -> Result<RecentValidatorStats, ChainError> {
        match self
            .index
            .get(&prefixed_key(TYPE_RECENT_VALIDATOR_STATS, address))?
        {
            Some(bytes) => Ok(RecentValidatorStats::from_bytes(&bytes)?),
            None => Ok(RecentValidatorStats::default()),
        }
    }

    /// Is the given transaction a coinbase of this chain? Identified by the
    /// inline form of its locator entry.
    pub fn is_coinbase(&self, hash: &Hash) -> Result<bool, ChainError> {
        Ok(self
            .index
            .get(&prefixed_key(TYPE_TRANSACTION_LOCATOR, hash))?
            .map(|bytes| bytes.len() > LOCATOR_MAX_LEN)
            .unwrap_or(false))
    }

    fn add_transaction_to_account(
        &self,
        address: &Address,
        hash: &Hash,
    ) -> Result<(), ChainError> {
        let count = self.get_transaction_count(address)?;
        self.index
            .put(&account_transaction_key(address, count), hash)?;
        let mut enc = Encoder::with_capacity(4);
        enc.write_u32(count + 1);
        self.index.put(
            &prefixed_key(TYPE_ACCOUNT_TRANSACTION, address),
            &enc.into_bytes(),
        )?;
        Ok(())
    }

    fn record_stats(
        &self,
        address: &Address,
        kind: StatsKind,
        number: u64,
    ) -> Result<(), ChainError> {
        let mut stats = self.get_validator_stats(address)?;
        match kind {
            StatsKind::Forged => stats.blocks_forged += 1,
            StatsKind::Hit => stats.turns_hit += 1,
            StatsKind::Missed => stats.turns_missed += 1,
        }
        self.index.put(
            &prefixed_key(TYPE_VALIDATOR_STATS, address),
            &stats.to_bytes(),
        )?;

        let mut recent = self.get_recent_validator_stats(address)?;
        recent.record(kind, number);
        self.index.put(
            &prefixed_key(TYPE_RECENT_VALIDATOR_STATS, address),
            &recent.to_bytes(),
        )?;
        Ok(())
    }

    fn update_validators(
        &self,
        number: u64,
        delegates: &dyn DelegateState,
    ) -> Result<(), ChainError> {
        let target = self.config.number_of_validators(number) as usize;
        let validators: Vec<Address> = delegates
            .get_delegates()
            .into_iter()
            .take(target)
            .map(|delegate| delegate.address)
            .collect();

        let mut enc = Encoder::new();
        enc.write_u32(validators.len() as u32);
        for address in &validators {
            enc.write_bytes(address);
        }
        self.index.put(&[TYPE_VALIDATORS], &enc.into_bytes())?;
        debug!(number, validators = validators.len(), "validator set updated");
        Ok(())
    }
}

fn read_block(blocks: &dyn KvStore, number: u64) -> Result<Option<Block>, ChainError> {
    let header = match blocks.get(&block_key(TYPE_BLOCK_HEADER, number))? {
        Some(bytes) => bytes,
        None => return Ok(None),
    };
    let transactions = blocks
        .get(&block_key(TYPE_BLOCK_TRANSACTIONS, number))?
        .ok_or_else(|| ChainError::Corrupted(format!("transactions of block {number} missing")))?;
    let results = blocks
        .get(&block_key(TYPE_BLOCK_RESULTS, number))?
        .ok_or_else(|| ChainError::Corrupted(format!("results of block {number} missing")))?;
    let votes = blocks
        .get(&block_key(TYPE_BLOCK_VOTES, number))?
        .ok_or_else(|| ChainError::Corrupted(format!("votes of block {number} missing")))?;
    Ok(Some(Block::from_bytes(
        &header,
        &transactions,
        &results,
        &votes,
    )?))
}

fn block_key(tag: u8, number: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(tag);
    key.extend_from_slice(&number.to_be_bytes());
    key
}

fn prefixed_key(tag: u8, suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + suffix.len());
    key.push(tag);
    key.extend_from_slice(suffix);
    key
}

fn account_transaction_key(address: &Address, n: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(25);
    key.push(TYPE_ACCOUNT_TRANSACTION);
    key.extend_from_slice(address);
    key.extend_from_slice(&n.to_be_bytes());
    key
}
