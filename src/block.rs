// Copyright (c) 2026 Meridian Foundation

//! Block and block-header types.
//!
//! A block is a header plus the ordered transactions, their execution results
//! (computed before block assembly, persisted alongside) and an opaque votes
//! blob. The four parts serialize independently because the ledger store
//! persists them under separate keys and reconstructs single transactions by
//! slicing into the serialized body.

use sha2::{Digest, Sha256};

use crate::codec::{DecodeError, Decoder, Encoder};
use crate::transaction::{read_address, read_hash, Address, Hash, Transaction, TransactionResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Monotonic from 0; globally unique.
    pub number: u64,
    /// Address credited by this block's coinbase transaction.
    pub coinbase: Address,
    pub parent_hash: Hash,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    pub transactions_root: Hash,
    pub results_root: Hash,
    pub state_root: Hash,
    pub data: Vec<u8>,
}

impl BlockHeader {
    /// SHA-256 over the header fields; the block's identity.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.coinbase);
        hasher.update(self.parent_hash);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.transactions_root);
        hasher.update(self.results_root);
        hasher.update(self.state_root);
        hasher.update(&self.data);
        hasher.finalize().into()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(160 + self.data.len());
        enc.write_u64(self.number);
        enc.write_bytes(&self.coinbase);
        enc.write_bytes(&self.parent_hash);
        enc.write_u64(self.timestamp);
        enc.write_bytes(&self.transactions_root);
        enc.write_bytes(&self.results_root);
        enc.write_bytes(&self.state_root);
        enc.write_bytes(&self.data);
        enc.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        Ok(Self {
            number: dec.read_u64()?,
            coinbase: read_address(&mut dec)?,
            parent_hash: read_hash(&mut dec)?,
            timestamp: dec.read_u64()?,
            transactions_root: read_hash(&mut dec)?,
            results_root: read_hash(&mut dec)?,
            state_root: read_hash(&mut dec)?,
            data: dec.read_bytes()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub results: Vec<TransactionResult>,
    /// Consensus votes for this block; opaque to the ledger core.
    pub votes: Vec<u8>,
}

impl Block {
    pub fn new(
        header: BlockHeader,
        transactions: Vec<Transaction>,
        results: Vec<TransactionResult>,
    ) -> Self {
        Self {
            header,
            transactions,
            results,
            votes: Vec::new(),
        }
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn coinbase(&self) -> Address {
        self.header.coinbase
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn to_bytes_header(&self) -> Vec<u8> {
        self.header.to_bytes()
    }

    /// Count-prefixed concatenation of the serialized transactions. Each entry
    /// is itself length-prefixed so a reader can slice one transaction out by
    /// byte offset.
    pub fn to_bytes_transactions(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_u32(self.transactions.len() as u32);
        for tx in &self.transactions {
            enc.write_bytes(&tx.to_bytes());
        }
        enc.into_bytes()
    }

    pub fn to_bytes_results(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_u32(self.results.len() as u32);
        for result in &self.results {
            enc.write_bytes(&result.to_bytes());
        }
        enc.into_bytes()
    }

    pub fn to_bytes_votes(&self) -> Vec<u8> {
        self.votes.clone()
    }

    /// Byte offsets of the i-th transaction and result within the serialized
    /// bodies, pointing at each entry's length prefix. Persisted by the ledger
    /// store so lookups can slice without decoding the whole block.
    pub fn transaction_indices(&self) -> Vec<(u32, u32)> {
        let mut indices = Vec::with_capacity(self.transactions.len());
        let mut tx_offset = 4u32; // past the count prefix
        let mut result_offset = 4u32;
        for (tx, result) in self.transactions.iter().zip(&self.results) {
            indices.push((tx_offset, result_offset));
            tx_offset += 4 + tx.to_bytes().len() as u32;
            result_offset += 4 + result.to_bytes().len() as u32;
        }
        indices
    }

    pub fn from_bytes(
        header: &[u8],
        transactions: &[u8],
        results: &[u8],
        votes: &[u8],
    ) -> Result<Self, DecodeError> {
        let header = BlockHeader::from_bytes(header)?;

        let mut dec = Decoder::new(transactions);
        let count = dec.read_u32()?;
        let mut txs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            txs.push(Transaction::from_bytes(dec.read_slice()?)?);
        }

        let mut dec = Decoder::new(results);
        let count = dec.read_u32()?;
        let mut res = Vec::with_capacity(count as usize);
        for _ in 0..count {
            res.push(TransactionResult::from_bytes(dec.read_slice()?)?);
        }

        Ok(Self {
            header,
            transactions: txs,
            results: res,
            votes: votes.to_vec(),
        })
    }
}

/// Digest over the ordered transaction hashes. The ledger core treats roots
/// as opaque; this helper exists for block assembly and tests.
pub fn transactions_root(transactions: &[Transaction]) -> Hash {
    let mut hasher = Sha256::new();
    for tx in transactions {
        hasher.update(tx.hash());
    }
    hasher.finalize().into()
}

/// Digest over the ordered serialized results.
pub fn results_root(results: &[TransactionResult]) -> Hash {
    let mut hasher = Sha256::new();
    for result in results {
        hasher.update(result.to_bytes());
    }
    hasher.finalize().into()
}
