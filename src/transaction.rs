// Copyright (c) 2026 Meridian Foundation

//! Transaction and transaction-result types.
//!
//! Signature bytes are carried opaquely; validation happens upstream before a
//! transaction ever reaches the ledger store or the executor. The hash is a
//! SHA-256 digest over the signed fields and serves as the transaction's
//! identity everywhere in the index.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::amount::Amount;
use crate::codec::{DecodeError, Decoder, Encoder};
use crate::config::Network;

/// A 20-byte account address.
pub type Address = [u8; 20];

/// A 32-byte digest.
pub type Hash = [u8; 32];

/// The all-zero address. DELEGATE registrations must target it; the burned
/// registration value is credited nowhere.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Synthetic sender address for coinbase transactions.
/// ASCII "MERIDIAN_COINBASE" padded to 20 bytes.
pub const COINBASE_ADDRESS: Address = *b"MERIDIAN_COINBASE\0\0\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    Coinbase,
    Transfer,
    Delegate,
    Vote,
    Unvote,
}

impl TxType {
    pub fn to_u8(self) -> u8 {
        match self {
            TxType::Coinbase => 0,
            TxType::Transfer => 1,
            TxType::Delegate => 2,
            TxType::Vote => 3,
            TxType::Unvote => 4,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(TxType::Coinbase),
            1 => Some(TxType::Transfer),
            2 => Some(TxType::Delegate),
            3 => Some(TxType::Vote),
            4 => Some(TxType::Unvote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub network: Network,
    pub tx_type: TxType,
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub fee: Amount,
    /// Must equal the sender's account nonce at execution time. For coinbase
    /// transactions this carries the block number instead.
    pub nonce: u64,
    /// Milliseconds since the epoch.
    pub timestamp: u64,
    pub data: Vec<u8>,
    /// Opaque, validated upstream. Empty for synthetic coinbase transactions.
    pub signature: Vec<u8>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network: Network,
        tx_type: TxType,
        from: Address,
        to: Address,
        value: Amount,
        fee: Amount,
        nonce: u64,
        timestamp: u64,
        data: Vec<u8>,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            network,
            tx_type,
            from,
            to,
            value,
            fee,
            nonce,
            timestamp,
            data,
            signature,
        }
    }

    /// Synthesize the unsigned coinbase transaction crediting `to` with the
    /// block reward plus collected fees. The nonce field carries the block
    /// number so the containing block can be resolved without an offset entry.
    pub fn coinbase(network: Network, to: Address, value: Amount, number: u64, timestamp: u64) -> Self {
        Self {
            network,
            tx_type: TxType::Coinbase,
            from: COINBASE_ADDRESS,
            to,
            value,
            fee: Amount::ZERO,
            nonce: number,
            timestamp,
            data: Vec::new(),
            signature: Vec::new(),
        }
    }

    /// SHA-256 over the signed fields (everything except the signature).
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update([self.network.id()]);
        hasher.update([self.tx_type.to_u8()]);
        hasher.update(self.from);
        hasher.update(self.to);
        hasher.update(self.value.nanos().to_be_bytes());
        hasher.update(self.fee.nanos().to_be_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(&self.data);
        hasher.finalize().into()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(96 + self.data.len() + self.signature.len());
        enc.write_u8(self.network.id());
        enc.write_u8(self.tx_type.to_u8());
        enc.write_bytes(&self.from);
        enc.write_bytes(&self.to);
        enc.write_u64(self.value.nanos());
        enc.write_u64(self.fee.nanos());
        enc.write_u64(self.nonce);
        enc.write_u64(self.timestamp);
        enc.write_bytes(&self.data);
        enc.write_bytes(&self.signature);
        enc.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);

        let network = match dec.read_u8()? {
            0 => Network::Mainnet,
            1 => Network::Testnet,
            2 => Network::Devnet,
            _ => return Err(DecodeError::InvalidField { field: "network" }),
        };
        let tx_type = TxType::from_u8(dec.read_u8()?)
            .ok_or(DecodeError::InvalidField { field: "transaction type" })?;
        let from = read_address(&mut dec)?;
        let to = read_address(&mut dec)?;
        let value = Amount::from_nanos(dec.read_u64()?);
        let fee = Amount::from_nanos(dec.read_u64()?);
        let nonce = dec.read_u64()?;
        let timestamp = dec.read_u64()?;
        let data = dec.read_bytes()?;
        let signature = dec.read_bytes()?;

        Ok(Self {
            network,
            tx_type,
            from,
            to,
            value,
            fee,
            nonce,
            timestamp,
            data,
            signature,
        })
    }
}

pub(crate) fn read_address(dec: &mut Decoder<'_>) -> Result<Address, DecodeError> {
    dec.read_slice()?
        .try_into()
        .map_err(|_| DecodeError::InvalidField { field: "address" })
}

pub(crate) fn read_hash(dec: &mut Decoder<'_>) -> Result<Hash, DecodeError> {
    dec.read_slice()?
        .try_into()
        .map_err(|_| DecodeError::InvalidField { field: "hash" })
}

/// Why a transaction was rejected. Encoded in the persisted result, never
/// raised as an error: execution always continues with the next transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("invalid nonce")]
    InvalidNonce,
    #[error("fee below minimum")]
    InvalidFee,
    #[error("data exceeds size limit")]
    InvalidDataLength,
    #[error("invalid delegate name")]
    InvalidDelegateName,
    #[error("delegate burn amount below minimum")]
    InvalidDelegateBurnAmount,
    #[error("insufficient available balance")]
    InsufficientAvailable,
    #[error("insufficient locked balance")]
    InsufficientLocked,
    #[error("invalid transaction type")]
    InvalidType,
    #[error("rejected by state")]
    Failed,
}

impl TxError {
    fn to_u8(self) -> u8 {
        match self {
            TxError::InvalidNonce => 1,
            TxError::InvalidFee => 2,
            TxError::InvalidDataLength => 3,
            TxError::InvalidDelegateName => 4,
            TxError::InvalidDelegateBurnAmount => 5,
            TxError::InsufficientAvailable => 6,
            TxError::InsufficientLocked => 7,
            TxError::InvalidType => 8,
            TxError::Failed => 9,
        }
    }

    fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(TxError::InvalidNonce),
            2 => Some(TxError::InvalidFee),
            3 => Some(TxError::InvalidDataLength),
            4 => Some(TxError::InvalidDelegateName),
            5 => Some(TxError::InvalidDelegateBurnAmount),
            6 => Some(TxError::InsufficientAvailable),
            7 => Some(TxError::InsufficientLocked),
            8 => Some(TxError::InvalidType),
            9 => Some(TxError::Failed),
            _ => None,
        }
    }
}

/// The outcome of executing one transaction. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    pub success: bool,
    pub error: Option<TxError>,
    /// Opaque payload for callers; unused by the core itself.
    pub returns: Vec<u8>,
}

impl TransactionResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
            returns: Vec::new(),
        }
    }

    pub fn failure(error: TxError) -> Self {
        Self {
            success: false,
            error: Some(error),
            returns: Vec::new(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(10 + self.returns.len());
        enc.write_bool(self.success);
        enc.write_u8(self.error.map_or(0, TxError::to_u8));
        enc.write_bytes(&self.returns);
        enc.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        let success = dec.read_bool()?;
        let error = match dec.read_u8()? {
            0 => None,
            code => Some(
                TxError::from_u8(code)
                    .ok_or(DecodeError::InvalidField { field: "error code" })?,
            ),
        };
        let returns = dec.read_bytes()?;
        Ok(Self {
            success,
            error,
            returns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new(
            Network::Devnet,
            TxType::Transfer,
            [0x11; 20],
            [0x22; 20],
            Amount::from_nanos(20),
            Amount::from_nanos(1),
            7,
            1_600_000_000_000,
            b"memo".to_vec(),
            vec![0xab; 64],
        )
    }

    #[test]
    fn test_roundtrip() {
        let tx = sample_tx();
        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(tx, decoded);
        assert_eq!(tx.hash(), decoded.hash());
    }

    #[test]
    fn test_hash_excludes_signature() {
        let mut a = sample_tx();
        let mut b = sample_tx();
        a.signature = vec![0x00; 64];
        b.signature = vec![0xff; 64];
        assert_eq!(a.hash(), b.hash());

        b.nonce += 1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_coinbase_encoding_exceeds_offset_triple_size() {
        // the ledger index discriminates coinbase entries from offset triples
        // by length: triples are 16 bytes, so a coinbase must encode longer
        // than 64 bytes
        let tx = Transaction::coinbase(
            Network::Devnet,
            [0x33; 20],
            Amount::from_coins(3),
            42,
            1_600_000_000_000,
        );
        assert!(tx.to_bytes().len() > 64);
        assert_eq!(tx.nonce, 42);
        assert_eq!(tx.from, COINBASE_ADDRESS);
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let bytes = sample_tx().to_bytes();
        assert!(Transaction::from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn test_unknown_type_tag_fails() {
        let mut bytes = sample_tx().to_bytes();
        bytes[1] = 0x7f;
        assert!(matches!(
            Transaction::from_bytes(&bytes),
            Err(DecodeError::InvalidField { field: "transaction type" })
        ));
    }

    #[test]
    fn test_result_roundtrip() {
        for result in [
            TransactionResult::success(),
            TransactionResult::failure(TxError::InvalidNonce),
            TransactionResult::failure(TxError::Failed),
        ] {
            let decoded = TransactionResult::from_bytes(&result.to_bytes()).unwrap();
            assert_eq!(result, decoded);
        }
    }
}
