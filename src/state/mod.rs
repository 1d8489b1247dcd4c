// Copyright (c) 2026 Meridian Foundation

//! Account and delegate state contracts.
//!
//! The ledger core consumes these interfaces; the enclosing node owns the
//! implementations. The executor and the ledger store take exclusive
//! references for the duration of a call and never retain them.

pub mod memory;

use crate::amount::Amount;
use crate::transaction::Address;

/// A snapshot of one account's balances and nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    /// Spendable balance.
    pub available: Amount,
    /// Balance committed to active votes; spendable again after unvoting.
    pub locked: Amount,
    /// Next expected transaction nonce.
    pub nonce: u64,
}

impl Account {
    pub fn empty() -> Self {
        Self {
            available: Amount::ZERO,
            locked: Amount::ZERO,
            nonce: 0,
        }
    }
}

/// Balance and nonce bookkeeping.
///
/// Deltas are signed; implementations must never let a balance go negative.
/// The executor's pre-checks guarantee that, so a negative result indicates a
/// programmer error, not a user-facing condition.
pub trait AccountState {
    /// Zero-valued account if the address has never been touched.
    fn get_account(&self, address: &Address) -> Account;

    fn adjust_available(&mut self, address: &Address, delta: i128);

    fn adjust_locked(&mut self, address: &Address, delta: i128);

    fn increase_nonce(&mut self, address: &Address);

    /// Flush pending changes to backing storage.
    fn commit(&mut self);
}

/// A registered delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegate {
    pub address: Address,
    /// 3..=16 bytes of `[a-z0-9_]`, unique across the registry.
    pub name: Vec<u8>,
    /// Total votes received.
    pub votes: Amount,
}

/// Delegate registry and vote ledger.
///
/// The boolean returns express state-layer rejection (name taken, unknown
/// delegate, vote accounting underflow); the executor maps them to `FAILED`.
pub trait DelegateState {
    /// All delegates ranked by descending vote total, ties broken by
    /// registration order.
    fn get_delegates(&self) -> Vec<Delegate>;

    /// False if the name or the address is already registered.
    fn register(&mut self, address: &Address, name: &[u8]) -> bool;

    /// False if `delegate` is not registered.
    fn vote(&mut self, voter: &Address, delegate: &Address, amount: Amount) -> bool;

    /// False if `delegate` is not registered or the voter has fewer than
    /// `amount` votes placed on it.
    fn unvote(&mut self, voter: &Address, delegate: &Address, amount: Amount) -> bool;

    /// Votes `voter` currently has placed on `delegate`.
    fn get_vote(&self, voter: &Address, delegate: &Address) -> Amount;

    /// Flush pending changes to backing storage.
    fn commit(&mut self);
}
