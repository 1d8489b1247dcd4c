//! In-memory state implementations.
//!
//! Complete, deterministic implementations of the state contracts backed by
//! plain maps. Used by tests and by tools that replay chain history without a
//! database; `commit` is a no-op since there is no backing store to flush to.

use std::collections::HashMap;

use crate::amount::Amount;
use crate::state::{Account, AccountState, Delegate, DelegateState};
use crate::transaction::Address;

#[derive(Debug, Default)]
pub struct MemoryAccountState {
    accounts: HashMap<Address, Account>,
}

impl MemoryAccountState {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, address: &Address) -> &mut Account {
        self.accounts.entry(*address).or_insert_with(Account::empty)
    }
}

fn apply_delta(balance: Amount, delta: i128) -> Amount {
    let adjusted = balance.nanos() as i128 + delta;
    debug_assert!(adjusted >= 0, "balance adjustment went negative");
    Amount::from_nanos(adjusted.clamp(0, u64::MAX as i128) as u64)
}

impl AccountState for MemoryAccountState {
    fn get_account(&self, address: &Address) -> Account {
        self.accounts.get(address).copied().unwrap_or_else(Account::empty)
    }

    fn adjust_available(&mut self, address: &Address, delta: i128) {
        let account = self.entry(address);
        account.available = apply_delta(account.available, delta);
    }

    fn adjust_locked(&mut self, address: &Address, delta: i128) {
        let account = self.entry(address);
        account.locked = apply_delta(account.locked, delta);
    }

    fn increase_nonce(&mut self, address: &Address) {
        self.entry(address).nonce += 1;
    }

    fn commit(&mut self) {}
}

#[derive(Debug, Default)]
pub struct MemoryDelegateState {
    /// Registration order is the tie-break for equal vote totals.
    delegates: Vec<Delegate>,
    by_address: HashMap<Address, usize>,
    by_name: HashMap<Vec<u8>, usize>,
    votes: HashMap<(Address, Address), Amount>,
}

impl MemoryDelegateState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelegateState for MemoryDelegateState {
    fn get_delegates(&self) -> Vec<Delegate> {
        let mut ranked = self.delegates.clone();
        // stable sort keeps registration order among equal vote totals
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
        ranked
    }

    fn register(&mut self, address: &Address, name: &[u8]) -> bool {
        if self.by_address.contains_key(address) || self.by_name.contains_key(name) {
            return false;
        }
        let idx = self.delegates.len();
        self.delegates.push(Delegate {
            address: *address,
            name: name.to_vec(),
            votes: Amount::ZERO,
        });
        self.by_address.insert(*address, idx);
        self.by_name.insert(name.to_vec(), idx);
        true
    }

    fn vote(&mut self, voter: &Address, delegate: &Address, amount: Amount) -> bool {
        let Some(&idx) = self.by_address.get(delegate) else {
            return false;
        };
        let entry = self.votes.entry((*voter, *delegate)).or_insert(Amount::ZERO);
        *entry = entry.saturating_add(amount);
        let d = &mut self.delegates[idx];
        d.votes = d.votes.saturating_add(amount);
        true
    }

    fn unvote(&mut self, voter: &Address, delegate: &Address, amount: Amount) -> bool {
        let Some(&idx) = self.by_address.get(delegate) else {
            return false;
        };
        let Some(entry) = self.votes.get_mut(&(*voter, *delegate)) else {
            return false;
        };
        if *entry < amount {
            return false;
        }
        *entry = entry.saturating_sub(amount);
        let d = &mut self.delegates[idx];
        d.votes = d.votes.saturating_sub(amount);
        true
    }

    fn get_vote(&self, voter: &Address, delegate: &Address) -> Amount {
        self.votes
            .get(&(*voter, *delegate))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn commit(&mut self) {}
}
