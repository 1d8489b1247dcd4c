// Copyright (c) 2026 Meridian Foundation

//! The deterministic transaction executor.
//!
//! A pure function over an ordered transaction list and the two state
//! interfaces: one result per transaction, in input order. Invalid
//! transactions never raise errors -- invalidity is a result code and
//! execution continues with the next transaction. Checks run in a fixed
//! order and the first failure wins, with no state mutation before it.
//!
//! Transaction format and signatures are assumed validated upstream.

use std::sync::Arc;

use crate::config::ChainConfig;
use crate::state::{AccountState, DelegateState};
use crate::transaction::{Transaction, TransactionResult, TxError, TxType, ZERO_ADDRESS};

/// 3..=16 bytes drawn from `[a-z0-9_]`.
pub fn validate_delegate_name(data: &[u8]) -> bool {
    (3..=16).contains(&data.len())
        && data
            .iter()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'))
}

pub struct TransactionExecutor {
    config: Arc<ChainConfig>,
}

impl TransactionExecutor {
    pub fn new(config: Arc<ChainConfig>) -> Self {
        Self { config }
    }

    /// Execute transactions in order against the given states. The caller
    /// must hold exclusive access to both states for the duration of the
    /// call; the executor itself keeps no state between calls.
    pub fn execute(
        &self,
        txs: &[Transaction],
        accounts: &mut dyn AccountState,
        delegates: &mut dyn DelegateState,
    ) -> Vec<TransactionResult> {
        txs.iter()
            .map(|tx| self.execute_one(tx, accounts, delegates))
            .collect()
    }

    /// Execute a single transaction.
    pub fn execute_one(
        &self,
        tx: &Transaction,
        accounts: &mut dyn AccountState,
        delegates: &mut dyn DelegateState,
    ) -> TransactionResult {
        let account = accounts.get_account(&tx.from);
        let available = account.available;
        let locked = account.locked;

        if tx.nonce != account.nonce {
            return TransactionResult::failure(TxError::InvalidNonce);
        }

        if tx.fee < self.config.min_transaction_fee() {
            return TransactionResult::failure(TxError::InvalidFee);
        }

        if tx.data.len() > self.config.max_transaction_data_size(tx.tx_type) {
            return TransactionResult::failure(TxError::InvalidDataLength);
        }

        // value + fee, treating overflow as insufficiency rather than a fault
        let total = tx.value.checked_add(tx.fee);

        let result = match tx.tx_type {
            TxType::Transfer => match total {
                Some(total) if total <= available => {
                    accounts.adjust_available(&tx.from, -(total.nanos() as i128));
                    accounts.adjust_available(&tx.to, tx.value.nanos() as i128);
                    TransactionResult::success()
                }
                _ => TransactionResult::failure(TxError::InsufficientAvailable),
            },

            TxType::Delegate => {
                if !validate_delegate_name(&tx.data) {
                    TransactionResult::failure(TxError::InvalidDelegateName)
                } else if tx.value < self.config.min_delegate_burn() {
                    TransactionResult::failure(TxError::InvalidDelegateBurnAmount)
                } else {
                    match total {
                        Some(total) if total <= available => {
                            if tx.to == ZERO_ADDRESS && delegates.register(&tx.from, &tx.data) {
                                // the burn is debited and credited nowhere
                                accounts.adjust_available(&tx.from, -(total.nanos() as i128));
                                TransactionResult::success()
                            } else {
                                TransactionResult::failure(TxError::Failed)
                            }
                        }
                        _ => TransactionResult::failure(TxError::InsufficientAvailable),
                    }
                }
            }

            TxType::Vote => match total {
                Some(total) if total <= available => {
                    if delegates.vote(&tx.from, &tx.to, tx.value) {
                        accounts.adjust_available(&tx.from, -(total.nanos() as i128));
                        accounts.adjust_locked(&tx.from, tx.value.nanos() as i128);
                        TransactionResult::success()
                    } else {
                        TransactionResult::failure(TxError::Failed)
                    }
                }
                _ => TransactionResult::failure(TxError::InsufficientAvailable),
            },

            TxType::Unvote => {
                if available < tx.fee {
                    TransactionResult::failure(TxError::InsufficientAvailable)
                } else if locked < tx.value {
                    TransactionResult::failure(TxError::InsufficientLocked)
                } else if delegates.unvote(&tx.from, &tx.to, tx.value) {
                    // net effect: value moves from locked to available, fee leaves
                    accounts.adjust_available(
                        &tx.from,
                        tx.value.nanos() as i128 - tx.fee.nanos() as i128,
                    );
                    accounts.adjust_locked(&tx.from, -(tx.value.nanos() as i128));
                    TransactionResult::success()
                } else {
                    TransactionResult::failure(TxError::Failed)
                }
            }

            // coinbase transactions are synthesized by the ledger store and
            // never executed
            TxType::Coinbase => TransactionResult::failure(TxError::InvalidType),
        };

        if result.success {
            accounts.increase_nonce(&tx.from);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::config::Network;
    use crate::state::memory::{MemoryAccountState, MemoryDelegateState};
    use crate::state::Account;

    fn addr(b: u8) -> crate::transaction::Address {
        [b; 20]
    }

    fn executor() -> TransactionExecutor {
        TransactionExecutor::new(Arc::new(ChainConfig::devnet()))
    }

    fn tx(
        tx_type: TxType,
        from: u8,
        to: crate::transaction::Address,
        value: u64,
        fee: u64,
        nonce: u64,
        data: &[u8],
    ) -> Transaction {
        Transaction::new(
            Network::Devnet,
            tx_type,
            addr(from),
            to,
            Amount::from_nanos(value),
            Amount::from_nanos(fee),
            nonce,
            0,
            data.to_vec(),
            vec![0; 64],
        )
    }

    fn fund(accounts: &mut MemoryAccountState, who: u8, nanos: u64) {
        accounts.adjust_available(&addr(who), nanos as i128);
    }

    #[test]
    fn test_transfer_debits_and_credits() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 21);

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), 20, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );

        assert!(result.success);
        assert_eq!(
            accounts.get_account(&addr(1)),
            Account {
                available: Amount::ZERO,
                locked: Amount::ZERO,
                nonce: 1
            }
        );
        assert_eq!(
            accounts.get_account(&addr(2)).available,
            Amount::from_nanos(20)
        );
    }

    #[test]
    fn test_invalid_nonce_leaves_state_untouched() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 100);

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), 20, 1, 5, b""),
            &mut accounts,
            &mut delegates,
        );

        assert_eq!(result.error, Some(TxError::InvalidNonce));
        assert_eq!(
            accounts.get_account(&addr(1)).available,
            Amount::from_nanos(100)
        );
        assert_eq!(accounts.get_account(&addr(1)).nonce, 0);
        assert_eq!(accounts.get_account(&addr(2)).available, Amount::ZERO);
    }

    #[test]
    fn test_fee_below_minimum() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 100);

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), 20, 0, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InvalidFee));
    }

    #[test]
    fn test_oversized_data() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 100);

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), 20, 1, 0, &[0u8; 129]),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InvalidDataLength));
    }

    #[test]
    fn test_transfer_insufficient_available() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 20); // needs 21

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), 20, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InsufficientAvailable));
        assert_eq!(accounts.get_account(&addr(1)).nonce, 0);
    }

    #[test]
    fn test_delegate_name_rules() {
        assert!(validate_delegate_name(b"abc"));
        assert!(validate_delegate_name(b"delegate_01"));
        assert!(validate_delegate_name(b"exactly_16_chars"));
        assert!(!validate_delegate_name(b"ab"));
        assert!(!validate_delegate_name(b"seventeen_chars__"));
        assert!(!validate_delegate_name(b"UPPER"));
        assert!(!validate_delegate_name(b"with space"));
    }

    #[test]
    fn test_delegate_registration_burns_value() {
        let config = ChainConfig::devnet();
        let burn = config.min_delegate_burn().nanos();
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, burn + 1);

        let result = executor().execute_one(
            &tx(TxType::Delegate, 1, ZERO_ADDRESS, burn, 1, 0, b"alpha"),
            &mut accounts,
            &mut delegates,
        );

        assert!(result.success);
        assert_eq!(accounts.get_account(&addr(1)).available, Amount::ZERO);
        assert_eq!(delegates.get_delegates().len(), 1);
    }

    #[test]
    fn test_delegate_second_registration_fails() {
        let config = ChainConfig::devnet();
        let burn = config.min_delegate_burn().nanos();
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 10 * burn);

        let exec = executor();
        let first = exec.execute_one(
            &tx(TxType::Delegate, 1, ZERO_ADDRESS, burn, 1, 0, b"alpha"),
            &mut accounts,
            &mut delegates,
        );
        assert!(first.success);

        let second = exec.execute_one(
            &tx(TxType::Delegate, 1, ZERO_ADDRESS, burn, 1, 1, b"bravo"),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(second.error, Some(TxError::Failed));
    }

    #[test]
    fn test_delegate_to_must_be_zero_address() {
        let config = ChainConfig::devnet();
        let burn = config.min_delegate_burn().nanos();
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 10 * burn);

        let result = executor().execute_one(
            &tx(TxType::Delegate, 1, addr(9), burn, 1, 0, b"alpha"),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::Failed));
    }

    #[test]
    fn test_delegate_name_too_long() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, u64::MAX / 2);

        // 17 bytes: rejected by the data-size limit for DELEGATE
        let result = executor().execute_one(
            &tx(
                TxType::Delegate,
                1,
                ZERO_ADDRESS,
                Amount::from_coins(1).nanos(),
                1,
                0,
                b"seventeen_chars__",
            ),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InvalidDataLength));
    }

    #[test]
    fn test_vote_locks_value() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        delegates.register(&addr(9), b"alpha");
        fund(&mut accounts, 1, 101);

        let result = executor().execute_one(
            &tx(TxType::Vote, 1, addr(9), 100, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );

        assert!(result.success);
        let account = accounts.get_account(&addr(1));
        assert_eq!(account.available, Amount::ZERO);
        assert_eq!(account.locked, Amount::from_nanos(100));
        assert_eq!(
            delegates.get_vote(&addr(1), &addr(9)),
            Amount::from_nanos(100)
        );
    }

    #[test]
    fn test_vote_for_unregistered_delegate_fails() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 101);

        let result = executor().execute_one(
            &tx(TxType::Vote, 1, addr(9), 100, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::Failed));
        assert_eq!(
            accounts.get_account(&addr(1)).available,
            Amount::from_nanos(101)
        );
    }

    #[test]
    fn test_unvote_releases_locked() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        delegates.register(&addr(9), b"alpha");
        fund(&mut accounts, 1, 101);

        let exec = executor();
        exec.execute_one(
            &tx(TxType::Vote, 1, addr(9), 100, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        fund(&mut accounts, 1, 1); // fee for the unvote

        let result = exec.execute_one(
            &tx(TxType::Unvote, 1, addr(9), 100, 1, 1, b""),
            &mut accounts,
            &mut delegates,
        );

        assert!(result.success);
        let account = accounts.get_account(&addr(1));
        assert_eq!(account.available, Amount::from_nanos(100)); // 1 + 100 - 1
        assert_eq!(account.locked, Amount::ZERO);
        assert_eq!(account.nonce, 2);
    }

    #[test]
    fn test_unvote_more_than_locked() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        delegates.register(&addr(9), b"alpha");
        fund(&mut accounts, 1, 10);

        let result = executor().execute_one(
            &tx(TxType::Unvote, 1, addr(9), 100, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InsufficientLocked));
    }

    #[test]
    fn test_coinbase_type_is_rejected() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 100);

        let result = executor().execute_one(
            &tx(TxType::Coinbase, 1, addr(2), 10, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InvalidType));
    }

    #[test]
    fn test_results_in_input_order_and_failures_do_not_abort() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, 42);

        let txs = vec![
            tx(TxType::Transfer, 1, addr(2), 20, 1, 0, b""),
            tx(TxType::Transfer, 1, addr(2), 999, 1, 1, b""), // insufficient
            tx(TxType::Transfer, 1, addr(2), 20, 1, 1, b""),  // nonce still 1
        ];
        let results = executor().execute(&txs, &mut accounts, &mut delegates);

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert_eq!(results[1].error, Some(TxError::InsufficientAvailable));
        assert!(results[2].success);
        assert_eq!(accounts.get_account(&addr(1)).nonce, 2);
        assert_eq!(
            accounts.get_account(&addr(2)).available,
            Amount::from_nanos(40)
        );
    }

    #[test]
    fn test_value_plus_fee_overflow_is_insufficiency() {
        let mut accounts = MemoryAccountState::new();
        let mut delegates = MemoryDelegateState::new();
        fund(&mut accounts, 1, u64::MAX);

        let result = executor().execute_one(
            &tx(TxType::Transfer, 1, addr(2), u64::MAX, 1, 0, b""),
            &mut accounts,
            &mut delegates,
        );
        assert_eq!(result.error, Some(TxError::InsufficientAvailable));
    }
}
