// src/fraud_proof_system/state_transition.rs
//! State Transition implementation for the Fraud Proof System
//!
//! Replays transfers against a single account record. The sender side checks
//! balance and nonce, debits, and bumps the nonce; the receiver side credits.
//! Accounts on neither side pass through unchanged, which lets a challenger
//! fold a whole batch over the one account it disputes.

use ethereum_types::{Address, U256};
use thiserror::Error;

use super::account_state::{Account, Transaction};

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Sender cannot cover the amount
    #[error("Insufficient balance: {address:?} holds {balance}, transaction moves {amount}")]
    InsufficientBalance {
        address: Address,
        balance: U256,
        amount: U256,
    },

    /// Transaction nonce does not match the sender's next nonce
    #[error("Nonce mismatch for {address:?}: expected {expected}, got {got}")]
    NonceMismatch {
        address: Address,
        expected: u64,
        got: u64,
    },

    /// Balance or nonce would wrap
    #[error("Arithmetic overflow applying transaction to {address:?}")]
    Overflow { address: Address },
}

/// First failing transaction of a sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Transaction {index} failed: {error}")]
pub struct SequenceError {
    /// Position of the failing transaction
    pub index: usize,

    /// Why it failed
    pub error: TransitionError,
}

/// Apply one transaction to `before` and return the resulting record
pub fn apply_transaction(before: &Account, tx: &Transaction) -> Result<Account, TransitionError> {
    let address = before.address;
    let mut after = *before;

    if !tx.is_mint() && address == tx.from {
        if before.balance < tx.amount {
            return Err(TransitionError::InsufficientBalance {
                address,
                balance: before.balance,
                amount: tx.amount,
            });
        }
        if tx.nonce != before.nonce {
            return Err(TransitionError::NonceMismatch {
                address,
                expected: before.nonce,
                got: tx.nonce,
            });
        }

        after.balance = before.balance - tx.amount;
        after.nonce = before
            .nonce
            .checked_add(1)
            .ok_or(TransitionError::Overflow { address })?;
    }

    if address == tx.to {
        after.balance = after
            .balance
            .checked_add(tx.amount)
            .ok_or(TransitionError::Overflow { address })?;
    }

    Ok(after)
}

/// Fold a sequence of transactions over `before`
pub fn apply_transactions(before: &Account, transactions: &[Transaction]) -> Result<Account, SequenceError> {
    transactions
        .iter()
        .enumerate()
        .try_fold(*before, |account, (index, tx)| {
            apply_transaction(&account, tx).map_err(|error| SequenceError { index, error })
        })
}
