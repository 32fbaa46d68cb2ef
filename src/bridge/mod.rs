// src/bridge/mod.rs
//! Bridge module
//!
//! Moves ETH between L1 and the rollup. The L1 half ([`L1Bridge`]) holds the
//! locked ETH and releases it only after a pending period; the L2 half
//! ([`L2Bridge`]) mints and burns the wrapped token. Each half only accepts
//! cross-chain calls from its configured counterpart address.
//!
//! Every unit of locked ETH is accounted for in exactly one place: an unspent
//! deposit credit, a wrapped token in circulation, a withdrawable credit, or a
//! pending withdrawal. [`check_backing`] verifies that.

mod l1_bridge;
mod l2_bridge;
mod wrapped_token;

pub use l1_bridge::*;
pub use l2_bridge::*;
pub use wrapped_token::*;

use ethereum_types::{Address, U256};
use thiserror::Error;

use crate::interfaces::{TokenError, WrappedToken};

/// The default pending withdrawal period in seconds (1 day)
pub const DEFAULT_PENDING_PERIOD: u64 = 24 * 60 * 60;

/// Errors raised by either bridge half
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Caller is not the bridge owner
    #[error("Caller {caller:?} is not the bridge owner")]
    Unauthorized { caller: Address },

    /// L2 counterpart can only be configured once
    #[error("L2 counterpart already set to {0:?}")]
    CounterpartAlreadySet(Address),

    /// L2 counterpart has not been configured yet
    #[error("L2 counterpart not set")]
    CounterpartNotSet,

    /// Cross-chain call from an address other than the counterpart
    #[error("Caller {caller:?} is not the counterpart bridge {expected:?}")]
    NotCounterpart { caller: Address, expected: Address },

    /// The bridge instance passed in is not the configured counterpart
    #[error("Bridge {got:?} is not the configured counterpart {expected:?}")]
    CounterpartMismatch { expected: Address, got: Address },

    /// Zero-value operation
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Not enough unspent deposit credit
    #[error("Insufficient deposit: {account:?} has {available}, needs {amount}")]
    InsufficientDeposit {
        account: Address,
        available: U256,
        amount: U256,
    },

    /// Not enough credit from L2 burns
    #[error("Insufficient withdrawable balance: {account:?} has {available}, needs {amount}")]
    InsufficientWithdrawableBalance {
        account: Address,
        available: U256,
        amount: U256,
    },

    /// Only one outstanding request per account
    #[error("Withdrawal already pending for {0:?}")]
    WithdrawalAlreadyPending(Address),

    /// Nothing to withdraw
    #[error("No pending withdrawal for {0:?}")]
    NoPendingWithdrawal(Address),

    /// Withdrawal requested too recently
    #[error("Withdrawal for {account:?} available at {available_at} (now {now})")]
    PendingPeriodNotElapsed {
        account: Address,
        available_at: u64,
        now: u64,
    },

    /// Locked ETH and outstanding claims disagree
    #[error("Backing mismatch: {locked} wei locked, {claimed} wei claimed")]
    BackingMismatch { locked: U256, claimed: U256 },

    /// Wrapped token rejected the operation
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Balance arithmetic would wrap
    #[error("Bridge arithmetic overflow")]
    Overflow,
}

/// Withdrawal waiting for its pending period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWithdrawal {
    /// Account receiving the ETH
    pub account: Address,

    /// Amount in wei
    pub amount: U256,

    /// Timestamp of the request
    pub requested_at: u64,
}

/// Verify that the ETH locked on L1 equals all outstanding claims on it
pub fn check_backing<T>(l1: &L1Bridge, token: &T) -> Result<(), BridgeError>
where
    T: WrappedToken + ?Sized,
{
    let claimed = l1
        .outstanding_claims()?
        .checked_add(token.total_supply())
        .ok_or(BridgeError::Overflow)?;
    let locked = l1.locked_balance();

    if locked != claimed {
        return Err(BridgeError::BackingMismatch { locked, claimed });
    }
    Ok(())
}

fn sum_amounts<'a, I>(amounts: I) -> Result<U256, BridgeError>
where
    I: IntoIterator<Item = &'a U256>,
{
    amounts
        .into_iter()
        .try_fold(U256::zero(), |total, amount| total.checked_add(*amount).ok_or(BridgeError::Overflow))
}
