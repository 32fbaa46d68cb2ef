// src/error_handling/error_types.rs
//! Error types for the settlement core
//!
//! Each component reports its own error enum. [`SettlementError`] wraps all of
//! them so callers driving several components can use a single `?` chain, and
//! classifies every failure into an [`ErrorKind`] and a stable numeric code.
//!
//! Code ranges: 1000 Merkle, 2000 state transition, 3000 rollup, 4000 fraud
//! proof, 5000 bridge, 6000 token, 7000 ledger, 8000 configuration.

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::config::ConfigError;
use crate::fraud_proof_system::{FraudProofError, MerkleError, SequenceError, TransitionError};
use crate::interfaces::TokenError;
use crate::rollup::{LedgerError, RollupError};

/// Broad class of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    InputValidation,

    /// Operation valid in principle but not in the current state or time
    PreconditionNotMet,

    /// Submitted data contradicts committed state
    StateInconsistency,

    /// Caller lacks the required role
    Authorization,
}

/// Base error type for the settlement core
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Merkle tree error
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// State transition error
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Rollup state machine error
    #[error(transparent)]
    Rollup(#[from] RollupError),

    /// Fraud proof error
    #[error(transparent)]
    FraudProof(#[from] FraudProofError),

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Wrapped token error
    #[error(transparent)]
    Token(#[from] TokenError),

    /// L2 ledger error
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<SequenceError> for SettlementError {
    fn from(error: SequenceError) -> Self {
        SettlementError::Transition(error.error)
    }
}

impl SettlementError {
    /// Classification of the underlying failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::Merkle(e) => merkle_kind(e),
            SettlementError::Transition(e) => transition_kind(e),
            SettlementError::Rollup(e) => rollup_kind(e),
            SettlementError::FraudProof(e) => fraud_proof_kind(e),
            SettlementError::Bridge(e) => bridge_kind(e),
            SettlementError::Token(e) => token_kind(e),
            SettlementError::Ledger(e) => ledger_kind(e),
            SettlementError::Config(_) => ErrorKind::InputValidation,
        }
    }

    /// Convert to error code
    pub fn to_error_code(&self) -> u32 {
        match self {
            SettlementError::Merkle(e) => merkle_code(e),
            SettlementError::Transition(e) => transition_code(e),
            SettlementError::Rollup(e) => rollup_code(e),
            SettlementError::FraudProof(e) => fraud_proof_code(e),
            SettlementError::Bridge(e) => bridge_code(e),
            SettlementError::Token(e) => token_code(e),
            SettlementError::Ledger(e) => ledger_code(e),
            SettlementError::Config(e) => match e {
                ConfigError::Io(_) => 8000,
                ConfigError::Parse(_) => 8001,
                ConfigError::Invalid(_) => 8002,
            },
        }
    }
}

fn merkle_kind(_: &MerkleError) -> ErrorKind {
    ErrorKind::InputValidation
}

fn merkle_code(error: &MerkleError) -> u32 {
    match error {
        MerkleError::EmptyLeafSet => 1000,
        MerkleError::IndexOutOfRange { .. } => 1001,
    }
}

fn transition_kind(_: &TransitionError) -> ErrorKind {
    ErrorKind::StateInconsistency
}

fn transition_code(error: &TransitionError) -> u32 {
    match error {
        TransitionError::InsufficientBalance { .. } => 2000,
        TransitionError::NonceMismatch { .. } => 2001,
        TransitionError::Overflow { .. } => 2002,
    }
}

fn rollup_kind(error: &RollupError) -> ErrorKind {
    match error {
        RollupError::NotYetFinalizable { .. }
        | RollupError::UnknownProposal(_)
        | RollupError::TransactionAlreadyProcessed(_) => ErrorKind::PreconditionNotMet,
        RollupError::CorruptSnapshot(_) | RollupError::EmptyBatch(_) => ErrorKind::InputValidation,
        RollupError::BlockRootMismatch { .. } => ErrorKind::StateInconsistency,
    }
}

fn rollup_code(error: &RollupError) -> u32 {
    match error {
        RollupError::NotYetFinalizable { .. } => 3000,
        RollupError::UnknownProposal(_) => 3001,
        RollupError::CorruptSnapshot(_) => 3002,
        RollupError::EmptyBatch(_) => 3003,
        RollupError::BlockRootMismatch { .. } => 3004,
        RollupError::TransactionAlreadyProcessed(_) => 3005,
    }
}

fn fraud_proof_kind(error: &FraudProofError) -> ErrorKind {
    match error {
        FraudProofError::InvalidInitialProof | FraudProofError::InvalidFinalProof(_) => {
            ErrorKind::StateInconsistency
        }
        FraudProofError::MalformedProof(_) => ErrorKind::InputValidation,
        FraudProofError::Rollup(e) => rollup_kind(e),
    }
}

fn fraud_proof_code(error: &FraudProofError) -> u32 {
    match error {
        FraudProofError::InvalidInitialProof => 4000,
        FraudProofError::InvalidFinalProof(_) => 4001,
        FraudProofError::MalformedProof(_) => 4002,
        FraudProofError::Rollup(e) => rollup_code(e),
    }
}

fn bridge_kind(error: &BridgeError) -> ErrorKind {
    match error {
        BridgeError::Unauthorized { .. }
        | BridgeError::NotCounterpart { .. }
        | BridgeError::CounterpartMismatch { .. } => ErrorKind::Authorization,
        BridgeError::ZeroAmount => ErrorKind::InputValidation,
        BridgeError::CounterpartAlreadySet(_)
        | BridgeError::CounterpartNotSet
        | BridgeError::InsufficientDeposit { .. }
        | BridgeError::InsufficientWithdrawableBalance { .. }
        | BridgeError::WithdrawalAlreadyPending(_)
        | BridgeError::NoPendingWithdrawal(_)
        | BridgeError::PendingPeriodNotElapsed { .. } => ErrorKind::PreconditionNotMet,
        BridgeError::BackingMismatch { .. } | BridgeError::Overflow => ErrorKind::StateInconsistency,
        BridgeError::Token(e) => token_kind(e),
    }
}

fn bridge_code(error: &BridgeError) -> u32 {
    match error {
        BridgeError::Unauthorized { .. } => 5000,
        BridgeError::CounterpartAlreadySet(_) => 5001,
        BridgeError::CounterpartNotSet => 5002,
        BridgeError::NotCounterpart { .. } => 5003,
        BridgeError::CounterpartMismatch { .. } => 5004,
        BridgeError::ZeroAmount => 5005,
        BridgeError::InsufficientDeposit { .. } => 5006,
        BridgeError::InsufficientWithdrawableBalance { .. } => 5007,
        BridgeError::WithdrawalAlreadyPending(_) => 5008,
        BridgeError::NoPendingWithdrawal(_) => 5009,
        BridgeError::PendingPeriodNotElapsed { .. } => 5010,
        BridgeError::BackingMismatch { .. } => 5011,
        BridgeError::Overflow => 5012,
        BridgeError::Token(e) => token_code(e),
    }
}

fn token_kind(error: &TokenError) -> ErrorKind {
    match error {
        TokenError::NotMinter { .. } | TokenError::InsufficientAllowance { .. } => ErrorKind::Authorization,
        TokenError::InsufficientBalance { .. } | TokenError::Overflow => ErrorKind::StateInconsistency,
    }
}

fn token_code(error: &TokenError) -> u32 {
    match error {
        TokenError::NotMinter { .. } => 6000,
        TokenError::InsufficientBalance { .. } => 6001,
        TokenError::InsufficientAllowance { .. } => 6002,
        TokenError::Overflow => 6003,
    }
}

fn ledger_kind(error: &LedgerError) -> ErrorKind {
    match error {
        LedgerError::InsufficientBalance { .. } => ErrorKind::StateInconsistency,
        LedgerError::EmptyBatch
        | LedgerError::UnknownAccount(_)
        | LedgerError::ZeroAddressAccount
        | LedgerError::BalanceOverflow(_) => ErrorKind::InputValidation,
        LedgerError::Transition(e) => transition_kind(e),
        LedgerError::Merkle(e) => merkle_kind(e),
    }
}

fn ledger_code(error: &LedgerError) -> u32 {
    match error {
        LedgerError::InsufficientBalance { .. } => 7000,
        LedgerError::EmptyBatch => 7001,
        LedgerError::UnknownAccount(_) => 7002,
        LedgerError::ZeroAddressAccount => 7003,
        LedgerError::BalanceOverflow(_) => 7004,
        LedgerError::Transition(e) => transition_code(e),
        LedgerError::Merkle(e) => merkle_code(e),
    }
}
