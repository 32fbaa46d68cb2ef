// src/fraud_proof_system/mod.rs
//! Fraud Proof System module
//!
//! This module integrates all components of the fraud proof system:
//! - Merkle tree construction and inclusion proofs
//! - Canonical account and transaction hashing
//! - Single-account state transition rules
//! - Fraud proof submissions and their adjudication

mod account_state;
mod fraud_proof;
mod merkle_tree;
mod state_transition;
mod verification;

pub use account_state::{
    block_root, encode_account, encode_transaction, hash_account, hash_accounts, hash_transaction,
    hash_transactions, state_root, Account, Transaction, ACCOUNT_ENCODED_LEN, TRANSACTION_ENCODED_LEN,
};
pub use fraud_proof::{FraudProof, FraudProofError, FraudProofVerdict, FraudReason, MAX_PROOF_DEPTH};
pub use merkle_tree::{
    build_proof, build_root, hash_pair, keccak256, verify_proof, MerkleError, MerkleProof, MerkleTree,
};
pub use state_transition::{apply_transaction, apply_transactions, SequenceError, TransitionError};
pub use verification::{evaluate_fraud_proof, submit_fraud_proof};
