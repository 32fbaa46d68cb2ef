// src/fraud_proof_system/fraud_proof.rs
//! Fraud proof submissions and verdicts
//!
//! A submission disputes one account of one pending proposal. It carries the
//! account as it stands under the latest finalized state root, the
//! transactions touching it, and the account as the proposal committed it,
//! each with an inclusion proof at the same leaf index.

use ethereum_types::H256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::account_state::{Account, Transaction};
use super::state_transition::SequenceError;
use crate::rollup::RollupError;

/// Deepest inclusion proof accepted (one sibling per bit of a u64 index)
pub const MAX_PROOF_DEPTH: usize = 64;

/// Errors returned to the submitter of a fraud proof
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FraudProofError {
    /// The before-state does not belong to the finalized state root
    #[error("Invalid initial account state proof")]
    InvalidInitialProof,

    /// Neither the computed nor the claimed after-state belongs to the disputed root
    #[error("Final account state proof does not verify against proposal {0}")]
    InvalidFinalProof(u64),

    /// Submission could not be decoded or exceeds proof limits
    #[error("Malformed fraud proof: {0}")]
    MalformedProof(String),

    /// Disputed proposal is not pending
    #[error(transparent)]
    Rollup(#[from] RollupError),
}

/// Fraud proof for a single account of a pending proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudProof {
    /// Disputed proposal
    pub proposal_index: u64,

    /// Leaf index of the account in both state trees
    pub account_index: u64,

    /// Account under the latest finalized state root
    pub before_account: Account,

    /// Siblings proving `before_account` against the finalized root
    pub before_proof: Vec<H256>,

    /// Transactions replayed over the account, in batch order
    pub transactions: Vec<Transaction>,

    /// Account as committed by the disputed proposal
    pub after_account: Account,

    /// Siblings proving the after-state against the disputed root
    pub after_proof: Vec<H256>,
}

impl FraudProof {
    /// Decode a JSON submission
    pub fn from_json(data: &str) -> Result<Self, FraudProofError> {
        let proof: Self =
            serde_json::from_str(data).map_err(|e| FraudProofError::MalformedProof(e.to_string()))?;
        proof.check_well_formed()?;
        Ok(proof)
    }

    /// Encode as JSON
    pub fn to_json(&self) -> Result<String, FraudProofError> {
        serde_json::to_string(self).map_err(|e| FraudProofError::MalformedProof(e.to_string()))
    }

    /// Structural checks that need no rollup state
    pub fn check_well_formed(&self) -> Result<(), FraudProofError> {
        for (name, proof) in [("before", &self.before_proof), ("after", &self.after_proof)] {
            if proof.len() > MAX_PROOF_DEPTH {
                return Err(FraudProofError::MalformedProof(format!(
                    "{} proof has {} levels, limit is {}",
                    name,
                    proof.len(),
                    MAX_PROOF_DEPTH
                )));
            }
        }
        if self.before_account.address != self.after_account.address {
            return Err(FraudProofError::MalformedProof(format!(
                "before account {:?} and after account {:?} differ",
                self.before_account.address, self.after_account.address
            )));
        }
        Ok(())
    }
}

/// Why a proposal was removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudReason {
    /// A transaction could not legally be applied
    TransitionFailed(SequenceError),

    /// The proposal committed a different account state than the replay produced
    StateMismatch {
        /// Hash of the replayed after-state
        computed: H256,

        /// Hash of the after-state the proposal committed
        committed: H256,
    },
}

/// Outcome of adjudicating a well-formed fraud proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudProofVerdict {
    /// Fraud demonstrated; the proposal is gone
    ProposalRemoved {
        /// Removed proposal
        proposal_index: u64,

        /// What the challenger demonstrated
        reason: FraudReason,
    },

    /// The proposal is consistent for this account and stays pending
    ProposalUpheld {
        /// Disputed proposal
        proposal_index: u64,
    },
}

impl FraudProofVerdict {
    /// Whether the disputed proposal was removed
    pub fn is_removed(&self) -> bool {
        matches!(self, FraudProofVerdict::ProposalRemoved { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::{Address, U256};

    fn sample() -> FraudProof {
        let account = Account::new(Address::repeat_byte(1), U256::from(10u64));
        FraudProof {
            proposal_index: 3,
            account_index: 1,
            before_account: account,
            before_proof: vec![H256::repeat_byte(5)],
            transactions: vec![Transaction {
                from: Address::repeat_byte(1),
                to: Address::zero(),
                amount: U256::from(1u64),
                nonce: 0,
            }],
            after_account: account,
            after_proof: vec![H256::repeat_byte(6)],
        }
    }

    #[test]
    fn test_json_transport() {
        let proof = sample();
        let json = proof.to_json().unwrap();
        assert_eq!(FraudProof::from_json(&json).unwrap(), proof);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            FraudProof::from_json("{\"proposal_index\": 1}"),
            Err(FraudProofError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_overlong_proof_is_malformed() {
        let mut proof = sample();
        proof.after_proof = vec![H256::zero(); MAX_PROOF_DEPTH + 1];
        assert!(matches!(proof.check_well_formed(), Err(FraudProofError::MalformedProof(_))));
    }

    #[test]
    fn test_account_switch_is_malformed() {
        let mut proof = sample();
        proof.after_account.address = Address::repeat_byte(2);
        assert!(matches!(proof.check_well_formed(), Err(FraudProofError::MalformedProof(_))));
    }
}
