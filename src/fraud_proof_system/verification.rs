// src/fraud_proof_system/verification.rs
//! Fraud proof adjudication
//!
//! 1. The before-state must verify against the latest finalized state root,
//!    otherwise the submission is rejected and nothing changes.
//! 2. The transactions are replayed over the before-state; any illegal
//!    transition convicts the proposal.
//! 3. If the replayed after-state verifies against the disputed root the
//!    proposal is consistent for this account and stays pending.
//! 4. Otherwise the submitted after-state must verify against the disputed
//!    root. It then differs from the replay, which convicts the proposal. If it
//!    does not verify either, the challenger has shown nothing and the
//!    submission is rejected.
//!
//! Evaluation is read-only; the single mutation (removal) happens last, so a
//! rejected submission leaves the rollup untouched.

use log::{info, warn};

use super::fraud_proof::{FraudProof, FraudProofError, FraudProofVerdict, FraudReason};
use super::merkle_tree::verify_proof;
use super::state_transition::apply_transactions;
use crate::rollup::RollupStateMachine;

/// Judge a fraud proof without changing any state
pub fn evaluate_fraud_proof(
    rollup: &RollupStateMachine,
    proof: &FraudProof,
) -> Result<FraudProofVerdict, FraudProofError> {
    proof.check_well_formed()?;

    let proposal_index = proof.proposal_index;
    let disputed_root = rollup.pending_proposal(proposal_index)?.state_merkle_root;
    let trusted_root = rollup.finalized_state_root();

    if !verify_proof(
        proof.before_account.hash(),
        &proof.before_proof,
        proof.account_index,
        trusted_root,
    ) {
        warn!(
            "Fraud proof against proposal {} rejected: before-state not in finalized root 0x{}",
            proposal_index,
            hex::encode(trusted_root)
        );
        return Err(FraudProofError::InvalidInitialProof);
    }

    let computed = match apply_transactions(&proof.before_account, &proof.transactions) {
        Ok(account) => account,
        Err(failure) => {
            return Ok(FraudProofVerdict::ProposalRemoved {
                proposal_index,
                reason: FraudReason::TransitionFailed(failure),
            })
        }
    };

    let computed_hash = computed.hash();
    if verify_proof(computed_hash, &proof.after_proof, proof.account_index, disputed_root) {
        return Ok(FraudProofVerdict::ProposalUpheld { proposal_index });
    }

    let committed_hash = proof.after_account.hash();
    if !verify_proof(committed_hash, &proof.after_proof, proof.account_index, disputed_root) {
        warn!(
            "Fraud proof against proposal {} rejected: after-state not in disputed root 0x{}",
            proposal_index,
            hex::encode(disputed_root)
        );
        return Err(FraudProofError::InvalidFinalProof(proposal_index));
    }

    Ok(FraudProofVerdict::ProposalRemoved {
        proposal_index,
        reason: FraudReason::StateMismatch {
            computed: computed_hash,
            committed: committed_hash,
        },
    })
}

/// Judge a fraud proof and remove the disputed proposal if fraud is shown
pub fn submit_fraud_proof(
    rollup: &mut RollupStateMachine,
    proof: &FraudProof,
) -> Result<FraudProofVerdict, FraudProofError> {
    let verdict = evaluate_fraud_proof(rollup, proof)?;

    match &verdict {
        FraudProofVerdict::ProposalRemoved { proposal_index, reason } => {
            rollup.remove_proposal(*proposal_index)?;
            info!(
                "Fraud proven against proposal {} for account {:?}: {:?}",
                proposal_index, proof.before_account.address, reason
            );
        }
        FraudProofVerdict::ProposalUpheld { proposal_index } => {
            info!(
                "Fraud proof against proposal {} for account {:?} failed: state is consistent",
                proposal_index, proof.before_account.address
            );
        }
    }

    Ok(verdict)
}
