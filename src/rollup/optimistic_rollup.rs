// src/rollup/optimistic_rollup.rs
//! Optimistic Rollup state machine
//!
//! Proposals enter a pending queue and leave it exactly once: either they are
//! finalized after the finalization period, or a successful fraud proof removes
//! them. Slots are tombstoned rather than compacted, so a proposal index stays
//! valid (and means the same proposal) for the lifetime of the machine.
//!
//! The finalized log starts with the genesis commitment at index 0 and only
//! ever grows. Its last entry is the trusted baseline that fraud proofs are
//! checked against.
//!
//! Finalizing through [`RollupStateMachine::finalize_batch`] additionally
//! checks the supplied transactions against the proposal's block root and
//! records their hashes, so a transaction settles at most once.

use std::collections::HashSet;
use std::sync::Arc;

use ethereum_types::{Address, H256};
use log::{debug, info};
use thiserror::Error;

use super::state_commitment::{FinalizedRecord, ProposalRecord, RollupSnapshot, SlotRecord};
use crate::config::SettlementConfig;
use crate::fraud_proof_system::{block_root, MerkleError, Transaction};
use crate::interfaces::{Clock, L1Anchor};

/// The default finalization period in seconds (1 day)
pub const DEFAULT_FINALIZATION_PERIOD: u64 = 24 * 60 * 60;

/// Errors raised by the state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollupError {
    /// The finalization period has not elapsed yet
    #[error("Proposal {index} cannot be finalized before {finalizable_at} (now {now})")]
    NotYetFinalizable {
        index: u64,
        finalizable_at: u64,
        now: u64,
    },

    /// Index was never issued, or its proposal is already finalized or removed
    #[error("Unknown proposal {0}")]
    UnknownProposal(u64),

    /// Snapshot bytes could not be decoded or are inconsistent
    #[error("Corrupt rollup snapshot: {0}")]
    CorruptSnapshot(String),

    /// No transactions were supplied to settle a proposal
    #[error("Proposal {0} cannot be settled with an empty batch")]
    EmptyBatch(u64),

    /// Supplied transactions do not rebuild the proposed block root
    #[error("Block root mismatch for proposal {index}: proposed {expected:?}, computed {computed:?}")]
    BlockRootMismatch {
        index: u64,
        expected: H256,
        computed: H256,
    },

    /// Transaction hash was already settled, or appears twice in the batch
    #[error("Transaction {0:?} already processed")]
    TransactionAlreadyProcessed(H256),
}

/// Pending commitment awaiting finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedState {
    /// Root over the batch's transactions
    pub block_merkle_root: H256,

    /// Root over the resulting account states
    pub state_merkle_root: H256,

    /// Caller that proposed the commitment
    pub proposer: Address,

    /// Timestamp at which the proposal was recorded
    pub timestamp: u64,
}

/// Finalized, immutable commitment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizedState {
    /// Root over the batch's transactions
    pub block_merkle_root: H256,

    /// Root over the resulting account states
    pub state_merkle_root: H256,
}

/// Lifecycle of a proposal index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Still inside the queue
    Pending,

    /// Moved into the finalized log at the given index
    Finalized(u64),

    /// Removed by a successful fraud proof
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProposalSlot {
    Pending(ProposedState),
    Finalized(u64),
    Removed,
}

/// Pending queue and finalized log of state commitments
#[derive(Debug)]
pub struct RollupStateMachine {
    /// Seconds a proposal must wait before it can be finalized
    finalization_period: u64,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Proposal slots by index, tombstoned on resolution
    proposals: Vec<ProposalSlot>,

    /// Append-only finalized log; index 0 is genesis
    finalized: Vec<FinalizedState>,

    /// Number of slots still pending
    pending: usize,

    /// Every block root ever proposed
    proposed_block_roots: HashSet<H256>,

    /// Hashes of transactions settled through `finalize_batch`
    processed_transactions: HashSet<H256>,
}

impl RollupStateMachine {
    /// Create a state machine whose finalized log starts with `genesis`
    pub fn new(finalization_period: u64, genesis: FinalizedState, clock: Arc<dyn Clock>) -> Self {
        info!(
            "Rollup initialized with genesis state root 0x{} and finalization period {}s",
            hex::encode(genesis.state_merkle_root),
            finalization_period
        );

        Self {
            finalization_period,
            clock,
            proposals: Vec::new(),
            finalized: vec![genesis],
            pending: 0,
            proposed_block_roots: HashSet::new(),
            processed_transactions: HashSet::new(),
        }
    }

    /// Create a state machine from configuration, with genesis roots derived
    /// from the configured genesis accounts
    pub fn from_config(config: &SettlementConfig, clock: Arc<dyn Clock>) -> Result<Self, MerkleError> {
        let genesis = config.genesis.genesis_roots()?;
        Ok(Self::new(config.finalization_period, genesis, clock))
    }

    /// Finalization period in seconds
    pub fn finalization_period(&self) -> u64 {
        self.finalization_period
    }

    /// Record a pending proposal and return its index.
    ///
    /// Duplicate roots are allowed; each proposal is challenged and finalized
    /// on its own.
    pub fn propose_state(&mut self, proposer: Address, block_root: H256, state_root: H256) -> u64 {
        let index = self.proposals.len() as u64;
        let timestamp = self.clock.now();

        self.proposals.push(ProposalSlot::Pending(ProposedState {
            block_merkle_root: block_root,
            state_merkle_root: state_root,
            proposer,
            timestamp,
        }));
        self.pending += 1;
        self.proposed_block_roots.insert(block_root);

        info!(
            "Proposal {} recorded by {:?}: block root 0x{}, state root 0x{}",
            index,
            proposer,
            hex::encode(block_root),
            hex::encode(state_root)
        );

        index
    }

    /// Finalize a proposal whose finalization period has elapsed.
    ///
    /// Returns the index of the new entry in the finalized log.
    pub fn finalize_state(&mut self, index: u64) -> Result<u64, RollupError> {
        let proposal = *self.pending_proposal(index)?;
        let now = self.clock.now();
        let finalizable_at = proposal.timestamp.saturating_add(self.finalization_period);

        if now < finalizable_at {
            debug!("Proposal {} not finalizable until {} (now {})", index, finalizable_at, now);
            return Err(RollupError::NotYetFinalizable {
                index,
                finalizable_at,
                now,
            });
        }

        let finalized_index = self.finalized.len() as u64;
        self.finalized.push(FinalizedState {
            block_merkle_root: proposal.block_merkle_root,
            state_merkle_root: proposal.state_merkle_root,
        });
        self.proposals[index as usize] = ProposalSlot::Finalized(finalized_index);
        self.pending -= 1;

        info!(
            "Proposal {} finalized as entry {} with state root 0x{}",
            index,
            finalized_index,
            hex::encode(proposal.state_merkle_root)
        );

        Ok(finalized_index)
    }

    /// Finalize a proposal together with the transactions it commits to.
    ///
    /// `transactions` must rebuild the proposal's block root, and none of them
    /// may have been settled before. Their hashes are recorded only once the
    /// finalization itself succeeds.
    pub fn finalize_batch(&mut self, index: u64, transactions: &[Transaction]) -> Result<u64, RollupError> {
        let proposal = *self.pending_proposal(index)?;
        let computed = block_root(transactions).map_err(|_| RollupError::EmptyBatch(index))?;

        if computed != proposal.block_merkle_root {
            return Err(RollupError::BlockRootMismatch {
                index,
                expected: proposal.block_merkle_root,
                computed,
            });
        }

        let mut hashes = HashSet::with_capacity(transactions.len());
        for tx in transactions {
            let hash = tx.hash();
            if self.processed_transactions.contains(&hash) || !hashes.insert(hash) {
                return Err(RollupError::TransactionAlreadyProcessed(hash));
            }
        }

        let finalized_index = self.finalize_state(index)?;
        self.processed_transactions.extend(hashes);

        debug!(
            "Proposal {} settled {} transactions",
            index,
            transactions.len()
        );

        Ok(finalized_index)
    }

    /// Whether `hash` belongs to a transaction settled through `finalize_batch`
    pub fn is_transaction_processed(&self, hash: H256) -> bool {
        self.processed_transactions.contains(&hash)
    }

    /// Whether `root` was ever proposed as a block root, including proposals
    /// that were later removed
    pub fn is_block_root_proposed(&self, root: H256) -> bool {
        self.proposed_block_roots.contains(&root)
    }

    /// Drop a pending proposal without any time check.
    ///
    /// Only fraud proof adjudication calls this.
    pub(crate) fn remove_proposal(&mut self, index: u64) -> Result<ProposedState, RollupError> {
        let proposal = *self.pending_proposal(index)?;
        self.proposals[index as usize] = ProposalSlot::Removed;
        self.pending -= 1;

        info!("Proposal {} removed", index);

        Ok(proposal)
    }

    /// Pending proposal at `index`, or `UnknownProposal`
    pub fn pending_proposal(&self, index: u64) -> Result<&ProposedState, RollupError> {
        match usize::try_from(index).ok().and_then(|i| self.proposals.get(i)) {
            Some(ProposalSlot::Pending(proposal)) => Ok(proposal),
            _ => Err(RollupError::UnknownProposal(index)),
        }
    }

    /// Pending proposal at `index`, if any
    pub fn proposal(&self, index: u64) -> Option<&ProposedState> {
        self.pending_proposal(index).ok()
    }

    /// Lifecycle of `index`; `None` if it was never issued
    pub fn proposal_status(&self, index: u64) -> Option<ProposalStatus> {
        let slot = self.proposals.get(usize::try_from(index).ok()?)?;
        Some(match slot {
            ProposalSlot::Pending(_) => ProposalStatus::Pending,
            ProposalSlot::Finalized(finalized_index) => ProposalStatus::Finalized(*finalized_index),
            ProposalSlot::Removed => ProposalStatus::Removed,
        })
    }

    /// Finalized entry at `index`
    pub fn finalized(&self, index: u64) -> Option<&FinalizedState> {
        self.finalized.get(usize::try_from(index).ok()?)
    }

    /// Most recent finalized entry
    pub fn latest_finalized(&self) -> &FinalizedState {
        // Never empty: genesis is pushed at construction
        &self.finalized[self.finalized.len() - 1]
    }

    /// Trusted state root used as the baseline for fraud proofs
    pub fn finalized_state_root(&self) -> H256 {
        self.latest_finalized().state_merkle_root
    }

    /// Length of the finalized log, genesis included
    pub fn finalized_len(&self) -> usize {
        self.finalized.len()
    }

    /// Number of proposals still pending
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Index the next proposal will receive
    pub fn next_proposal_index(&self) -> u64 {
        self.proposals.len() as u64
    }

    /// Indices of all pending proposals, oldest first
    pub fn pending_indices(&self) -> Vec<u64> {
        self.proposals
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, ProposalSlot::Pending(_)))
            .map(|(i, _)| i as u64)
            .collect()
    }

    /// Persistable copy of the queue and log
    pub fn snapshot(&self) -> RollupSnapshot {
        RollupSnapshot {
            finalization_period: self.finalization_period,
            finalized: self.finalized.iter().map(FinalizedRecord::from).collect(),
            proposals: self
                .proposals
                .iter()
                .map(|slot| match slot {
                    ProposalSlot::Pending(proposal) => SlotRecord::Pending(ProposalRecord::from(proposal)),
                    ProposalSlot::Finalized(i) => SlotRecord::Finalized(*i),
                    ProposalSlot::Removed => SlotRecord::Removed,
                })
                .collect(),
            proposed_block_roots: sorted_roots(&self.proposed_block_roots),
            processed_transactions: sorted_roots(&self.processed_transactions),
        }
    }

    /// Rebuild a state machine from a snapshot
    pub fn restore(snapshot: &RollupSnapshot, clock: Arc<dyn Clock>) -> Result<Self, RollupError> {
        if snapshot.finalized.is_empty() {
            return Err(RollupError::CorruptSnapshot("finalized log has no genesis entry".to_string()));
        }

        let finalized: Vec<FinalizedState> = snapshot.finalized.iter().map(FinalizedState::from).collect();
        let mut proposals = Vec::with_capacity(snapshot.proposals.len());
        let mut pending = 0;

        for (index, slot) in snapshot.proposals.iter().enumerate() {
            proposals.push(match slot {
                SlotRecord::Pending(record) => {
                    pending += 1;
                    ProposalSlot::Pending(ProposedState::from(record))
                }
                SlotRecord::Finalized(i) => {
                    if *i == 0 || *i as usize >= finalized.len() {
                        return Err(RollupError::CorruptSnapshot(format!(
                            "proposal {} points at finalized entry {} of {}",
                            index,
                            i,
                            finalized.len()
                        )));
                    }
                    ProposalSlot::Finalized(*i)
                }
                SlotRecord::Removed => ProposalSlot::Removed,
            });
        }

        debug!(
            "Rollup restored with {} finalized entries and {} pending proposals",
            finalized.len(),
            pending
        );

        Ok(Self {
            finalization_period: snapshot.finalization_period,
            clock,
            proposals,
            finalized,
            pending,
            proposed_block_roots: snapshot.proposed_block_roots.iter().copied().map(H256).collect(),
            processed_transactions: snapshot.processed_transactions.iter().copied().map(H256).collect(),
        })
    }
}

fn sorted_roots(set: &HashSet<H256>) -> Vec<[u8; 32]> {
    let mut roots: Vec<[u8; 32]> = set.iter().map(|h| h.0).collect();
    roots.sort_unstable();
    roots
}

impl L1Anchor for RollupStateMachine {
    fn propose_state(&mut self, proposer: Address, block_root: H256, state_root: H256) -> u64 {
        RollupStateMachine::propose_state(self, proposer, block_root, state_root)
    }
}
