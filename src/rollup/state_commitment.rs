// src/rollup/state_commitment.rs
//! Persisted layout of rollup commitments
//!
//! Records use fixed-size byte arrays so their Borsh encoding is exactly the
//! storage layout: a pending proposal is 32 + 32 + 20 + 8 = 92 bytes and a
//! finalized entry is 32 + 32 = 64 bytes.

use borsh::{BorshDeserialize, BorshSerialize};
use ethereum_types::{Address, H256};

use super::optimistic_rollup::{FinalizedState, ProposedState, RollupError};

/// Encoded size of a [`ProposalRecord`]
pub const PROPOSAL_RECORD_LEN: usize = 92;

/// Encoded size of a [`FinalizedRecord`]
pub const FINALIZED_RECORD_LEN: usize = 64;

/// Stored pending proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalRecord {
    /// Block Merkle root
    pub block_merkle_root: [u8; 32],

    /// State Merkle root
    pub state_merkle_root: [u8; 32],

    /// Proposer address
    pub proposer: [u8; 20],

    /// Proposal timestamp
    pub timestamp: u64,
}

/// Stored finalized entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FinalizedRecord {
    /// Block Merkle root
    pub block_merkle_root: [u8; 32],

    /// State Merkle root
    pub state_merkle_root: [u8; 32],
}

/// Stored proposal slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SlotRecord {
    /// Still pending
    Pending(ProposalRecord),

    /// Finalized into the given log index
    Finalized(u64),

    /// Removed by a fraud proof
    Removed,
}

/// Complete persisted state of a rollup state machine
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RollupSnapshot {
    /// Finalization period in seconds
    pub finalization_period: u64,

    /// Finalized log, genesis first
    pub finalized: Vec<FinalizedRecord>,

    /// Proposal slots by index
    pub proposals: Vec<SlotRecord>,

    /// Every block root ever proposed, sorted
    pub proposed_block_roots: Vec<[u8; 32]>,

    /// Hashes of settled transactions, sorted
    pub processed_transactions: Vec<[u8; 32]>,
}

impl ProposalRecord {
    /// Borsh encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, RollupError> {
        self.try_to_vec()
            .map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }

    /// Decode a Borsh-encoded record
    pub fn from_bytes(data: &[u8]) -> Result<Self, RollupError> {
        Self::try_from_slice(data).map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }
}

impl FinalizedRecord {
    /// Borsh encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, RollupError> {
        self.try_to_vec()
            .map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }

    /// Decode a Borsh-encoded record
    pub fn from_bytes(data: &[u8]) -> Result<Self, RollupError> {
        Self::try_from_slice(data).map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }
}

impl RollupSnapshot {
    /// Borsh encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>, RollupError> {
        self.try_to_vec()
            .map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }

    /// Decode a Borsh-encoded snapshot
    pub fn from_bytes(data: &[u8]) -> Result<Self, RollupError> {
        Self::try_from_slice(data).map_err(|e| RollupError::CorruptSnapshot(e.to_string()))
    }
}

impl From<&ProposedState> for ProposalRecord {
    fn from(proposal: &ProposedState) -> Self {
        Self {
            block_merkle_root: proposal.block_merkle_root.0,
            state_merkle_root: proposal.state_merkle_root.0,
            proposer: proposal.proposer.0,
            timestamp: proposal.timestamp,
        }
    }
}

impl From<&ProposalRecord> for ProposedState {
    fn from(record: &ProposalRecord) -> Self {
        Self {
            block_merkle_root: H256(record.block_merkle_root),
            state_merkle_root: H256(record.state_merkle_root),
            proposer: Address::from(record.proposer),
            timestamp: record.timestamp,
        }
    }
}

impl From<&FinalizedState> for FinalizedRecord {
    fn from(state: &FinalizedState) -> Self {
        Self {
            block_merkle_root: state.block_merkle_root.0,
            state_merkle_root: state.state_merkle_root.0,
        }
    }
}

impl From<&FinalizedRecord> for FinalizedState {
    fn from(record: &FinalizedRecord) -> Self {
        Self {
            block_merkle_root: H256(record.block_merkle_root),
            state_merkle_root: H256(record.state_merkle_root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes_match_layout() {
        let proposal = ProposalRecord {
            block_merkle_root: [1; 32],
            state_merkle_root: [2; 32],
            proposer: [3; 20],
            timestamp: 0x0102,
        };
        let bytes = proposal.to_bytes().unwrap();
        assert_eq!(bytes.len(), PROPOSAL_RECORD_LEN);
        assert_eq!(&bytes[..32], &[1; 32]);
        assert_eq!(&bytes[64..84], &[3; 20]);
        // Borsh integers are little-endian
        assert_eq!(&bytes[84..], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);

        let finalized = FinalizedRecord {
            block_merkle_root: [1; 32],
            state_merkle_root: [2; 32],
        };
        assert_eq!(finalized.to_bytes().unwrap().len(), FINALIZED_RECORD_LEN);
    }

    #[test]
    fn test_proposal_conversion_keeps_fields() {
        let proposal = ProposedState {
            block_merkle_root: H256::repeat_byte(9),
            state_merkle_root: H256::repeat_byte(8),
            proposer: Address::repeat_byte(7),
            timestamp: 42,
        };
        let record = ProposalRecord::from(&proposal);
        let decoded = ProposalRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(ProposedState::from(&decoded), proposal);
    }

    #[test]
    fn test_truncated_bytes_are_rejected() {
        let record = FinalizedRecord {
            block_merkle_root: [1; 32],
            state_merkle_root: [2; 32],
        };
        let bytes = record.to_bytes().unwrap();
        assert!(matches!(
            FinalizedRecord::from_bytes(&bytes[..63]),
            Err(RollupError::CorruptSnapshot(_))
        ));
    }
}
