// src/interfaces/rollup_interface.rs
//! Rollup Interface
//!
//! The L2 ledger hands its batch commitments to whatever implements [`L1Anchor`].
//! In this crate that is the [`RollupStateMachine`](crate::rollup::RollupStateMachine);
//! a deployment would put an L1 client behind the same trait.

use ethereum_types::{Address, H256};

/// Destination for proposed block/state root pairs
pub trait L1Anchor {
    /// Record a pending proposal and return its index
    fn propose_state(&mut self, proposer: Address, block_root: H256, state_root: H256) -> u64;
}
