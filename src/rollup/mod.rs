// src/rollup/mod.rs
//! Rollup module
//!
//! The L1 side keeps the pending queue and finalized log of state commitments
//! ([`RollupStateMachine`]); the L2 side keeps the account table and batches
//! transfers into commitments ([`L2Ledger`]).

mod l2_ledger;
mod optimistic_rollup;
mod state_commitment;

pub use l2_ledger::*;
pub use optimistic_rollup::*;
pub use state_commitment::*;
