// src/lib.rs
//! Optimistic rollup settlement core
//!
//! This crate integrates all components of the settlement layer:
//! - Fraud Proof System (Merkle trees, account hashing, state transitions,
//!   fraud proof adjudication)
//! - Rollup state machine (propose, challenge, finalize) and the L2 ledger
//!   that feeds it
//! - Bridge Mechanism (ETH custody on L1, wrapped ETH on L2)

pub mod bridge;
pub mod config;
pub mod error_handling;
pub mod fraud_proof_system;
pub mod interfaces;
pub mod rollup;

use std::sync::Arc;

use ethereum_types::{Address, U256};
use log::info;

pub use bridge::{check_backing, BridgeError, InMemoryWrappedEth, L1Bridge, L2Bridge};
pub use config::{ConfigError, GenesisAccount, GenesisConfig, SettlementConfig};
pub use error_handling::{ErrorKind, SettlementError};
pub use fraud_proof_system::{
    Account, FraudProof, FraudProofError, FraudProofVerdict, MerkleError, MerkleProof, MerkleTree,
    Transaction,
};
pub use interfaces::{Clock, L1Anchor, ManualClock, SystemClock, WrappedToken};
pub use rollup::{L2Ledger, LedgerError, RollupError, RollupStateMachine};

/// Fixed addresses of the bridge deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeAddresses {
    /// Account allowed to configure the L1 bridge
    pub owner: Address,

    /// Address of the L1 bridge
    pub l1_bridge: Address,

    /// Address of the L2 bridge, also the wrapped token's minter
    pub l2_bridge: Address,
}

/// Settlement system wiring every component to one configuration and clock
#[derive(Debug)]
pub struct SettlementSystem {
    /// Configuration
    pub config: SettlementConfig,

    /// L1 proposal queue and finalized log
    pub rollup: RollupStateMachine,

    /// L2 account table and open batch
    pub ledger: L2Ledger,

    /// L1 half of the bridge
    pub l1_bridge: L1Bridge,

    /// L2 half of the bridge
    pub l2_bridge: L2Bridge,

    /// Wrapped ETH on L2
    pub token: InMemoryWrappedEth,
}

impl SettlementSystem {
    /// Create a settlement system from a validated configuration
    pub fn new(
        config: SettlementConfig,
        addresses: BridgeAddresses,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SettlementError> {
        config.validate()?;

        let rollup = RollupStateMachine::from_config(&config, clock.clone())?;
        let ledger = L2Ledger::from_genesis(&config.genesis)?;

        let mut l1_bridge = L1Bridge::new(addresses.l1_bridge, addresses.owner, config.pending_period, clock);
        l1_bridge.set_l2_counterpart(addresses.owner, addresses.l2_bridge)?;
        let l2_bridge = L2Bridge::new(addresses.l2_bridge, addresses.l1_bridge);
        let token = InMemoryWrappedEth::new(addresses.l2_bridge);

        info!(
            "Settlement system initialized with {} genesis accounts",
            config.genesis.accounts.len()
        );

        Ok(Self {
            config,
            rollup,
            ledger,
            l1_bridge,
            l2_bridge,
            token,
        })
    }

    /// Propose the ledger's current batch to the rollup
    pub fn propose_batch(&mut self, proposer: Address) -> Result<u64, SettlementError> {
        Ok(self.ledger.propose_rollup(&mut self.rollup, proposer)?)
    }

    /// Finalize a proposal whose window has elapsed
    pub fn finalize(&mut self, index: u64) -> Result<u64, SettlementError> {
        Ok(self.rollup.finalize_state(index)?)
    }

    /// Finalize a proposal against the transactions it commits to, marking
    /// them processed
    pub fn finalize_batch(&mut self, index: u64, transactions: &[Transaction]) -> Result<u64, SettlementError> {
        Ok(self.rollup.finalize_batch(index, transactions)?)
    }

    /// Adjudicate a fraud proof against the rollup
    pub fn submit_fraud_proof(&mut self, proof: &FraudProof) -> Result<FraudProofVerdict, SettlementError> {
        Ok(fraud_proof_system::submit_fraud_proof(&mut self.rollup, proof)?)
    }

    /// Lock ETH on L1 and mint the same amount of wrapped ETH on L2.
    ///
    /// If the mint fails the deposit stays credited and can be minted later.
    pub fn bridge_in(&mut self, account: Address, amount: U256) -> Result<(), SettlementError> {
        self.l1_bridge.deposit(account, amount)?;
        self.l1_bridge
            .mint(account, amount, &mut self.l2_bridge, &mut self.token)?;
        Ok(())
    }

    /// Verify the bridge backing invariant
    pub fn check_backing(&self) -> Result<(), SettlementError> {
        Ok(check_backing(&self.l1_bridge, &self.token)?)
    }
}
