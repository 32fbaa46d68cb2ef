// tests/block_finalization_test.rs
mod common;

use std::sync::Arc;

use common::{alice, bob, eth, proposer, two_account_config, FINALIZATION_PERIOD};
use ethereum_types::{Address, H256};
use rollup_settlement::fraud_proof_system::{block_root, state_root, Account, Transaction};
use rollup_settlement::rollup::{ProposalStatus, RollupSnapshot};
use rollup_settlement::{L2Ledger, ManualClock, RollupError, RollupStateMachine, SettlementError};

#[test]
fn test_genesis_scenario_finalizes_after_window() {
    common::setup();
    let config = two_account_config();
    let clock = ManualClock::new(1_700_000_000);
    let mut rollup = RollupStateMachine::from_config(&config, Arc::new(clock.clone())).unwrap();
    let mut ledger = L2Ledger::from_genesis(&config.genesis).unwrap();

    // Genesis roots agree on both sides
    assert_eq!(ledger.current_state_root().unwrap(), rollup.finalized_state_root());
    assert_eq!(
        rollup.finalized(0).unwrap().block_merkle_root,
        block_root(&[Transaction::mint(alice(), eth(1)), Transaction::mint(bob(), eth(2))]).unwrap()
    );

    // A burns 1 ETH
    let tx = ledger.submit_transaction(alice(), Address::zero(), eth(1)).unwrap();
    assert_eq!(tx.nonce, 0);

    let expected_state = state_root(&[
        Account {
            address: alice(),
            nonce: 1,
            balance: eth(0),
        },
        Account::new(bob(), eth(2)),
    ])
    .unwrap();
    assert_eq!(ledger.current_state_root().unwrap(), expected_state);
    assert_eq!(ledger.current_block_root(), Some(block_root(&[tx]).unwrap()));

    let index = ledger.propose_rollup(&mut rollup, proposer()).unwrap();
    assert_eq!(index, 0);
    let proposal = *rollup.proposal(index).unwrap();
    assert_eq!(proposal.state_merkle_root, expected_state);
    assert_eq!(proposal.proposer, proposer());

    // One second short of the window
    clock.advance(FINALIZATION_PERIOD - 1);
    assert!(matches!(
        rollup.finalize_state(index),
        Err(RollupError::NotYetFinalizable { .. })
    ));

    clock.advance(1);
    assert_eq!(rollup.finalize_state(index), Ok(1));
    assert_eq!(rollup.finalized_len(), 2);
    assert_eq!(rollup.finalized(1).unwrap().state_merkle_root, expected_state);
    assert_eq!(rollup.proposal_status(index), Some(ProposalStatus::Finalized(1)));

    // Exactly once
    assert_eq!(rollup.finalize_state(index), Err(RollupError::UnknownProposal(index)));
}

#[test]
fn test_later_proposal_can_finalize_first() {
    common::setup();
    let clock = ManualClock::new(0);
    let mut rollup = RollupStateMachine::from_config(&two_account_config(), Arc::new(clock.clone())).unwrap();

    let first = rollup.propose_state(proposer(), H256::repeat_byte(1), H256::repeat_byte(2));
    clock.advance(10);
    let second = rollup.propose_state(proposer(), H256::repeat_byte(3), H256::repeat_byte(4));

    clock.advance(FINALIZATION_PERIOD);
    assert_eq!(rollup.finalize_state(second), Ok(1));
    assert_eq!(rollup.finalize_state(first), Ok(2));
    assert_eq!(rollup.finalized_state_root(), H256::repeat_byte(2));
}

#[test]
fn test_snapshot_survives_restart() {
    common::setup();
    let clock = ManualClock::new(0);
    let config = two_account_config();
    let mut rollup = RollupStateMachine::from_config(&config, Arc::new(clock.clone())).unwrap();

    let index = rollup.propose_state(proposer(), H256::repeat_byte(5), H256::repeat_byte(6));
    let bytes = rollup.snapshot().to_bytes().unwrap();

    // Restart before the window closes
    let snapshot = RollupSnapshot::from_bytes(&bytes).unwrap();
    let mut restored = RollupStateMachine::restore(&snapshot, Arc::new(clock.clone())).unwrap();
    assert_eq!(restored.proposal(index), rollup.proposal(index));

    clock.advance(FINALIZATION_PERIOD);
    assert_eq!(restored.finalize_state(index), Ok(1));

    assert!(RollupSnapshot::from_bytes(&bytes[..bytes.len() - 1]).is_err());
}

#[test]
fn test_errors_surface_through_settlement_error() {
    common::setup();
    let clock = ManualClock::new(0);
    let mut rollup = RollupStateMachine::from_config(&two_account_config(), Arc::new(clock)).unwrap();

    let error: SettlementError = rollup.finalize_state(3).unwrap_err().into();
    assert_eq!(error.to_error_code(), 3001);
    assert_eq!(error.to_string(), "Unknown proposal 3");
}
