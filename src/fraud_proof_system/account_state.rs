// src/fraud_proof_system/account_state.rs
//! Canonical account and transaction records
//!
//! Both records hash as keccak256 over a tightly packed, fixed-width big-endian
//! encoding (the `abi.encodePacked` layout): addresses take 20 bytes, every
//! integer takes 32. The L1 verifier and the L2 ledger must agree on these bytes
//! exactly, otherwise no inclusion proof produced on one side verifies on the
//! other.

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use super::merkle_tree::{build_root, keccak256, MerkleError};

/// Encoded size of an account: address ‖ nonce ‖ balance
pub const ACCOUNT_ENCODED_LEN: usize = 20 + 32 + 32;

/// Encoded size of a transaction: from ‖ to ‖ amount ‖ nonce
pub const TRANSACTION_ENCODED_LEN: usize = 20 + 20 + 32 + 32;

/// Account record committed as a state leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account address
    pub address: Address,

    /// Number of transactions sent from this account
    pub nonce: u64,

    /// Balance in wei
    pub balance: U256,
}

impl Account {
    /// Fresh account with nonce zero
    pub fn new(address: Address, balance: U256) -> Self {
        Self {
            address,
            nonce: 0,
            balance,
        }
    }

    /// Canonical leaf hash
    pub fn hash(&self) -> H256 {
        hash_account(self)
    }
}

/// Transfer record committed as a block leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender; the zero address marks a mint-style credit
    pub from: Address,

    /// Recipient
    pub to: Address,

    /// Amount in wei
    pub amount: U256,

    /// Sender nonce the transaction was issued with
    pub nonce: u64,
}

impl Transaction {
    /// Genesis credit with no debit side
    pub fn mint(to: Address, amount: U256) -> Self {
        Self {
            from: Address::zero(),
            to,
            amount,
            nonce: 0,
        }
    }

    /// Whether the transaction credits `to` without debiting anyone
    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }

    /// Canonical leaf hash
    pub fn hash(&self) -> H256 {
        hash_transaction(self)
    }
}

fn uint256_bytes(value: U256) -> [u8; 32] {
    value.to_big_endian()
}

/// Packed encoding of an account
pub fn encode_account(account: &Account) -> [u8; ACCOUNT_ENCODED_LEN] {
    let mut out = [0u8; ACCOUNT_ENCODED_LEN];
    out[..20].copy_from_slice(account.address.as_bytes());
    out[20..52].copy_from_slice(&uint256_bytes(U256::from(account.nonce)));
    out[52..].copy_from_slice(&uint256_bytes(account.balance));
    out
}

/// Packed encoding of a transaction
pub fn encode_transaction(tx: &Transaction) -> [u8; TRANSACTION_ENCODED_LEN] {
    let mut out = [0u8; TRANSACTION_ENCODED_LEN];
    out[..20].copy_from_slice(tx.from.as_bytes());
    out[20..40].copy_from_slice(tx.to.as_bytes());
    out[40..72].copy_from_slice(&uint256_bytes(tx.amount));
    out[72..].copy_from_slice(&uint256_bytes(U256::from(tx.nonce)));
    out
}

/// keccak256(address ‖ nonce ‖ balance)
pub fn hash_account(account: &Account) -> H256 {
    keccak256(&encode_account(account))
}

/// keccak256(from ‖ to ‖ amount ‖ nonce)
pub fn hash_transaction(tx: &Transaction) -> H256 {
    keccak256(&encode_transaction(tx))
}

/// State leaves in caller-supplied order
pub fn hash_accounts(accounts: &[Account]) -> Vec<H256> {
    accounts.iter().map(hash_account).collect()
}

/// Block leaves in caller-supplied order
pub fn hash_transactions(transactions: &[Transaction]) -> Vec<H256> {
    transactions.iter().map(hash_transaction).collect()
}

/// Merkle root over the account leaves
pub fn state_root(accounts: &[Account]) -> Result<H256, MerkleError> {
    build_root(&hash_accounts(accounts))
}

/// Merkle root over the transaction leaves
pub fn block_root(transactions: &[Transaction]) -> Result<H256, MerkleError> {
    build_root(&hash_transactions(transactions))
}
