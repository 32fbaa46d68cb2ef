// src/rollup/l2_ledger.rs
//! L2 account ledger
//!
//! Keeps the ordered account table and the batch of transfers executed since
//! the last proposal. Leaf order of the state tree is the order in which
//! accounts were first seen; it never changes, so an account's leaf index is
//! stable across proposals.

use std::collections::HashMap;

use ethereum_types::{Address, H256, U256};
use log::{debug, info};
use thiserror::Error;

use crate::config::GenesisConfig;
use crate::fraud_proof_system::{
    apply_transaction, block_root, hash_accounts, state_root, Account, MerkleError, MerkleProof,
    MerkleTree, Transaction, TransitionError,
};
use crate::interfaces::L1Anchor;

/// Errors raised by the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Sender cannot cover the transfer
    #[error("Insufficient balance: {address:?} holds {balance}, needs {amount}")]
    InsufficientBalance {
        address: Address,
        balance: U256,
        amount: U256,
    },

    /// Nothing to propose
    #[error("No transactions in the current batch")]
    EmptyBatch,

    /// Address has no entry in the account table
    #[error("Unknown account {0:?}")]
    UnknownAccount(Address),

    /// The zero address is the burn sink and cannot hold an account
    #[error("The zero address cannot hold an account")]
    ZeroAddressAccount,

    /// Merging repeated entries for one address overflowed its balance
    #[error("Balance overflow for {0:?}")]
    BalanceOverflow(Address),

    /// Transfer could not be applied
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Root computation failed
    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

/// Account together with its inclusion proof in the current state tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProof {
    /// Leaf index of the account
    pub index: u64,

    /// Current account record
    pub account: Account,

    /// Inclusion proof against [`L2Ledger::current_state_root`]
    pub proof: MerkleProof,
}

/// Batch handed to the anchor by the latest [`L2Ledger::propose_rollup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedBatch {
    /// Proposal index assigned by the anchor
    pub index: u64,

    /// Root over `transactions`
    pub block_root: H256,

    /// Root over the account table at proposal time
    pub state_root: H256,

    /// Transactions of the batch, in execution order
    pub transactions: Vec<Transaction>,
}

/// Ordered account table plus the open transaction batch
#[derive(Debug, Clone, Default)]
pub struct L2Ledger {
    accounts: Vec<Account>,
    positions: HashMap<Address, usize>,
    batch: Vec<Transaction>,
    last_proposed: Option<ProposedBatch>,
}

impl L2Ledger {
    /// Create a ledger with the given balances, in leaf order.
    ///
    /// A repeated address keeps its first position and the later balance is
    /// added to it. The zero address is rejected, so it can never send.
    pub fn new<I>(balances: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Address, U256)>,
    {
        let mut ledger = Self::default();
        for (address, balance) in balances {
            if address.is_zero() {
                return Err(LedgerError::ZeroAddressAccount);
            }
            match ledger.positions.get(&address) {
                Some(&position) => {
                    let account = &mut ledger.accounts[position];
                    account.balance = account
                        .balance
                        .checked_add(balance)
                        .ok_or(LedgerError::BalanceOverflow(address))?;
                }
                None => ledger.push_account(Account::new(address, balance)),
            }
        }
        Ok(ledger)
    }

    /// Create a ledger from the genesis allocation
    pub fn from_genesis(genesis: &GenesisConfig) -> Result<Self, LedgerError> {
        Self::new(genesis.accounts.iter().map(|entry| (entry.address, entry.balance)))
    }

    fn push_account(&mut self, account: Account) {
        self.positions.insert(account.address, self.accounts.len());
        self.accounts.push(account);
    }

    /// Execute a transfer and append it to the current batch.
    ///
    /// The sender's next nonce is assigned automatically. A transfer to the
    /// zero address burns the amount; any other unknown recipient gets a new
    /// account at the end of the table.
    pub fn submit_transaction(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Transaction, LedgerError> {
        let sender_position = *self
            .positions
            .get(&from)
            .ok_or(LedgerError::UnknownAccount(from))?;
        let sender = self.accounts[sender_position];

        if sender.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                address: from,
                balance: sender.balance,
                amount,
            });
        }

        let tx = Transaction {
            from,
            to,
            amount,
            nonce: sender.nonce,
        };

        // Everything is computed before anything is written
        let sender_after = apply_transaction(&sender, &tx)?;
        let recipient_after = if to.is_zero() || to == from {
            None
        } else {
            let recipient = match self.positions.get(&to) {
                Some(&position) => self.accounts[position],
                None => Account::new(to, U256::zero()),
            };
            Some(apply_transaction(&recipient, &tx)?)
        };

        self.accounts[sender_position] = sender_after;
        if let Some(recipient) = recipient_after {
            match self.positions.get(&to) {
                Some(&position) => self.accounts[position] = recipient,
                None => self.push_account(recipient),
            }
        }
        self.batch.push(tx);

        debug!(
            "Transaction {:?} -> {:?} of {} wei (nonce {}) added to batch",
            from, to, amount, tx.nonce
        );

        Ok(tx)
    }

    /// Root over the pending batch, `None` while it is empty
    pub fn current_block_root(&self) -> Option<H256> {
        block_root(&self.batch).ok()
    }

    /// Root over the account table
    pub fn current_state_root(&self) -> Result<H256, LedgerError> {
        Ok(state_root(&self.accounts)?)
    }

    /// Propose the current batch to `anchor` and start a new batch.
    ///
    /// Returns the proposal index assigned by the anchor. The proposed batch
    /// stays readable through [`L2Ledger::last_proposed`].
    pub fn propose_rollup<A>(&mut self, anchor: &mut A, proposer: Address) -> Result<u64, LedgerError>
    where
        A: L1Anchor + ?Sized,
    {
        if self.batch.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }

        let block = block_root(&self.batch)?;
        let state = self.current_state_root()?;
        let index = anchor.propose_state(proposer, block, state);

        info!(
            "Batch of {} transactions proposed as {} with state root 0x{}",
            self.batch.len(),
            index,
            hex::encode(state)
        );
        self.last_proposed = Some(ProposedBatch {
            index,
            block_root: block,
            state_root: state,
            transactions: std::mem::take(&mut self.batch),
        });

        Ok(index)
    }

    /// Most recently proposed batch, if any
    pub fn last_proposed(&self) -> Option<&ProposedBatch> {
        self.last_proposed.as_ref()
    }

    /// Account record, leaf index and inclusion proof for `address`
    pub fn account_proof(&self, address: Address) -> Result<AccountProof, LedgerError> {
        let index = *self
            .positions
            .get(&address)
            .ok_or(LedgerError::UnknownAccount(address))?;
        let tree = MerkleTree::new(hash_accounts(&self.accounts))?;

        Ok(AccountProof {
            index: index as u64,
            account: self.accounts[index],
            proof: tree.generate_proof(index)?,
        })
    }

    /// Account table in leaf order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Current record of `address`
    pub fn account(&self, address: Address) -> Option<&Account> {
        self.positions.get(&address).map(|&i| &self.accounts[i])
    }

    /// Transactions executed since the last proposal
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.batch
    }
}
