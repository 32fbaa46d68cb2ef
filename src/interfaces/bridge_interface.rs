// src/interfaces/bridge_interface.rs
//! Bridge Interface
//!
//! The wrapped ETH token is an external collaborator: the bridge only needs
//! the standard fungible-token surface below. Which account may mint and burn
//! is fixed by the token; the bridge never grants roles.

use ethereum_types::{Address, U256};
use thiserror::Error;

/// Errors reported by a wrapped token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Caller does not hold the mint/burn capability
    #[error("Caller {caller:?} may not mint or burn")]
    NotMinter { caller: Address },

    /// Holder balance too small
    #[error("Insufficient token balance: {account:?} holds {balance}, needs {amount}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        amount: U256,
    },

    /// Spender allowance too small
    #[error("Insufficient allowance: {spender:?} may move {allowance} of {owner:?}'s tokens, needs {amount}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: U256,
        amount: U256,
    },

    /// Supply or balance would wrap
    #[error("Token arithmetic overflow")]
    Overflow,
}

/// Fungible token surface used by the L2 bridge
pub trait WrappedToken {
    /// Whether `account` may mint and burn
    fn is_minter(&self, account: Address) -> bool;

    /// Create `amount` tokens for `to`
    fn mint(&mut self, caller: Address, to: Address, amount: U256) -> Result<(), TokenError>;

    /// Destroy `amount` tokens held by `from`
    fn burn(&mut self, caller: Address, from: Address, amount: U256) -> Result<(), TokenError>;

    /// Balance of `account`
    fn balance_of(&self, account: Address) -> U256;

    /// Tokens in circulation
    fn total_supply(&self) -> U256;

    /// Let `spender` move up to `amount` of `owner`'s tokens
    fn approve(&mut self, owner: Address, spender: Address, amount: U256);

    /// Remaining allowance of `spender` over `owner`'s tokens
    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Move tokens on behalf of `from`, consuming allowance
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;
}
