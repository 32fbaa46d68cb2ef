// src/bridge/wrapped_token.rs
//! In-memory wrapped ETH
//!
//! Minimal fungible token with a single account holding the mint and burn
//! capability, fixed at construction.

use std::collections::HashMap;

use ethereum_types::{Address, U256};

use crate::interfaces::{TokenError, WrappedToken};

/// Wrapped ETH ledger kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryWrappedEth {
    minter: Address,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl InMemoryWrappedEth {
    /// Create an empty token whose mint/burn capability belongs to `minter`
    pub fn new(minter: Address) -> Self {
        Self {
            minter,
            ..Default::default()
        }
    }

    /// Account holding the mint/burn capability
    pub fn minter(&self) -> Address {
        self.minter
    }

    fn ensure_minter(&self, caller: Address) -> Result<(), TokenError> {
        if caller != self.minter {
            return Err(TokenError::NotMinter { caller });
        }
        Ok(())
    }

    fn debit(&self, account: Address, amount: U256) -> Result<U256, TokenError> {
        let balance = self.balance_of(account);
        balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                account,
                balance,
                amount,
            })
    }
}

impl WrappedToken for InMemoryWrappedEth {
    fn is_minter(&self, account: Address) -> bool {
        account == self.minter
    }

    fn mint(&mut self, caller: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        self.ensure_minter(caller)?;
        let supply = self.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let balance = self.balance_of(to).checked_add(amount).ok_or(TokenError::Overflow)?;

        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    fn burn(&mut self, caller: Address, from: Address, amount: U256) -> Result<(), TokenError> {
        self.ensure_minter(caller)?;
        let balance = self.debit(from, amount)?;
        let supply = self.total_supply.checked_sub(amount).ok_or(TokenError::Overflow)?;

        self.total_supply = supply;
        self.balances.insert(from, balance);
        Ok(())
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                amount,
            });
        }
        let from_balance = self.debit(from, amount)?;
        let to_balance = if to == from {
            self.balance_of(to)
        } else {
            self.balance_of(to).checked_add(amount).ok_or(TokenError::Overflow)?
        };

        self.allowances.insert((from, spender), allowance - amount);
        self.balances.insert(from, from_balance);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}
