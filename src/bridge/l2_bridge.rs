// src/bridge/l2_bridge.rs
//! L2 half of the bridge
//!
//! Mints wrapped ETH when the L1 counterpart asks for it and burns wrapped ETH
//! handed back by users, reporting each burn to L1 as withdrawable credit.

use ethereum_types::{Address, U256};
use log::info;

use super::{BridgeError, L1Bridge};
use crate::interfaces::{TokenError, WrappedToken};

/// L2 mint/burn authority for wrapped ETH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Bridge {
    address: Address,
    l1_counterpart: Address,
}

impl L2Bridge {
    /// Create a bridge bound to its L1 counterpart for life
    pub fn new(address: Address, l1_counterpart: Address) -> Self {
        Self {
            address,
            l1_counterpart,
        }
    }

    /// Address of this bridge
    pub fn address(&self) -> Address {
        self.address
    }

    /// L1 bridge allowed to request mints
    pub fn l1_counterpart(&self) -> Address {
        self.l1_counterpart
    }

    /// Mint `amount` wrapped tokens to `to`; L1 counterpart only
    pub fn mint<T>(&mut self, caller: Address, to: Address, amount: U256, token: &mut T) -> Result<(), BridgeError>
    where
        T: WrappedToken + ?Sized,
    {
        if caller != self.l1_counterpart {
            return Err(BridgeError::NotCounterpart {
                caller,
                expected: self.l1_counterpart,
            });
        }
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }

        token.mint(self.address, to, amount)?;

        info!("Minted {} wrapped wei to {:?}", amount, to);
        Ok(())
    }

    /// Hand `amount` wrapped tokens back to the bridge and burn them.
    ///
    /// The caller must have approved this bridge for at least `amount`. The
    /// burn is reported to `l1`, where it becomes withdrawable credit.
    pub fn deposit<T>(
        &mut self,
        caller: Address,
        amount: U256,
        token: &mut T,
        l1: &mut L1Bridge,
    ) -> Result<(), BridgeError>
    where
        T: WrappedToken + ?Sized,
    {
        if l1.address() != self.l1_counterpart {
            return Err(BridgeError::CounterpartMismatch {
                expected: self.l1_counterpart,
                got: l1.address(),
            });
        }
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        self.check_burnable(caller, amount, token)?;
        l1.check_l2_burn(self.address, caller, amount)?;

        token.transfer_from(self.address, caller, self.address, amount)?;
        token.burn(self.address, self.address, amount)?;
        l1.on_l2_burn(self.address, caller, amount)?;

        info!("Burned {} wrapped wei deposited by {:?}", amount, caller);
        Ok(())
    }

    fn check_burnable<T>(&self, caller: Address, amount: U256, token: &T) -> Result<(), BridgeError>
    where
        T: WrappedToken + ?Sized,
    {
        if !token.is_minter(self.address) {
            return Err(TokenError::NotMinter { caller: self.address }.into());
        }
        let allowance = token.allowance(caller, self.address);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: caller,
                spender: self.address,
                allowance,
                amount,
            }
            .into());
        }
        let balance = token.balance_of(caller);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: caller,
                balance,
                amount,
            }
            .into());
        }
        Ok(())
    }
}
