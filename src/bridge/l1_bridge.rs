// src/bridge/l1_bridge.rs
//! L1 half of the bridge
//!
//! Locks deposited ETH, turns deposit credit into wrapped tokens through the
//! L2 counterpart, and releases ETH for burned tokens once the pending period
//! has passed.

use std::collections::HashMap;
use std::sync::Arc;

use ethereum_types::{Address, U256};
use log::{debug, info};

use super::{sum_amounts, BridgeError, L2Bridge, PendingWithdrawal};
use crate::interfaces::{Clock, WrappedToken};

/// L1 custody of bridged ETH
#[derive(Debug)]
pub struct L1Bridge {
    /// Address of this bridge
    address: Address,

    /// Account allowed to configure the counterpart
    owner: Address,

    /// Seconds between a withdrawal request and its release
    pending_period: u64,

    /// Time source
    clock: Arc<dyn Clock>,

    /// L2 bridge allowed to report burns
    l2_counterpart: Option<Address>,

    /// ETH held by the bridge
    locked: U256,

    /// Deposits not yet minted on L2
    deposits: HashMap<Address, U256>,

    /// Burned on L2, not yet requested
    withdrawable: HashMap<Address, U256>,

    /// Requested withdrawals, one per account
    pending: HashMap<Address, PendingWithdrawal>,
}

impl L1Bridge {
    /// Create a bridge with nothing locked and no counterpart
    pub fn new(address: Address, owner: Address, pending_period: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            address,
            owner,
            pending_period,
            clock,
            l2_counterpart: None,
            locked: U256::zero(),
            deposits: HashMap::new(),
            withdrawable: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Configure the L2 counterpart; owner only, once
    pub fn set_l2_counterpart(&mut self, caller: Address, l2_address: Address) -> Result<(), BridgeError> {
        if caller != self.owner {
            return Err(BridgeError::Unauthorized { caller });
        }
        if let Some(existing) = self.l2_counterpart {
            return Err(BridgeError::CounterpartAlreadySet(existing));
        }

        self.l2_counterpart = Some(l2_address);
        info!("L1 bridge {:?} linked to L2 bridge {:?}", self.address, l2_address);
        Ok(())
    }

    /// Lock `value` wei sent by `caller`
    pub fn deposit(&mut self, caller: Address, value: U256) -> Result<(), BridgeError> {
        if value.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        let locked = self.locked.checked_add(value).ok_or(BridgeError::Overflow)?;
        let credit = self
            .deposit_of(caller)
            .checked_add(value)
            .ok_or(BridgeError::Overflow)?;

        self.locked = locked;
        self.deposits.insert(caller, credit);

        info!("Deposit of {} wei locked for {:?}", value, caller);
        Ok(())
    }

    /// Spend `amount` of the caller's deposit credit on wrapped tokens minted on L2
    pub fn mint<T>(
        &mut self,
        caller: Address,
        amount: U256,
        l2: &mut L2Bridge,
        token: &mut T,
    ) -> Result<(), BridgeError>
    where
        T: WrappedToken + ?Sized,
    {
        let counterpart = self.l2_counterpart.ok_or(BridgeError::CounterpartNotSet)?;
        if l2.address() != counterpart {
            return Err(BridgeError::CounterpartMismatch {
                expected: counterpart,
                got: l2.address(),
            });
        }
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        let available = self.deposit_of(caller);
        if available < amount {
            return Err(BridgeError::InsufficientDeposit {
                account: caller,
                available,
                amount,
            });
        }

        // The L2 side validates and mints; nothing here has changed yet
        l2.mint(self.address, caller, amount, token)?;
        self.deposits.insert(caller, available - amount);

        info!("Deposit credit of {} wei converted to wrapped tokens for {:?}", amount, caller);
        Ok(())
    }

    /// Check that `caller` may report a burn of `amount` for `account`
    pub(crate) fn check_l2_burn(&self, caller: Address, account: Address, amount: U256) -> Result<(), BridgeError> {
        let counterpart = self.l2_counterpart.ok_or(BridgeError::CounterpartNotSet)?;
        if caller != counterpart {
            return Err(BridgeError::NotCounterpart {
                caller,
                expected: counterpart,
            });
        }
        self.withdrawable_of(account)
            .checked_add(amount)
            .ok_or(BridgeError::Overflow)?;
        Ok(())
    }

    /// Credit `account` for wrapped tokens burned on L2; counterpart only
    pub fn on_l2_burn(&mut self, caller: Address, account: Address, amount: U256) -> Result<(), BridgeError> {
        self.check_l2_burn(caller, account, amount)?;
        let credit = self.withdrawable_of(account) + amount;
        self.withdrawable.insert(account, credit);

        debug!("L2 burn of {} wei credited to {:?}", amount, account);
        Ok(())
    }

    /// Start the pending period for `amount` of the caller's withdrawable credit
    pub fn request_withdraw(&mut self, caller: Address, amount: U256) -> Result<(), BridgeError> {
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }
        if self.pending.contains_key(&caller) {
            return Err(BridgeError::WithdrawalAlreadyPending(caller));
        }
        let available = self.withdrawable_of(caller);
        if available < amount {
            return Err(BridgeError::InsufficientWithdrawableBalance {
                account: caller,
                available,
                amount,
            });
        }

        let requested_at = self.clock.now();
        self.withdrawable.insert(caller, available - amount);
        self.pending.insert(
            caller,
            PendingWithdrawal {
                account: caller,
                amount,
                requested_at,
            },
        );

        info!("Withdrawal of {} wei requested by {:?} at {}", amount, caller, requested_at);
        Ok(())
    }

    /// Release the caller's pending withdrawal and return the amount paid out
    pub fn withdraw(&mut self, caller: Address) -> Result<U256, BridgeError> {
        let request = *self
            .pending
            .get(&caller)
            .ok_or(BridgeError::NoPendingWithdrawal(caller))?;
        let now = self.clock.now();
        let available_at = request.requested_at.saturating_add(self.pending_period);

        if now < available_at {
            return Err(BridgeError::PendingPeriodNotElapsed {
                account: caller,
                available_at,
                now,
            });
        }
        let locked = self.locked.checked_sub(request.amount).ok_or(BridgeError::Overflow)?;

        self.locked = locked;
        self.pending.remove(&caller);

        info!("Withdrawal of {} wei released to {:?}", request.amount, caller);
        Ok(request.amount)
    }

    /// Address of this bridge
    pub fn address(&self) -> Address {
        self.address
    }

    /// Configuring owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Configured L2 counterpart
    pub fn l2_counterpart(&self) -> Option<Address> {
        self.l2_counterpart
    }

    /// Pending withdrawal period in seconds
    pub fn pending_period(&self) -> u64 {
        self.pending_period
    }

    /// ETH currently held
    pub fn locked_balance(&self) -> U256 {
        self.locked
    }

    /// Unminted deposit credit of `account`
    pub fn deposit_of(&self, account: Address) -> U256 {
        self.deposits.get(&account).copied().unwrap_or_default()
    }

    /// Withdrawable credit of `account`
    pub fn withdrawable_of(&self, account: Address) -> U256 {
        self.withdrawable.get(&account).copied().unwrap_or_default()
    }

    /// Outstanding request of `account`
    pub fn pending_withdrawal(&self, account: Address) -> Option<&PendingWithdrawal> {
        self.pending.get(&account)
    }

    /// Claims on locked ETH other than wrapped tokens in circulation
    pub fn outstanding_claims(&self) -> Result<U256, BridgeError> {
        let deposits = sum_amounts(self.deposits.values())?;
        let withdrawable = sum_amounts(self.withdrawable.values())?;
        let pending = sum_amounts(self.pending.values().map(|p| &p.amount))?;

        deposits
            .checked_add(withdrawable)
            .and_then(|total| total.checked_add(pending))
            .ok_or(BridgeError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::ManualClock;

    const PERIOD: u64 = 60;

    fn owner() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn user() -> Address {
        Address::repeat_byte(0x05)
    }

    fn l2_address() -> Address {
        Address::repeat_byte(0x22)
    }

    fn setup() -> (L1Bridge, ManualClock) {
        let clock = ManualClock::new(500);
        let mut bridge = L1Bridge::new(Address::repeat_byte(0x11), owner(), PERIOD, Arc::new(clock.clone()));
        bridge.set_l2_counterpart(owner(), l2_address()).unwrap();
        (bridge, clock)
    }

    #[test]
    fn test_counterpart_configuration() {
        let clock = ManualClock::new(0);
        let mut bridge = L1Bridge::new(Address::repeat_byte(0x11), owner(), PERIOD, Arc::new(clock));

        assert_eq!(
            bridge.set_l2_counterpart(user(), l2_address()),
            Err(BridgeError::Unauthorized { caller: user() })
        );
        bridge.set_l2_counterpart(owner(), l2_address()).unwrap();
        assert_eq!(
            bridge.set_l2_counterpart(owner(), user()),
            Err(BridgeError::CounterpartAlreadySet(l2_address()))
        );
        assert_eq!(bridge.l2_counterpart(), Some(l2_address()));
    }

    #[test]
    fn test_deposit_locks_value() {
        let (mut bridge, _) = setup();

        bridge.deposit(user(), U256::from(7u64)).unwrap();
        bridge.deposit(user(), U256::from(3u64)).unwrap();

        assert_eq!(bridge.locked_balance(), U256::from(10u64));
        assert_eq!(bridge.deposit_of(user()), U256::from(10u64));
        assert_eq!(bridge.deposit(user(), U256::zero()), Err(BridgeError::ZeroAmount));
    }

    #[test]
    fn test_only_counterpart_reports_burns() {
        let (mut bridge, _) = setup();

        assert_eq!(
            bridge.on_l2_burn(user(), user(), U256::one()),
            Err(BridgeError::NotCounterpart {
                caller: user(),
                expected: l2_address(),
            })
        );
        bridge.on_l2_burn(l2_address(), user(), U256::one()).unwrap();
        assert_eq!(bridge.withdrawable_of(user()), U256::one());
    }

    #[test]
    fn test_withdraw_waits_for_pending_period() {
        let (mut bridge, clock) = setup();
        bridge.deposit(user(), U256::from(5u64)).unwrap();
        bridge.on_l2_burn(l2_address(), user(), U256::from(5u64)).unwrap();

        assert_eq!(
            bridge.request_withdraw(user(), U256::from(6u64)),
            Err(BridgeError::InsufficientWithdrawableBalance {
                account: user(),
                available: U256::from(5u64),
                amount: U256::from(6u64),
            })
        );
        bridge.request_withdraw(user(), U256::from(4u64)).unwrap();
        assert_eq!(
            bridge.request_withdraw(user(), U256::one()),
            Err(BridgeError::WithdrawalAlreadyPending(user()))
        );

        clock.advance(PERIOD - 1);
        assert_eq!(
            bridge.withdraw(user()),
            Err(BridgeError::PendingPeriodNotElapsed {
                account: user(),
                available_at: 500 + PERIOD,
                now: 500 + PERIOD - 1,
            })
        );

        clock.advance(1);
        assert_eq!(bridge.withdraw(user()), Ok(U256::from(4u64)));
        assert_eq!(bridge.locked_balance(), U256::one());
        assert_eq!(bridge.withdraw(user()), Err(BridgeError::NoPendingWithdrawal(user())));
        assert_eq!(bridge.withdrawable_of(user()), U256::one());
    }

    #[test]
    fn test_outstanding_claims_cover_every_bucket() {
        let (mut bridge, _) = setup();
        bridge.deposit(user(), U256::from(10u64)).unwrap();
        bridge.on_l2_burn(l2_address(), owner(), U256::from(3u64)).unwrap();
        bridge.request_withdraw(owner(), U256::from(2u64)).unwrap();

        // 10 deposit + 1 withdrawable + 2 pending
        assert_eq!(bridge.outstanding_claims(), Ok(U256::from(13u64)));
    }
}
