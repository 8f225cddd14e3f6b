//! Claim ledgers paired with each reserve.
//!
//! Balances are stored *scaled*: an account's underlying position equals
//! `scaled_balance * current_index / RAY`. The ledgers never consult the
//! index themselves; the pool converts at the call site.

use crate::{error::LendingError, state::{AccountId, AssetId}};
use borsh::{BorshDeserialize, BorshSerialize};
use std::collections::BTreeMap;

/// Which side of a reserve a claim ledger tracks
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum ClaimKind {
    /// Right to redeem underlying; grows with the liquidity index
    Supply,
    /// Obligation to repay underlying; grows with the borrow index
    Debt,
}

/// Handle of a claim ledger, unique per (reserve, side)
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClaimId {
    /// Asset of the paired reserve
    pub asset: AssetId,
    /// Supply or debt side
    pub kind: ClaimKind,
}

/// Supply-side claim ledger. Supports mint, burn, and the liquidation
/// transfer; arbitrary transfers are not part of the pool surface.
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Eq, PartialEq)]
pub struct SupplyClaimLedger {
    /// Ledger handle
    pub id: ClaimId,
    balances: BTreeMap<AccountId, u128>,
    total_supply: u128,
}

impl SupplyClaimLedger {
    /// Create an empty ledger for the reserve of `asset`
    pub fn new(asset: AssetId) -> Self {
        Self {
            id: ClaimId {
                asset,
                kind: ClaimKind::Supply,
            },
            balances: BTreeMap::new(),
            total_supply: 0,
        }
    }

    /// Scaled balance of `account`
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all scaled balances
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Create `amount` scaled units for `account`
    pub fn mint(&mut self, account: &AccountId, amount: u128) -> Result<(), LendingError> {
        let balance = self.balance_of(account);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        self.balances.insert(*account, new_balance);
        Ok(())
    }

    /// Destroy `amount` scaled units held by `account`
    pub fn burn(&mut self, account: &AccountId, amount: u128) -> Result<(), LendingError> {
        let balance = self.balance_of(account);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(LendingError::InsufficientFunds)?;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LendingError::MathOverflow)?;
        if new_balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, new_balance);
        }
        Ok(())
    }

    /// Move `amount` scaled units from a liquidated borrower to the
    /// liquidator. Total supply is unchanged.
    pub fn transfer_on_liquidation(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LendingError> {
        let from_balance = self.balance_of(from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(LendingError::InsufficientFunds)?;
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        if new_from == 0 {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, new_from);
        }
        self.balances.insert(*to, new_to);
        Ok(())
    }
}

/// Debt-side claim ledger. Mint and burn only; debt cannot change hands.
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Eq, PartialEq)]
pub struct DebtClaimLedger {
    /// Ledger handle
    pub id: ClaimId,
    balances: BTreeMap<AccountId, u128>,
    total_supply: u128,
}

impl DebtClaimLedger {
    /// Create an empty ledger for the reserve of `asset`
    pub fn new(asset: AssetId) -> Self {
        Self {
            id: ClaimId {
                asset,
                kind: ClaimKind::Debt,
            },
            balances: BTreeMap::new(),
            total_supply: 0,
        }
    }

    /// Scaled balance of `account`
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all scaled balances
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Record `amount` scaled units of debt against `account`
    pub fn mint(&mut self, account: &AccountId, amount: u128) -> Result<(), LendingError> {
        let balance = self.balance_of(account);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        self.balances.insert(*account, new_balance);
        Ok(())
    }

    /// Settle `amount` scaled units of `account`'s debt
    pub fn burn(&mut self, account: &AccountId, amount: u128) -> Result<(), LendingError> {
        let balance = self.balance_of(account);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(LendingError::InsufficientFunds)?;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(LendingError::MathOverflow)?;
        if new_balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, new_balance);
        }
        Ok(())
    }

    /// Debt claims are not transferable; this always fails.
    pub fn transfer(
        &mut self,
        _from: &AccountId,
        _to: &AccountId,
        _amount: u128,
    ) -> Result<(), LendingError> {
        Err(LendingError::DebtNotTransferable)
    }
}
