//! Custody of the underlying assets.
//!
//! The pool never implements token plumbing itself; it moves underlying
//! balances through this narrow interface and propagates any failure to the
//! caller, which aborts the operation.

use crate::{
    error::LendingError,
    state::{AccountId, AssetId},
};
use std::collections::BTreeMap;

/// External ledger of underlying-asset balances.
pub trait TokenBank {
    /// Balance of `holder` in `asset`'s native units
    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> u128;

    /// Move `amount` native units of `asset` from `from` to `to`.
    /// Fails with [`LendingError::InsufficientFunds`] when `from`'s balance
    /// cannot cover the transfer.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LendingError>;
}

/// Simple in-process token bank.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTokenBank {
    balances: BTreeMap<(AssetId, AccountId), u128>,
}

impl InMemoryTokenBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder` out of thin air; the issuing
    /// side of the underlying is outside the pool
    pub fn mint(
        &mut self,
        asset: &AssetId,
        holder: &AccountId,
        amount: u128,
    ) -> Result<(), LendingError> {
        let entry = self.balances.entry((*asset, *holder)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        Ok(())
    }
}

impl TokenBank for InMemoryTokenBank {
    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> u128 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LendingError> {
        let from_balance = self.balance_of(asset, from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(LendingError::InsufficientFunds)?;
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LendingError::MathOverflow)?;
        self.balances.insert((*asset, *from), new_from);
        self.balances.insert((*asset, *to), new_to);
        Ok(())
    }
}
