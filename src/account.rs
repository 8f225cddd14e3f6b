//! Cross-asset risk accounting for a single user.
//!
//! The pool walks every active reserve, values the user's supply and debt
//! claims in USD, and folds them into these aggregates. The health factor
//! compares threshold-weighted collateral against total debt; below one the
//! position is liquidatable.

use crate::{
    constants::MAX_BPS,
    error::LendingError,
    math::{Decimal, TryDiv, TryMul},
};

/// USD totals accumulated over a user's positions
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AccountAggregates {
    /// Total collateral value, unweighted
    pub collateral_value: Decimal,
    /// Collateral value weighted by each reserve's liquidation threshold
    pub weighted_collateral_value: Decimal,
    /// Collateral value weighted by each reserve's LTV
    pub ltv_weighted_value: Decimal,
    /// Total debt value
    pub debt_value: Decimal,
}

impl AccountAggregates {
    /// Health factor of the aggregated position
    pub fn health_factor(&self) -> Result<Decimal, LendingError> {
        health_factor(self.weighted_collateral_value, self.debt_value)
    }

    /// Fold into the reporting view
    pub fn into_account_data(self) -> Result<UserAccountData, LendingError> {
        Ok(UserAccountData {
            total_collateral_value: self.collateral_value,
            total_debt_value: self.debt_value,
            ltv_bps: average_bps(self.ltv_weighted_value, self.collateral_value)?,
            liquidation_threshold_bps: average_bps(
                self.weighted_collateral_value,
                self.collateral_value,
            )?,
            health_factor: self.health_factor()?,
        })
    }
}

/// Account-level risk summary
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UserAccountData {
    /// Total collateral value in USD, WAD-scaled
    pub total_collateral_value: Decimal,
    /// Total debt value in USD, WAD-scaled
    pub total_debt_value: Decimal,
    /// Collateral-weighted average LTV in bps
    pub ltv_bps: u64,
    /// Collateral-weighted average liquidation threshold in bps
    pub liquidation_threshold_bps: u64,
    /// Health factor, WAD-scaled; saturates at the largest representable
    /// value when the account has no debt
    pub health_factor: Decimal,
}

/// `weighted_collateral / debt`, saturating to the maximum when debt-free
pub fn health_factor(
    weighted_collateral: Decimal,
    debt: Decimal,
) -> Result<Decimal, LendingError> {
    if debt == Decimal::zero() {
        return Ok(Decimal::max());
    }
    weighted_collateral.try_div(debt)
}

fn average_bps(weighted: Decimal, total: Decimal) -> Result<u64, LendingError> {
    if total == Decimal::zero() {
        return Ok(0);
    }
    let average = weighted.try_mul(MAX_BPS as u128)?.try_div(total)?;
    Ok(average.try_floor_u128()? as u64)
}
