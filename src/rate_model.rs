//! Interest-rate models.
//!
//! A model is a pure function of the reserve's totals; each reserve stores
//! its own model handle so different assets can price risk differently.

use crate::{
    error::LendingError,
    math::{decimal::U256, Rate, TryAdd, TryDiv, TryMul, TrySub, RAY},
};
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

/// Per-reserve model handle
pub type RateModelHandle = Arc<dyn InterestRateModel>;

/// Rates returned by a model, annual and RAY-scaled
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InterestRates {
    /// Rate paid to suppliers
    pub liquidity_rate: Rate,
    /// Rate charged on variable debt
    pub borrow_rate: Rate,
}

/// Pure mapping from reserve totals to current rates.
pub trait InterestRateModel: fmt::Debug + Send + Sync {
    /// Compute `(liquidity_rate, borrow_rate)` for a reserve holding
    /// `total_liquidity` (cash + debt) of which `total_debt` is lent out.
    /// Both totals are in the asset's native units.
    fn calculate_interest_rates(
        &self,
        total_liquidity: u128,
        total_debt: u128,
    ) -> Result<InterestRates, LendingError>;
}

/// Utilization of a reserve: `total_debt / total_liquidity`, RAY-scaled.
/// Zero when nothing is borrowed.
pub fn utilization_rate(total_liquidity: u128, total_debt: u128) -> Result<Rate, LendingError> {
    if total_debt == 0 {
        return Ok(Rate::zero());
    }
    if total_liquidity == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let scaled = U256::from(total_debt)
        .checked_mul(U256::from(RAY))
        .ok_or(LendingError::MathOverflow)?
        .checked_div(U256::from(total_liquidity))
        .ok_or(LendingError::MathOverflow)?;
    u128::try_from(scaled)
        .map(Rate::from_scaled_val)
        .map_err(|_| LendingError::MathOverflow)
}

/// Dual-slope model: below optimal utilization the borrow rate climbs
/// gently along `slope1`, above it the remaining capacity is priced along
/// the steeper `slope2`.
///
/// - `utilization <= optimal`:
///   `borrow = base + utilization * slope1 / optimal`
/// - `utilization > optimal`:
///   `borrow = base + slope1 + (utilization - optimal) * slope2 / (1 - optimal)`
///
/// The borrow rate is capped at `base + slope1 + slope2`, and the liquidity
/// rate is the borrow rate weighted by utilization.
#[derive(Clone, Debug)]
pub struct DualSlopeRateModel {
    base_rate: Rate,
    slope1: Rate,
    slope2: Rate,
    optimal_utilization: Rate,
}

impl DualSlopeRateModel {
    /// Create a model. `optimal_utilization` must lie strictly between zero
    /// and one.
    pub fn new(
        base_rate: Rate,
        slope1: Rate,
        slope2: Rate,
        optimal_utilization: Rate,
    ) -> Result<Self, LendingError> {
        if optimal_utilization == Rate::zero() || optimal_utilization >= Rate::one() {
            return Err(LendingError::InvalidConfig);
        }
        Ok(Self {
            base_rate,
            slope1,
            slope2,
            optimal_utilization,
        })
    }

    /// Borrow rate at full utilization; no utilization can price above it
    pub fn max_borrow_rate(&self) -> Result<Rate, LendingError> {
        self.base_rate.try_add(self.slope1)?.try_add(self.slope2)
    }
}

impl InterestRateModel for DualSlopeRateModel {
    fn calculate_interest_rates(
        &self,
        total_liquidity: u128,
        total_debt: u128,
    ) -> Result<InterestRates, LendingError> {
        if total_liquidity == 0 {
            return Ok(InterestRates {
                liquidity_rate: Rate::zero(),
                borrow_rate: self.base_rate,
            });
        }

        let utilization = utilization_rate(total_liquidity, total_debt)?;

        let borrow_rate = if utilization <= self.optimal_utilization {
            let variable = utilization
                .try_mul(self.slope1)?
                .try_div(self.optimal_utilization)?;
            self.base_rate.try_add(variable)?
        } else {
            let excess = utilization.try_sub(self.optimal_utilization)?;
            let remaining = Rate::one().try_sub(self.optimal_utilization)?;
            let variable = excess.try_mul(self.slope2)?.try_div(remaining)?;
            self.base_rate.try_add(self.slope1)?.try_add(variable)?
        };
        let borrow_rate = borrow_rate.min(self.max_borrow_rate()?);

        let liquidity_rate = borrow_rate.try_mul(utilization)?;

        Ok(InterestRates {
            liquidity_rate,
            borrow_rate,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    // base 2%, slope1 4%, slope2 75%, optimal utilization 80%
    fn model() -> DualSlopeRateModel {
        DualSlopeRateModel::new(
            Rate::from_percent(2),
            Rate::from_percent(4),
            Rate::from_percent(75),
            Rate::from_percent(80),
        )
        .unwrap()
    }

    #[test]
    fn empty_reserve_prices_at_base() {
        let rates = model().calculate_interest_rates(0, 0).unwrap();
        assert_eq!(rates.borrow_rate, Rate::from_percent(2));
        assert_eq!(rates.liquidity_rate, Rate::zero());
    }

    #[test]
    fn rates_at_optimal_utilization() {
        // utilization 800/1000 sits exactly on the kink
        let rates = model().calculate_interest_rates(1_000, 800).unwrap();
        assert_eq!(rates.borrow_rate, Rate::from_percent(6));
        // 6% * 0.8 = 4.8%
        assert_eq!(
            rates.liquidity_rate.to_scaled_val().unwrap(),
            48 * RAY / 1000
        );
    }

    #[test]
    fn curve_is_continuous_at_the_kink() {
        let model = model();
        let below = model.calculate_interest_rates(1_000_000, 799_999).unwrap();
        let at = model.calculate_interest_rates(1_000_000, 800_000).unwrap();
        let above = model.calculate_interest_rates(1_000_000, 800_001).unwrap();
        assert!(below.borrow_rate < at.borrow_rate);
        assert!(at.borrow_rate < above.borrow_rate);
        // one millionth of utilization moves the rate by well under a bps
        let gap = above.borrow_rate.try_sub(below.borrow_rate).unwrap();
        assert!(gap < Rate::from_bps(1));
    }

    #[test]
    fn full_utilization_hits_the_cap() {
        let model = model();
        let rates = model.calculate_interest_rates(1_000, 1_000).unwrap();
        assert_eq!(rates.borrow_rate, model.max_borrow_rate().unwrap());
        assert_eq!(rates.borrow_rate, Rate::from_percent(81));
    }

    #[test]
    fn optimal_utilization_bounds_are_enforced() {
        assert_eq!(
            DualSlopeRateModel::new(Rate::zero(), Rate::zero(), Rate::zero(), Rate::zero())
                .unwrap_err(),
            LendingError::InvalidConfig
        );
        assert_eq!(
            DualSlopeRateModel::new(Rate::zero(), Rate::zero(), Rate::zero(), Rate::one())
                .unwrap_err(),
            LendingError::InvalidConfig
        );
    }

    proptest! {
        #[test]
        fn borrow_rate_is_monotone_in_utilization(
            total_liquidity in 1u128..=1_000_000_000_000,
            debt_a in 0u128..=1_000_000_000_000,
            debt_b in 0u128..=1_000_000_000_000,
        ) {
            let debt_a = debt_a.min(total_liquidity);
            let debt_b = debt_b.min(total_liquidity);
            let (lo, hi) = if debt_a <= debt_b { (debt_a, debt_b) } else { (debt_b, debt_a) };

            let model = model();
            let lo_rates = model.calculate_interest_rates(total_liquidity, lo)?;
            let hi_rates = model.calculate_interest_rates(total_liquidity, hi)?;
            prop_assert!(lo_rates.borrow_rate <= hi_rates.borrow_rate);
            prop_assert!(hi_rates.borrow_rate <= model.max_borrow_rate()?);
        }

        #[test]
        fn liquidity_rate_never_exceeds_borrow_rate(
            total_liquidity in 1u128..=1_000_000_000_000,
            total_debt in 0u128..=1_000_000_000_000,
        ) {
            let total_debt = total_debt.min(total_liquidity);
            let rates = model().calculate_interest_rates(total_liquidity, total_debt)?;
            prop_assert!(rates.liquidity_rate <= rates.borrow_rate);
        }
    }
}
