//! Per-asset reserve state and interest-index accrual.

use crate::{
    constants::{MAX_BPS, SECONDS_PER_YEAR},
    error::LendingError,
    math::{decimal::U256, Rate, TryAdd, TryDiv, TryMul, RAY},
    rate_model::RateModelHandle,
    state::{AssetId, DebtClaimLedger, SupplyClaimLedger},
};
use borsh::{BorshDeserialize, BorshSerialize};
use std::convert::TryFrom;

/// Risk parameters of a reserve, in bps
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReserveConfig {
    /// Maximum borrow value granted per unit of collateral value
    pub ltv_bps: u64,
    /// Collateral weight used by the health factor
    pub liquidation_threshold_bps: u64,
    /// Extra collateral granted to liquidators
    pub liquidation_bonus_bps: u64,
}

impl ReserveConfig {
    /// Validate the parameter ordering: `ltv <= threshold <= 100%` and
    /// `bonus < 100%`
    pub fn validate(&self) -> Result<(), LendingError> {
        if self.ltv_bps > self.liquidation_threshold_bps {
            return Err(LendingError::InvalidConfig);
        }
        if self.liquidation_threshold_bps > MAX_BPS {
            return Err(LendingError::InvalidConfig);
        }
        if self.liquidation_bonus_bps >= MAX_BPS {
            return Err(LendingError::InvalidConfig);
        }
        Ok(())
    }
}

/// Initialize a reserve
pub struct InitReserveParams {
    /// Asset the reserve custodies
    pub asset: AssetId,
    /// Risk parameters
    pub config: ReserveConfig,
    /// Interest-rate model handle
    pub rate_model: RateModelHandle,
    /// Timestamp of initialization
    pub current_timestamp: u64,
}

/// Lending pool reserve state
#[derive(Clone, Debug)]
pub struct Reserve {
    /// Asset the reserve custodies
    pub asset: AssetId,
    /// Supply-side interest index, RAY-scaled, starts at one
    pub liquidity_index: Rate,
    /// Debt-side interest index, RAY-scaled, starts at one
    pub variable_borrow_index: Rate,
    /// Annual rate currently paid to suppliers
    pub current_liquidity_rate: Rate,
    /// Annual rate currently charged on variable debt
    pub current_borrow_rate: Rate,
    /// Timestamp of the last index advancement
    pub last_update_timestamp: u64,
    /// Risk parameters
    pub config: ReserveConfig,
    /// Paired supply-claim ledger
    pub supply_claim: SupplyClaimLedger,
    /// Paired debt-claim ledger
    pub debt_claim: DebtClaimLedger,
    /// Interest-rate model handle
    pub rate_model: RateModelHandle,
    /// Initialized and serviceable
    pub is_active: bool,
    /// Frozen: no new deposits or borrows; withdraw and repay still serve
    pub is_frozen: bool,
}

impl Reserve {
    /// Create a new reserve
    pub fn new(params: InitReserveParams) -> Result<Self, LendingError> {
        params.config.validate()?;
        let initial_rates = params.rate_model.calculate_interest_rates(0, 0)?;
        Ok(Self {
            asset: params.asset,
            liquidity_index: Rate::one(),
            variable_borrow_index: Rate::one(),
            current_liquidity_rate: initial_rates.liquidity_rate,
            current_borrow_rate: initial_rates.borrow_rate,
            last_update_timestamp: params.current_timestamp,
            config: params.config,
            supply_claim: SupplyClaimLedger::new(params.asset),
            debt_claim: DebtClaimLedger::new(params.asset),
            rate_model: params.rate_model,
            is_active: true,
            is_frozen: false,
        })
    }

    /// Advance both indices over the time elapsed since the last update,
    /// then refresh the stored rates from the post-accrual totals.
    ///
    /// Compounding is linear over the elapsed seconds:
    /// `index <- index * (1 + annual_rate * elapsed / SECONDS_PER_YEAR)`,
    /// using the rates stored by the previous call, applied uniformly to
    /// both indices. Idempotent within the same timestamp.
    pub fn accrue_interest(&mut self, current_timestamp: u64, cash: u128) -> Result<(), LendingError> {
        let elapsed = current_timestamp
            .checked_sub(self.last_update_timestamp)
            .ok_or(LendingError::InvalidTimestamp)?;
        if elapsed == 0 {
            return Ok(());
        }

        self.liquidity_index = self
            .liquidity_index
            .try_mul(linear_interest(self.current_liquidity_rate, elapsed)?)?;
        self.variable_borrow_index = self
            .variable_borrow_index
            .try_mul(linear_interest(self.current_borrow_rate, elapsed)?)?;

        self.refresh_rates(cash)?;
        self.last_update_timestamp = current_timestamp;
        Ok(())
    }

    /// Re-derive the stored rates from the reserve's current totals.
    ///
    /// Runs inside [`Reserve::accrue_interest`] and again after any
    /// operation that moves balances, so the rates accruing over the next
    /// interval always reflect the utilization that interval actually
    /// starts with. That keeps the supply side from out-earning the debt
    /// that funds it.
    pub fn refresh_rates(&mut self, cash: u128) -> Result<(), LendingError> {
        let total_debt = self.total_debt()?;
        let total_liquidity = cash
            .checked_add(total_debt)
            .ok_or(LendingError::MathOverflow)?;
        let rates = self
            .rate_model
            .calculate_interest_rates(total_liquidity, total_debt)?;
        self.current_liquidity_rate = rates.liquidity_rate;
        self.current_borrow_rate = rates.borrow_rate;
        Ok(())
    }

    /// Total outstanding debt in underlying units
    pub fn total_debt(&self) -> Result<u128, LendingError> {
        underlying_from_scaled(self.debt_claim.total_supply(), self.variable_borrow_index)
    }

    /// Underlying value of every outstanding supply claim
    pub fn total_supply_underlying(&self) -> Result<u128, LendingError> {
        underlying_from_scaled(self.supply_claim.total_supply(), self.liquidity_index)
    }

    /// Underlying value of `account`'s supply claim
    pub fn supply_balance_of(&self, account: &crate::state::AccountId) -> Result<u128, LendingError> {
        underlying_from_scaled(self.supply_claim.balance_of(account), self.liquidity_index)
    }

    /// Underlying value of `account`'s debt claim
    pub fn debt_balance_of(&self, account: &crate::state::AccountId) -> Result<u128, LendingError> {
        underlying_from_scaled(self.debt_claim.balance_of(account), self.variable_borrow_index)
    }

    /// Supply-claim units worth `amount` underlying, rounded down
    pub fn supply_claim_from_underlying(&self, amount: u128) -> Result<u128, LendingError> {
        scaled_from_underlying(amount, self.liquidity_index, Rounding::Floor)
    }

    /// Supply-claim units worth `amount` underlying, rounded up
    pub fn supply_claim_from_underlying_ceil(&self, amount: u128) -> Result<u128, LendingError> {
        scaled_from_underlying(amount, self.liquidity_index, Rounding::Ceil)
    }

    /// Debt-claim units worth `amount` underlying, rounded down
    pub fn debt_claim_from_underlying(&self, amount: u128) -> Result<u128, LendingError> {
        scaled_from_underlying(amount, self.variable_borrow_index, Rounding::Floor)
    }

    /// Debt-claim units worth `amount` underlying, rounded up
    pub fn debt_claim_from_underlying_ceil(&self, amount: u128) -> Result<u128, LendingError> {
        scaled_from_underlying(amount, self.variable_borrow_index, Rounding::Ceil)
    }
}

/// Rounding direction for claim conversions. Mints and burns always round
/// in the pool's favor so accumulated dust can never over-commit the cash
/// on hand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Rounding {
    Floor,
    Ceil,
}

/// `1 + rate * elapsed / SECONDS_PER_YEAR`, RAY-scaled
fn linear_interest(annual_rate: Rate, elapsed_seconds: u64) -> Result<Rate, LendingError> {
    annual_rate
        .try_mul(elapsed_seconds)?
        .try_div(SECONDS_PER_YEAR)?
        .try_add(Rate::one())
}

/// `scaled * index / RAY`, truncating
fn underlying_from_scaled(scaled: u128, index: Rate) -> Result<u128, LendingError> {
    let value = U256::from(scaled)
        .checked_mul(index.0)
        .ok_or(LendingError::MathOverflow)?
        .checked_div(U256::from(RAY))
        .ok_or(LendingError::MathOverflow)?;
    u128::try_from(value).map_err(|_| LendingError::MathOverflow)
}

/// `amount * RAY / index` with the requested rounding
fn scaled_from_underlying(amount: u128, index: Rate, rounding: Rounding) -> Result<u128, LendingError> {
    if index.0.is_zero() {
        return Err(LendingError::DivisionByZero);
    }
    let numerator = U256::from(amount)
        .checked_mul(U256::from(RAY))
        .ok_or(LendingError::MathOverflow)?;
    let numerator = match rounding {
        Rounding::Floor => numerator,
        Rounding::Ceil => numerator
            .checked_add(index.0 - U256::from(1u64))
            .ok_or(LendingError::MathOverflow)?,
    };
    let scaled = numerator
        .checked_div(index.0)
        .ok_or(LendingError::MathOverflow)?;
    u128::try_from(scaled).map_err(|_| LendingError::MathOverflow)
}
