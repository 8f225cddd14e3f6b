//! The lending-pool controller.
//!
//! All state transitions run through [`LendingPool`]: deposits, withdrawals,
//! borrows, repayments, liquidations, and the administrative transitions.
//! Operations take `&mut self`, so a pool instance processes one operation
//! at a time to completion; hosts that share a pool across threads wrap it
//! in a mutex. Collaborators the pool does not own (the price feed, custody
//! of the underlying assets, the clock) are injected and reached only
//! through their narrow traits, so no external call can re-enter the
//! controller mid-operation.
//!
//! Every operation either returns `Ok` with all of its effects applied and
//! its event records emitted, or an error with no observable state change.

use crate::{
    account::{health_factor, AccountAggregates, UserAccountData},
    clock::Clock,
    constants::{
        CLOSE_FACTOR_BPS, HEALTH_FACTOR_LIQUIDATION_THRESHOLD, MAX_AMOUNT, MAX_BPS, MAX_RESERVES,
    },
    error::LendingError,
    events::LendingEvent,
    math::{decimal::U256, Decimal, Rate, SaturatingSub, TryAdd, TryDiv, TryMul},
    oracle::PriceOracle,
    rate_model::RateModelHandle,
    state::{AccountId, AssetId, InitReserveParams, Reserve, ReserveConfig},
    token::TokenBank,
};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

/// Roles recognized by the pool
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Role {
    /// May initialize reserves, freeze them, and pause the pool
    Admin,
    /// Not currently checked by [`LendingPool::liquidate`]; liquidation is
    /// open to all callers
    Liquidator,
}

/// Multi-asset over-collateralized lending pool.
pub struct LendingPool<C: Clock, O: PriceOracle, B: TokenBank> {
    reserves: BTreeMap<AssetId, Reserve>,
    // insertion order drives aggregator traversal; bounded by MAX_RESERVES
    reserve_list: Vec<AssetId>,
    pool_account: AccountId,
    admins: BTreeSet<AccountId>,
    liquidators: BTreeSet<AccountId>,
    paused: bool,
    clock: C,
    oracle: O,
    bank: B,
    events: Vec<LendingEvent>,
}

impl<C: Clock, O: PriceOracle, B: TokenBank> LendingPool<C, O, B> {
    /// Create an empty pool. `default_admin` is granted the admin role;
    /// `pool_account` is the bank account holding pool custody of the
    /// underlying assets.
    pub fn new(default_admin: AccountId, pool_account: AccountId, clock: C, oracle: O, bank: B) -> Self {
        let mut admins = BTreeSet::new();
        admins.insert(default_admin);
        Self {
            reserves: BTreeMap::new(),
            reserve_list: Vec::new(),
            pool_account,
            admins,
            liquidators: BTreeSet::new(),
            paused: false,
            clock,
            oracle,
            bank,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Administrative transitions
    // ------------------------------------------------------------------

    /// Bring a new reserve online. One-shot per asset.
    pub fn initialize_reserve(
        &mut self,
        caller: &AccountId,
        asset: AssetId,
        config: ReserveConfig,
        rate_model: RateModelHandle,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        if self.reserves.contains_key(&asset) {
            return Err(LendingError::AlreadyInitialized);
        }
        if self.reserve_list.len() >= MAX_RESERVES {
            return Err(LendingError::TooManyReserves);
        }

        let reserve = Reserve::new(InitReserveParams {
            asset,
            config,
            rate_model,
            current_timestamp: self.clock.now(),
        })?;
        self.events.push(LendingEvent::ReserveInitialized {
            asset,
            supply_claim: reserve.supply_claim.id,
            debt_claim: reserve.debt_claim.id,
        });
        self.reserves.insert(asset, reserve);
        self.reserve_list.push(asset);
        Ok(())
    }

    /// Block new deposits and borrows on a reserve. Withdrawals and
    /// repayments keep working.
    pub fn freeze_reserve(&mut self, caller: &AccountId, asset: &AssetId) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.is_frozen = true;
        self.events.push(LendingEvent::ReserveFrozen { asset: *asset });
        Ok(())
    }

    /// Lift a freeze.
    pub fn unfreeze_reserve(&mut self, caller: &AccountId, asset: &AssetId) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.is_frozen = false;
        self.events.push(LendingEvent::ReserveUnfrozen { asset: *asset });
        Ok(())
    }

    /// Refuse deposits, borrows, and liquidations pool-wide. Withdrawals
    /// and repayments keep working so users can always reduce risk.
    pub fn pause(&mut self, caller: &AccountId) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        self.paused = true;
        self.events.push(LendingEvent::Paused);
        Ok(())
    }

    /// Resume normal operation.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        self.paused = false;
        self.events.push(LendingEvent::Unpaused);
        Ok(())
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        match role {
            Role::Admin => self.admins.insert(account),
            Role::Liquidator => self.liquidators.insert(account),
        };
        Ok(())
    }

    /// Revoke `role` from `account`. Admin only.
    pub fn revoke_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        account: &AccountId,
    ) -> Result<(), LendingError> {
        self.ensure_admin(caller)?;
        match role {
            Role::Admin => self.admins.remove(account),
            Role::Liquidator => self.liquidators.remove(account),
        };
        Ok(())
    }

    /// Whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        match role {
            Role::Admin => self.admins.contains(account),
            Role::Liquidator => self.liquidators.contains(account),
        }
    }

    // ------------------------------------------------------------------
    // User operations
    // ------------------------------------------------------------------

    /// Supply `amount` of `asset` into the pool, crediting the supply claim
    /// to `on_behalf_of`. The underlying is pulled from `caller`.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        amount: u128,
        on_behalf_of: &AccountId,
    ) -> Result<(), LendingError> {
        debug!("deposit: asset={:?} amount={}", asset, amount);
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        self.ensure_not_paused()?;
        let reserve = self.active_reserve(asset)?;
        if reserve.is_frozen {
            return Err(LendingError::ReserveFrozen);
        }
        self.update_state(asset)?;

        let pool_account = self.pool_account;
        self.bank.transfer(asset, caller, &pool_account, amount)?;

        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let claim_minted = reserve.supply_claim_from_underlying(amount)?;
        reserve.supply_claim.mint(on_behalf_of, claim_minted)?;
        let claim = reserve.supply_claim.id;

        self.update_rates(asset)?;
        self.events.push(LendingEvent::ClaimMint {
            claim,
            user: *on_behalf_of,
            amount: claim_minted,
        });
        self.events.push(LendingEvent::Deposit {
            user: *on_behalf_of,
            asset: *asset,
            amount,
            claim_minted,
        });
        Ok(())
    }

    /// Redeem up to `amount` of `caller`'s supply claim in `asset`, pushing
    /// the underlying to `to`. Pass [`MAX_AMOUNT`] to redeem the full
    /// claim. Returns the amount actually withdrawn.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        amount: u128,
        to: &AccountId,
    ) -> Result<u128, LendingError> {
        debug!("withdraw: asset={:?} amount={}", asset, amount);
        self.active_reserve(asset)?;
        self.update_state(asset)?;

        let reserve = self
            .reserves
            .get(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let user_scaled = reserve.supply_claim.balance_of(caller);
        let user_underlying = reserve.supply_balance_of(caller)?;
        let actual_amount = if amount == MAX_AMOUNT {
            user_underlying
        } else {
            amount.min(user_underlying)
        };
        if actual_amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        let cash = self.cash(asset);
        if actual_amount > cash {
            debug!("withdraw amount exceeds reserve cash on hand");
            return Err(LendingError::InsufficientLiquidity);
        }
        let claim_burned = if actual_amount == user_underlying {
            user_scaled
        } else {
            reserve
                .supply_claim_from_underlying_ceil(actual_amount)?
                .min(user_scaled)
        };
        let threshold = Rate::from_bps(reserve.config.liquidation_threshold_bps);

        // the remaining collateral must keep the account solvent
        let aggregates = self.aggregate(caller)?;
        if aggregates.debt_value > Decimal::zero() {
            let price = self.oracle.get_asset_price(asset)?;
            let removed_value = Decimal::from(actual_amount)
                .try_mul(price)?
                .try_mul(threshold)?;
            let remaining_value = aggregates
                .weighted_collateral_value
                .saturating_sub(removed_value);
            if health_factor(remaining_value, aggregates.debt_value)? < hf_liquidation_threshold() {
                debug!("withdraw would leave the account undercollateralized");
                return Err(LendingError::WithdrawTooLarge);
            }
        }

        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.supply_claim.burn(caller, claim_burned)?;
        let claim = reserve.supply_claim.id;
        let pool_account = self.pool_account;
        self.bank.transfer(asset, &pool_account, to, actual_amount)?;

        self.update_rates(asset)?;
        self.events.push(LendingEvent::ClaimBurn {
            claim,
            user: *caller,
            amount: claim_burned,
        });
        self.events.push(LendingEvent::Withdraw {
            user: *caller,
            asset: *asset,
            amount: actual_amount,
        });
        Ok(actual_amount)
    }

    /// Lend `amount` of `asset` to `caller`, charging the debt to
    /// `on_behalf_of`. The beneficiary's aggregated collateral must keep
    /// the position solvent after the new debt.
    pub fn borrow(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        amount: u128,
        on_behalf_of: &AccountId,
    ) -> Result<(), LendingError> {
        debug!("borrow: asset={:?} amount={}", asset, amount);
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        self.ensure_not_paused()?;
        let reserve = self.active_reserve(asset)?;
        if reserve.is_frozen {
            return Err(LendingError::ReserveFrozen);
        }
        self.update_state(asset)?;

        if amount > self.cash(asset) {
            debug!("borrow amount exceeds reserve cash on hand");
            return Err(LendingError::InsufficientLiquidity);
        }

        let aggregates = self.aggregate(on_behalf_of)?;
        let price = self.oracle.get_asset_price(asset)?;
        let new_debt_value = aggregates
            .debt_value
            .try_add(Decimal::from(amount).try_mul(price)?)?;
        if health_factor(aggregates.weighted_collateral_value, new_debt_value)?
            < hf_liquidation_threshold()
        {
            debug!("borrow would leave the account undercollateralized");
            return Err(LendingError::BorrowTooLarge);
        }

        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let claim_minted = reserve.debt_claim_from_underlying_ceil(amount)?;
        reserve.debt_claim.mint(on_behalf_of, claim_minted)?;
        let claim = reserve.debt_claim.id;
        let pool_account = self.pool_account;
        self.bank.transfer(asset, &pool_account, caller, amount)?;

        self.update_rates(asset)?;
        self.events.push(LendingEvent::ClaimMint {
            claim,
            user: *on_behalf_of,
            amount: claim_minted,
        });
        self.events.push(LendingEvent::Borrow {
            user: *on_behalf_of,
            asset: *asset,
            amount,
        });
        Ok(())
    }

    /// Settle up to `amount` of `on_behalf_of`'s debt in `asset`, pulling
    /// the underlying from `caller`. Pass [`MAX_AMOUNT`] to settle the full
    /// debt. Returns the amount actually repaid.
    pub fn repay(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        amount: u128,
        on_behalf_of: &AccountId,
    ) -> Result<u128, LendingError> {
        debug!("repay: asset={:?} amount={}", asset, amount);
        self.active_reserve(asset)?;
        self.update_state(asset)?;

        let reserve = self
            .reserves
            .get(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let user_scaled = reserve.debt_claim.balance_of(on_behalf_of);
        let user_debt = reserve.debt_balance_of(on_behalf_of)?;
        let actual_amount = if amount == MAX_AMOUNT {
            user_debt
        } else {
            amount.min(user_debt)
        };
        if actual_amount == 0 {
            return Err(LendingError::RepayTooSmall);
        }
        let claim_burned = if actual_amount == user_debt {
            user_scaled
        } else {
            reserve
                .debt_claim_from_underlying(actual_amount)?
                .min(user_scaled)
        };

        let pool_account = self.pool_account;
        self.bank.transfer(asset, caller, &pool_account, actual_amount)?;

        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.debt_claim.burn(on_behalf_of, claim_burned)?;
        let claim = reserve.debt_claim.id;

        self.update_rates(asset)?;
        self.events.push(LendingEvent::ClaimBurn {
            claim,
            user: *on_behalf_of,
            amount: claim_burned,
        });
        self.events.push(LendingEvent::Repay {
            user: *on_behalf_of,
            asset: *asset,
            amount: actual_amount,
        });
        Ok(actual_amount)
    }

    /// Cover part of an unhealthy borrower's debt in exchange for a
    /// discounted share of their collateral. A single call may cover at
    /// most half the outstanding debt; the seized collateral is the covered
    /// value marked up by the reserve's liquidation bonus.
    pub fn liquidate(
        &mut self,
        caller: &AccountId,
        collateral_asset: &AssetId,
        debt_asset: &AssetId,
        borrower: &AccountId,
        debt_to_cover: u128,
    ) -> Result<(), LendingError> {
        debug!(
            "liquidate: collateral={:?} debt={:?} cover={}",
            collateral_asset, debt_asset, debt_to_cover
        );
        if collateral_asset == debt_asset {
            return Err(LendingError::SameAssetLiquidation);
        }
        if debt_to_cover == 0 {
            return Err(LendingError::InvalidAmount);
        }
        self.ensure_not_paused()?;
        self.active_reserve(collateral_asset)?;
        self.active_reserve(debt_asset)?;

        if self.aggregate(borrower)?.health_factor()? >= hf_liquidation_threshold() {
            return Err(LendingError::PositionHealthy);
        }

        self.update_state(debt_asset)?;
        self.update_state(collateral_asset)?;

        let debt_reserve = self
            .reserves
            .get(debt_asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let borrower_scaled_debt = debt_reserve.debt_claim.balance_of(borrower);
        let borrower_debt = debt_reserve.debt_balance_of(borrower)?;
        let max_cover = mul_bps(borrower_debt, CLOSE_FACTOR_BPS)?;
        let mut actual_cover = debt_to_cover.min(max_cover);
        if actual_cover == 0 {
            return Err(LendingError::LiquidationTooSmall);
        }

        let collateral_reserve = self
            .reserves
            .get(collateral_asset)
            .ok_or(LendingError::ReserveNotFound)?;
        let debt_price = self.oracle.get_asset_price(debt_asset)?;
        let collateral_price = self.oracle.get_asset_price(collateral_asset)?;
        let bonus_rate = Rate::from_bps(
            MAX_BPS
                .checked_add(collateral_reserve.config.liquidation_bonus_bps)
                .ok_or(LendingError::MathOverflow)?,
        );
        let mut collateral_to_seize = Decimal::from(actual_cover)
            .try_mul(debt_price)?
            .try_div(collateral_price)?
            .try_mul(bonus_rate)?
            .try_floor_u128()?;

        let borrower_supply = collateral_reserve.supply_balance_of(borrower)?;
        if collateral_to_seize > borrower_supply {
            // seize what exists and shrink the covered debt in proportion
            actual_cover = mul_div(actual_cover, borrower_supply, collateral_to_seize)?;
            collateral_to_seize = borrower_supply;
            warn!(
                "liquidation clamped to borrower collateral: cover={} seize={}",
                actual_cover, collateral_to_seize
            );
        }
        if actual_cover == 0 || collateral_to_seize == 0 {
            return Err(LendingError::LiquidationTooSmall);
        }

        let debt_claim_burned = if actual_cover == borrower_debt {
            borrower_scaled_debt
        } else {
            debt_reserve
                .debt_claim_from_underlying(actual_cover)?
                .min(borrower_scaled_debt)
        };
        let supply_claim_moved = collateral_reserve
            .supply_claim_from_underlying(collateral_to_seize)?
            .min(collateral_reserve.supply_claim.balance_of(borrower));

        let pool_account = self.pool_account;
        self.bank
            .transfer(debt_asset, caller, &pool_account, actual_cover)?;

        let debt_reserve = self
            .reserves
            .get_mut(debt_asset)
            .ok_or(LendingError::ReserveNotFound)?;
        debt_reserve.debt_claim.burn(borrower, debt_claim_burned)?;
        let debt_claim = debt_reserve.debt_claim.id;

        let collateral_reserve = self
            .reserves
            .get_mut(collateral_asset)
            .ok_or(LendingError::ReserveNotFound)?;
        collateral_reserve
            .supply_claim
            .transfer_on_liquidation(borrower, caller, supply_claim_moved)?;
        let supply_claim = collateral_reserve.supply_claim.id;

        self.update_rates(debt_asset)?;
        self.update_rates(collateral_asset)?;
        self.events.push(LendingEvent::ClaimBurn {
            claim: debt_claim,
            user: *borrower,
            amount: debt_claim_burned,
        });
        self.events.push(LendingEvent::TransferOnLiquidation {
            claim: supply_claim,
            from: *borrower,
            to: *caller,
            amount: supply_claim_moved,
        });
        self.events.push(LendingEvent::Liquidation {
            liquidator: *caller,
            borrower: *borrower,
            collateral_asset: *collateral_asset,
            debt_asset: *debt_asset,
            debt_covered: actual_cover,
            collateral_seized: collateral_to_seize,
        });
        Ok(())
    }

    /// Accrue a reserve's indices up to the current timestamp and refresh
    /// its rates. Any user operation does this implicitly on the reserves
    /// it touches; this entry point exists for keepers and monitoring.
    pub fn refresh_reserve(&mut self, asset: &AssetId) -> Result<(), LendingError> {
        self.active_reserve(asset)?;
        self.update_state(asset)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Aggregated risk summary of `user` across every reserve
    pub fn user_account_data(&self, user: &AccountId) -> Result<UserAccountData, LendingError> {
        self.aggregate(user)?.into_account_data()
    }

    /// Health factor of `user`; saturates at the maximum when debt-free
    pub fn health_factor(&self, user: &AccountId) -> Result<Decimal, LendingError> {
        self.aggregate(user)?.health_factor()
    }

    /// Reserve state for `asset`, if one exists
    pub fn reserve(&self, asset: &AssetId) -> Option<&Reserve> {
        self.reserves.get(asset)
    }

    /// Assets with initialized reserves, in initialization order
    pub fn reserve_assets(&self) -> &[AssetId] {
        &self.reserve_list
    }

    /// Account holding pool custody of the underlying assets
    pub fn pool_account(&self) -> &AccountId {
        &self.pool_account
    }

    /// Whether the pool is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Take every event record emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<LendingEvent> {
        std::mem::take(&mut self.events)
    }

    /// Injected price oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable access to the injected oracle, for its own administration
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Injected token bank
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable access to the injected token bank
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_admin(&self, caller: &AccountId) -> Result<(), LendingError> {
        if !self.admins.contains(caller) {
            return Err(LendingError::Unauthorized);
        }
        Ok(())
    }

    fn ensure_not_paused(&self) -> Result<(), LendingError> {
        if self.paused {
            return Err(LendingError::PoolPaused);
        }
        Ok(())
    }

    fn active_reserve(&self, asset: &AssetId) -> Result<&Reserve, LendingError> {
        let reserve = self
            .reserves
            .get(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        if !reserve.is_active {
            return Err(LendingError::ReserveNotActive);
        }
        Ok(reserve)
    }

    fn cash(&self, asset: &AssetId) -> u128 {
        self.bank.balance_of(asset, &self.pool_account)
    }

    fn update_state(&mut self, asset: &AssetId) -> Result<(), LendingError> {
        let cash = self.cash(asset);
        let now = self.clock.now();
        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.accrue_interest(now, cash)
    }

    // rates accrue over whole intervals, so after an operation moves
    // balances the stored rates are re-derived from the new totals
    fn update_rates(&mut self, asset: &AssetId) -> Result<(), LendingError> {
        let cash = self.cash(asset);
        let reserve = self
            .reserves
            .get_mut(asset)
            .ok_or(LendingError::ReserveNotFound)?;
        reserve.refresh_rates(cash)
    }

    /// Walk the reserve list valuing `user`'s claims. Reserves where the
    /// user holds neither supply nor debt are skipped, so a stale feed for
    /// an asset the user never touched cannot block them; a missing price
    /// for any touched reserve fails the whole aggregation.
    fn aggregate(&self, user: &AccountId) -> Result<AccountAggregates, LendingError> {
        let mut aggregates = AccountAggregates::default();
        for asset in &self.reserve_list {
            let reserve = self
                .reserves
                .get(asset)
                .ok_or(LendingError::ReserveNotFound)?;
            let supply_scaled = reserve.supply_claim.balance_of(user);
            let debt_scaled = reserve.debt_claim.balance_of(user);
            if supply_scaled == 0 && debt_scaled == 0 {
                continue;
            }
            let price = self.oracle.get_asset_price(asset)?;
            if supply_scaled > 0 {
                let value = Decimal::from(reserve.supply_balance_of(user)?).try_mul(price)?;
                aggregates.collateral_value = aggregates.collateral_value.try_add(value)?;
                aggregates.weighted_collateral_value = aggregates
                    .weighted_collateral_value
                    .try_add(value.try_mul(Rate::from_bps(reserve.config.liquidation_threshold_bps))?)?;
                aggregates.ltv_weighted_value = aggregates
                    .ltv_weighted_value
                    .try_add(value.try_mul(Rate::from_bps(reserve.config.ltv_bps))?)?;
            }
            if debt_scaled > 0 {
                let value = Decimal::from(reserve.debt_balance_of(user)?).try_mul(price)?;
                aggregates.debt_value = aggregates.debt_value.try_add(value)?;
            }
        }
        Ok(aggregates)
    }
}

// 1.0 in WAD; positions at or above it cannot be liquidated
fn hf_liquidation_threshold() -> Decimal {
    Decimal::from_scaled_val(HEALTH_FACTOR_LIQUIDATION_THRESHOLD)
}

/// `amount * bps / 10_000`, truncating
fn mul_bps(amount: u128, bps: u64) -> Result<u128, LendingError> {
    mul_div(amount, bps as u128, MAX_BPS as u128)
}

/// `amount * numerator / denominator`, truncating
fn mul_div(amount: u128, numerator: u128, denominator: u128) -> Result<u128, LendingError> {
    if denominator == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let result = U256::from(amount)
        .checked_mul(U256::from(numerator))
        .ok_or(LendingError::MathOverflow)?
        .checked_div(U256::from(denominator))
        .ok_or(LendingError::MathOverflow)?;
    u128::try_from(result).map_err(|_| LendingError::MathOverflow)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        clock::ManualClock,
        constants::{MAX_AMOUNT, SECONDS_PER_YEAR},
        math::WAD,
        oracle::PriceFeedOracle,
        rate_model::DualSlopeRateModel,
        token::InMemoryTokenBank,
    };
    use std::sync::{Arc, Mutex};

    const START: u64 = 1_700_000_000;
    const FUNDS: u128 = 1_000_000;

    fn admin() -> AccountId {
        AccountId::from_byte(0xAA)
    }
    fn custody() -> AccountId {
        AccountId::from_byte(0xFF)
    }
    fn user1() -> AccountId {
        AccountId::from_byte(1)
    }
    fn user2() -> AccountId {
        AccountId::from_byte(2)
    }
    fn liquidator() -> AccountId {
        AccountId::from_byte(9)
    }
    fn asset_d() -> AssetId {
        AssetId::from_byte(0xD0)
    }
    fn asset_e() -> AssetId {
        AssetId::from_byte(0xE0)
    }

    // base 2%, slope1 4%, slope2 75%, optimal utilization 80%
    fn rate_model() -> RateModelHandle {
        Arc::new(
            DualSlopeRateModel::new(
                Rate::from_percent(2),
                Rate::from_percent(4),
                Rate::from_percent(75),
                Rate::from_percent(80),
            )
            .unwrap(),
        )
    }

    // LTV 75%, threshold 80%, bonus 5%
    fn config() -> ReserveConfig {
        ReserveConfig {
            ltv_bps: 7_500,
            liquidation_threshold_bps: 8_000,
            liquidation_bonus_bps: 500,
        }
    }

    type TestPool = LendingPool<Arc<ManualClock>, PriceFeedOracle, InMemoryTokenBank>;

    fn setup_single() -> (TestPool, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let mut oracle = PriceFeedOracle::new(admin());
        oracle
            .set_price(&admin(), asset_d(), Decimal::one())
            .unwrap();
        let mut bank = InMemoryTokenBank::new();
        for holder in [user1(), user2(), liquidator()] {
            bank.mint(&asset_d(), &holder, FUNDS).unwrap();
        }
        let mut pool = LendingPool::new(admin(), custody(), Arc::clone(&clock), oracle, bank);
        pool.initialize_reserve(&admin(), asset_d(), config(), rate_model())
            .unwrap();
        pool.drain_events();
        (pool, clock)
    }

    fn setup_two_assets() -> (TestPool, Arc<ManualClock>) {
        let (mut pool, clock) = setup_single();
        pool.oracle_mut()
            .set_price(&admin(), asset_e(), Decimal::one())
            .unwrap();
        for holder in [user1(), user2(), liquidator()] {
            pool.bank_mut().mint(&asset_e(), &holder, FUNDS).unwrap();
        }
        pool.initialize_reserve(&admin(), asset_e(), config(), rate_model())
            .unwrap();
        pool.drain_events();
        (pool, clock)
    }

    // user1 holds 1,000 D as collateral against 700 E of debt
    fn setup_cross_position() -> (TestPool, Arc<ManualClock>) {
        let (mut pool, clock) = setup_two_assets();
        pool.deposit(&user2(), &asset_e(), 10_000, &user2()).unwrap();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_e(), 700, &user1()).unwrap();
        pool.drain_events();
        (pool, clock)
    }

    fn set_price_d(pool: &mut TestPool, wad_scaled: u128) {
        pool.oracle_mut()
            .set_price(&admin(), asset_d(), Decimal::from_scaled_val(wad_scaled))
            .unwrap();
    }

    fn pool_cash(pool: &TestPool, asset: &AssetId) -> u128 {
        pool.bank().balance_of(asset, pool.pool_account())
    }

    fn assert_reserve_solvent(pool: &TestPool, asset: &AssetId) {
        let reserve = pool.reserve(asset).unwrap();
        let cash = pool_cash(pool, asset);
        assert!(
            cash + reserve.total_debt().unwrap() >= reserve.total_supply_underlying().unwrap(),
            "reserve over-committed: cash={} debt={} supply={}",
            cash,
            reserve.total_debt().unwrap(),
            reserve.total_supply_underlying().unwrap(),
        );
    }

    fn hf_wad(numerator: u128, denominator: u128) -> Decimal {
        Decimal::from(numerator)
            .try_div(Decimal::from(denominator))
            .unwrap()
    }

    #[test]
    fn deposit_credits_scaled_claim() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();

        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.supply_claim.balance_of(&user1()), 1_000);
        assert_eq!(pool_cash(&pool, &asset_d()), 1_000);
        assert_eq!(pool.health_factor(&user1()).unwrap(), Decimal::max());
        assert_reserve_solvent(&pool, &asset_d());

        let supply_claim = reserve.supply_claim.id;
        assert_eq!(
            pool.drain_events(),
            vec![
                LendingEvent::ClaimMint {
                    claim: supply_claim,
                    user: user1(),
                    amount: 1_000,
                },
                LendingEvent::Deposit {
                    user: user1(),
                    asset: asset_d(),
                    amount: 1_000,
                    claim_minted: 1_000,
                },
            ],
        );
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let (mut pool, _clock) = setup_single();
        assert_eq!(
            pool.deposit(&user1(), &asset_d(), 0, &user1()).unwrap_err(),
            LendingError::InvalidAmount
        );
        assert_eq!(
            pool.borrow(&user1(), &asset_d(), 0, &user1()).unwrap_err(),
            LendingError::InvalidAmount
        );
        assert_eq!(
            pool.withdraw(&user1(), &asset_d(), 0, &user1()).unwrap_err(),
            LendingError::InvalidAmount
        );
    }

    #[test]
    fn unknown_asset_is_rejected() {
        let (mut pool, _clock) = setup_single();
        assert_eq!(
            pool.deposit(&user1(), &asset_e(), 10, &user1()).unwrap_err(),
            LendingError::ReserveNotFound
        );
    }

    #[test]
    fn borrow_against_collateral() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.debt_claim.balance_of(&user1()), 700);
        assert_eq!(pool_cash(&pool, &asset_d()), 300);
        assert_eq!(
            pool.bank().balance_of(&asset_d(), &user1()),
            FUNDS - 1_000 + 700
        );
        // 1,000 * 0.8 collateral against 700 debt
        assert_eq!(pool.health_factor(&user1()).unwrap(), hf_wad(800, 700));
        assert_reserve_solvent(&pool, &asset_d());
    }

    #[test]
    fn borrow_beyond_threshold_is_rejected() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        assert_eq!(
            pool.borrow(&user1(), &asset_d(), 200, &user1()).unwrap_err(),
            LendingError::BorrowTooLarge
        );
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.debt_claim.balance_of(&user1()), 700);
    }

    #[test]
    fn borrow_needs_cash_on_hand() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        assert_eq!(
            pool.borrow(&user1(), &asset_d(), 2_000, &user1()).unwrap_err(),
            LendingError::InsufficientLiquidity
        );
    }

    #[test]
    fn borrow_on_behalf_delivers_cash_to_caller() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user2(), &asset_d(), 500, &user1()).unwrap();

        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.debt_claim.balance_of(&user1()), 500);
        assert_eq!(reserve.debt_claim.balance_of(&user2()), 0);
        assert_eq!(pool.bank().balance_of(&asset_d(), &user2()), FUNDS + 500);
    }

    #[test]
    fn same_asset_price_drop_keeps_health_factor() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();
        let before = pool.health_factor(&user1()).unwrap();

        set_price_d(&mut pool, WAD / 2);
        // collateral and debt scale together
        assert_eq!(pool.health_factor(&user1()).unwrap(), before);
    }

    #[test]
    fn withdraw_max_redeems_the_full_claim() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();

        let withdrawn = pool
            .withdraw(&user1(), &asset_d(), MAX_AMOUNT, &user1())
            .unwrap();
        assert_eq!(withdrawn, 1_000);
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.supply_claim.balance_of(&user1()), 0);
        assert_eq!(pool.bank().balance_of(&asset_d(), &user1()), FUNDS);
    }

    #[test]
    fn withdraw_clamps_to_the_claim() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        let withdrawn = pool
            .withdraw(&user1(), &asset_d(), 5_000, &user1())
            .unwrap();
        assert_eq!(withdrawn, 1_000);
    }

    #[test]
    fn withdraw_keeps_the_account_solvent() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        // 0.8 * (1,000 - x) >= 700 caps x at 125
        assert_eq!(
            pool.withdraw(&user1(), &asset_d(), 200, &user1()).unwrap_err(),
            LendingError::WithdrawTooLarge
        );
        assert_eq!(pool.withdraw(&user1(), &asset_d(), 100, &user1()).unwrap(), 100);
        assert!(pool.health_factor(&user1()).unwrap() >= Decimal::one());
    }

    #[test]
    fn repay_max_settles_the_full_debt() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        let repaid = pool
            .repay(&user1(), &asset_d(), MAX_AMOUNT, &user1())
            .unwrap();
        assert_eq!(repaid, 700);
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.debt_claim.balance_of(&user1()), 0);
        assert_eq!(pool_cash(&pool, &asset_d()), 1_000);
        assert_eq!(pool.health_factor(&user1()).unwrap(), Decimal::max());
    }

    #[test]
    fn repay_can_be_partial() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        assert_eq!(pool.repay(&user1(), &asset_d(), 300, &user1()).unwrap(), 300);
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.debt_balance_of(&user1()).unwrap(), 400);
    }

    #[test]
    fn repay_without_debt_is_rejected() {
        let (mut pool, _clock) = setup_single();
        assert_eq!(
            pool.repay(&user2(), &asset_d(), 100, &user2()).unwrap_err(),
            LendingError::RepayTooSmall
        );
    }

    #[test]
    fn liquidation_requires_an_unhealthy_position() {
        let (mut pool, _clock) = setup_cross_position();
        assert_eq!(
            pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 350)
                .unwrap_err(),
            LendingError::PositionHealthy
        );
    }

    #[test]
    fn liquidation_rejects_identical_assets() {
        let (mut pool, _clock) = setup_cross_position();
        assert_eq!(
            pool.liquidate(&liquidator(), &asset_d(), &asset_d(), &user1(), 350)
                .unwrap_err(),
            LendingError::SameAssetLiquidation
        );
    }

    #[test]
    fn liquidation_seizes_discounted_collateral() {
        let (mut pool, _clock) = setup_cross_position();
        // collateral halves: 1,000 * 0.5 * 0.8 = 400 against 700 debt
        set_price_d(&mut pool, WAD / 2);
        assert!(pool.health_factor(&user1()).unwrap() < Decimal::one());

        pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 350)
            .unwrap();

        // $350 of debt buys 700 D at $0.5, plus the 5% bonus
        let d_reserve = pool.reserve(&asset_d()).unwrap();
        let e_reserve = pool.reserve(&asset_e()).unwrap();
        assert_eq!(d_reserve.supply_claim.balance_of(&user1()), 265);
        assert_eq!(d_reserve.supply_claim.balance_of(&liquidator()), 735);
        assert_eq!(e_reserve.debt_claim.balance_of(&user1()), 350);
        assert_eq!(
            pool.bank().balance_of(&asset_e(), &liquidator()),
            FUNDS - 350
        );

        let events = pool.drain_events();
        assert_eq!(
            events.last().unwrap(),
            &LendingEvent::Liquidation {
                liquidator: liquidator(),
                borrower: user1(),
                collateral_asset: asset_d(),
                debt_asset: asset_e(),
                debt_covered: 350,
                collateral_seized: 735,
            },
        );
        assert_reserve_solvent(&pool, &asset_d());
        assert_reserve_solvent(&pool, &asset_e());
    }

    #[test]
    fn liquidation_cover_is_capped_at_half_the_debt() {
        let (mut pool, _clock) = setup_cross_position();
        set_price_d(&mut pool, WAD / 2);

        pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), MAX_AMOUNT)
            .unwrap();
        let e_reserve = pool.reserve(&asset_e()).unwrap();
        assert_eq!(e_reserve.debt_claim.balance_of(&user1()), 350);
    }

    #[test]
    fn liquidation_clamps_to_available_collateral() {
        let (mut pool, _clock) = setup_cross_position();
        // crash far past the point where the bonus would over-seize
        set_price_d(&mut pool, WAD / 10);

        pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 350)
            .unwrap();

        // full 1,000 D seized; cover shrinks from 350 to 350*1000/3675
        let d_reserve = pool.reserve(&asset_d()).unwrap();
        let e_reserve = pool.reserve(&asset_e()).unwrap();
        assert_eq!(d_reserve.supply_claim.balance_of(&user1()), 0);
        assert_eq!(d_reserve.supply_claim.balance_of(&liquidator()), 1_000);
        assert_eq!(e_reserve.debt_claim.balance_of(&user1()), 700 - 95);
        assert_eq!(
            pool.bank().balance_of(&asset_e(), &liquidator()),
            FUNDS - 95
        );
    }

    #[test]
    fn liquidation_improves_health_near_the_threshold() {
        let (mut pool, _clock) = setup_cross_position();
        // HF = 0.857, above threshold * (1 + bonus) = 0.84, so a
        // liquidation must not make the position worse
        set_price_d(&mut pool, 3 * WAD / 4);
        let before = pool.health_factor(&user1()).unwrap();
        assert!(before < Decimal::one());

        pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 350)
            .unwrap();
        let after = pool.health_factor(&user1()).unwrap();
        assert!(after >= before, "health factor fell from {} to {}", before, after);
    }

    #[test]
    fn frozen_reserve_blocks_new_exposure_only() {
        let (mut pool, _clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 500, &user1()).unwrap();

        pool.freeze_reserve(&admin(), &asset_d()).unwrap();
        assert_eq!(
            pool.deposit(&user1(), &asset_d(), 10, &user1()).unwrap_err(),
            LendingError::ReserveFrozen
        );
        assert_eq!(
            pool.borrow(&user1(), &asset_d(), 10, &user1()).unwrap_err(),
            LendingError::ReserveFrozen
        );
        // exits still work
        assert_eq!(pool.repay(&user1(), &asset_d(), 100, &user1()).unwrap(), 100);
        assert_eq!(pool.withdraw(&user1(), &asset_d(), 50, &user1()).unwrap(), 50);

        pool.unfreeze_reserve(&admin(), &asset_d()).unwrap();
        pool.deposit(&user1(), &asset_d(), 10, &user1()).unwrap();
    }

    #[test]
    fn paused_pool_blocks_risky_operations_only() {
        let (mut pool, _clock) = setup_cross_position();
        set_price_d(&mut pool, WAD / 2);
        pool.pause(&admin()).unwrap();

        assert_eq!(
            pool.deposit(&user1(), &asset_d(), 10, &user1()).unwrap_err(),
            LendingError::PoolPaused
        );
        assert_eq!(
            pool.borrow(&user1(), &asset_e(), 10, &user1()).unwrap_err(),
            LendingError::PoolPaused
        );
        assert_eq!(
            pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 350)
                .unwrap_err(),
            LendingError::PoolPaused
        );
        // risk can still be reduced
        assert_eq!(pool.repay(&user1(), &asset_e(), 100, &user1()).unwrap(), 100);
        assert_eq!(pool.withdraw(&user2(), &asset_e(), 50, &user2()).unwrap(), 50);

        pool.unpause(&admin()).unwrap();
        pool.deposit(&user1(), &asset_d(), 10, &user1()).unwrap();
    }

    #[test]
    fn admin_transitions_are_gated() {
        let (mut pool, _clock) = setup_single();
        assert_eq!(
            pool.initialize_reserve(&user1(), asset_e(), config(), rate_model())
                .unwrap_err(),
            LendingError::Unauthorized
        );
        assert_eq!(
            pool.freeze_reserve(&user1(), &asset_d()).unwrap_err(),
            LendingError::Unauthorized
        );
        assert_eq!(pool.pause(&user1()).unwrap_err(), LendingError::Unauthorized);

        pool.grant_role(&admin(), Role::Admin, user2()).unwrap();
        assert!(pool.has_role(Role::Admin, &user2()));
        pool.pause(&user2()).unwrap();
        pool.unpause(&user2()).unwrap();

        pool.revoke_role(&admin(), Role::Admin, &user2()).unwrap();
        assert_eq!(pool.pause(&user2()).unwrap_err(), LendingError::Unauthorized);
    }

    #[test]
    fn liquidator_role_is_not_required() {
        let (mut pool, _clock) = setup_cross_position();
        set_price_d(&mut pool, WAD / 2);
        assert!(!pool.has_role(Role::Liquidator, &liquidator()));
        pool.liquidate(&liquidator(), &asset_d(), &asset_e(), &user1(), 100)
            .unwrap();
    }

    #[test]
    fn reserve_cannot_be_initialized_twice() {
        let (mut pool, _clock) = setup_single();
        assert_eq!(
            pool.initialize_reserve(&admin(), asset_d(), config(), rate_model())
                .unwrap_err(),
            LendingError::AlreadyInitialized
        );
    }

    #[test]
    fn missing_price_only_blocks_touched_reserves() {
        let (mut pool, _clock) = setup_two_assets();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();

        // user1 never touched E, so E's feed does not matter to them
        pool.oracle_mut().unset_price(&admin(), &asset_e()).unwrap();
        pool.borrow(&user1(), &asset_d(), 100, &user1()).unwrap();

        pool.oracle_mut().unset_price(&admin(), &asset_d()).unwrap();
        assert_eq!(
            pool.borrow(&user1(), &asset_d(), 100, &user1()).unwrap_err(),
            LendingError::PriceUnavailable
        );
    }

    #[test]
    fn refresh_is_idempotent_within_a_timestamp() {
        let (mut pool, clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        clock.advance(3_600);
        pool.refresh_reserve(&asset_d()).unwrap();
        let reserve = pool.reserve(&asset_d()).unwrap();
        let snapshot = (
            reserve.liquidity_index,
            reserve.variable_borrow_index,
            reserve.current_liquidity_rate,
            reserve.current_borrow_rate,
            reserve.last_update_timestamp,
        );

        pool.refresh_reserve(&asset_d()).unwrap();
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(
            snapshot,
            (
                reserve.liquidity_index,
                reserve.variable_borrow_index,
                reserve.current_liquidity_rate,
                reserve.current_borrow_rate,
                reserve.last_update_timestamp,
            ),
        );
    }

    #[test]
    fn interest_flows_from_borrowers_to_suppliers() {
        let (mut pool, clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();

        // borrow an hour later; utilization lands at 70%, pricing the debt
        // at 5.5% and the supply side at 3.85%
        clock.advance(3_600);
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        clock.advance(SECONDS_PER_YEAR);
        let repaid = pool
            .repay(&user1(), &asset_d(), MAX_AMOUNT, &user1())
            .unwrap();
        // 700 * (1 + 5.5%), truncated
        assert_eq!(repaid, 738);

        let reserve = pool.reserve(&asset_d()).unwrap();
        assert!(reserve.variable_borrow_index > Rate::one());
        assert!(reserve.liquidity_index > Rate::one());
        assert_reserve_solvent(&pool, &asset_d());

        // the supplier's claim grew by the year of liquidity yield
        let withdrawn = pool
            .withdraw(&user1(), &asset_d(), MAX_AMOUNT, &user1())
            .unwrap();
        assert_eq!(withdrawn, 1_038);
        assert_eq!(pool_cash(&pool, &asset_d()), 0);
        assert_eq!(pool.bank().balance_of(&asset_d(), &user1()), FUNDS);
    }

    #[test]
    fn deposit_after_accrual_mints_fewer_scaled_units() {
        let (mut pool, clock) = setup_single();
        pool.deposit(&user1(), &asset_d(), 1_000, &user1()).unwrap();
        pool.borrow(&user1(), &asset_d(), 700, &user1()).unwrap();

        clock.advance(SECONDS_PER_YEAR);
        pool.deposit(&user2(), &asset_d(), 1_000, &user2()).unwrap();

        let reserve = pool.reserve(&asset_d()).unwrap();
        let scaled = reserve.supply_claim.balance_of(&user2());
        assert!(scaled < 1_000);
        // and the claim still redeems to within a unit of the deposit
        let underlying = reserve.supply_balance_of(&user2()).unwrap();
        assert!(underlying >= 999 && underlying <= 1_000);
    }

    #[test]
    fn a_mutex_serializes_shared_pool_access() {
        let (mut pool, _clock) = setup_single();
        for byte in 3..=6u8 {
            pool.bank_mut()
                .mint(&asset_d(), &AccountId::from_byte(byte), FUNDS)
                .unwrap();
        }
        let pool = Arc::new(Mutex::new(pool));

        let handles: Vec<_> = (3..=6u8)
            .map(|byte| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    let user = AccountId::from_byte(byte);
                    pool.lock()
                        .unwrap()
                        .deposit(&user, &asset_d(), 100, &user)
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pool = pool.lock().unwrap();
        let reserve = pool.reserve(&asset_d()).unwrap();
        assert_eq!(reserve.supply_claim.total_supply(), 400);
    }
}
