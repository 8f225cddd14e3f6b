//! Price oracle consumed by the account aggregator.

use crate::{
    error::LendingError,
    math::Decimal,
    state::{AccountId, AssetId},
};
use std::collections::BTreeMap;

/// Maps an asset to its USD price in WAD units.
///
/// Prices are strictly positive; an unknown asset is an error, never zero.
pub trait PriceOracle {
    /// USD price of one whole unit of `asset`, WAD-scaled
    fn get_asset_price(&self, asset: &AssetId) -> Result<Decimal, LendingError>;
}

/// In-process price feed with an admin-gated price map and an optional
/// fallback oracle consulted when the map has no entry.
///
/// The fallback should itself be a terminal source (no further fallback) so
/// the resolution chain stays one hop deep.
pub struct PriceFeedOracle {
    admin: AccountId,
    prices: BTreeMap<AssetId, Decimal>,
    fallback: Option<Box<dyn PriceOracle + Send + Sync>>,
}

impl PriceFeedOracle {
    /// Create an empty feed administered by `admin`
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            prices: BTreeMap::new(),
            fallback: None,
        }
    }

    /// Attach a fallback oracle queried for assets missing from the map
    pub fn with_fallback(mut self, fallback: Box<dyn PriceOracle + Send + Sync>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Set the USD price of `asset`. Only the oracle admin may do this.
    pub fn set_price(
        &mut self,
        caller: &AccountId,
        asset: AssetId,
        price: Decimal,
    ) -> Result<(), LendingError> {
        if *caller != self.admin {
            return Err(LendingError::Unauthorized);
        }
        if price == Decimal::zero() {
            return Err(LendingError::InvalidPrice);
        }
        self.prices.insert(asset, price);
        Ok(())
    }

    /// Remove the price of `asset`, forcing fallback resolution
    pub fn unset_price(&mut self, caller: &AccountId, asset: &AssetId) -> Result<(), LendingError> {
        if *caller != self.admin {
            return Err(LendingError::Unauthorized);
        }
        self.prices.remove(asset);
        Ok(())
    }
}

impl PriceOracle for PriceFeedOracle {
    fn get_asset_price(&self, asset: &AssetId) -> Result<Decimal, LendingError> {
        if let Some(price) = self.prices.get(asset) {
            return Ok(*price);
        }
        match &self.fallback {
            Some(fallback) => fallback.get_asset_price(asset),
            None => Err(LendingError::PriceUnavailable),
        }
    }
}
