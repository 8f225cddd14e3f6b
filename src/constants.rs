//! Protocol-level constants.

use crate::math::WAD;

/// Maximum number of reserves the pool will track; bounds the cost of
/// walking the reserve list in the account aggregator
pub const MAX_RESERVES: usize = 128;

/// Fraction of a borrower's debt a single liquidation call may cover, in bps
pub const CLOSE_FACTOR_BPS: u64 = 5_000;

/// Denominator for bps-valued risk parameters
pub const MAX_BPS: u64 = 10_000;

/// Number of seconds in a year, used to convert annual rates to per-second
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Health factor below which a position becomes liquidatable (WAD-scaled)
pub const HEALTH_FACTOR_LIQUIDATION_THRESHOLD: u128 = WAD;

/// Sentinel amount meaning "my full balance" on withdraw and repay
pub const MAX_AMOUNT: u128 = u128::MAX;
