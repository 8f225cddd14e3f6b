//! Scalers and arithmetic traits shared by [`Decimal`](crate::math::Decimal)
//! and [`Rate`](crate::math::Rate).
//!
//! Two fixed-point scales are used throughout the pool: WAD (10^18) for USD
//! prices, USD valuations, and the health factor, and RAY (10^27) for
//! interest rates, interest indices, and utilization. Risk parameters are
//! configured in basis points and converted to RAY fractions on use.

use crate::error::LendingError;

/// Decimal places of WAD-scaled values
pub const SCALE: usize = 18;
/// Identity of WAD-scaled values
pub const WAD: u128 = 1_000_000_000_000_000_000;
/// Half of the WAD identity
pub const HALF_WAD: u128 = WAD / 2;

/// Decimal places of RAY-scaled values
pub const RAY_SCALE: usize = 27;
/// Identity of RAY-scaled values
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Ratio between the two identities (RAY / WAD)
pub const WAD_RAY_RATIO: u128 = RAY / WAD;

/// One percent as a RAY fraction
pub const PERCENT_SCALER: u128 = RAY / 100;
/// One basis point as a RAY fraction
pub const BPS_SCALER: u128 = RAY / 10_000;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, LendingError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, LendingError>;
}

/// Try to divide, return an error on overflow or divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, LendingError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, LendingError>;
}

/// Subtraction that clamps at zero instead of underflowing
pub trait SaturatingSub: Sized {
    /// Subtract, clamping at zero
    fn saturating_sub(self, rhs: Self) -> Self;
}
