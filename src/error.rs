//! Error types

use num_derive::FromPrimitive;
use thiserror::Error;

/// Errors that may be returned by the lending pool.
///
/// Every failure aborts the current operation with no observable state
/// change; there is no retry and no local recovery.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum LendingError {
    // 0
    /// Math operation overflow
    #[error("Math operation overflow")]
    MathOverflow,
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
    /// Input amount is invalid
    #[error("Input amount is invalid")]
    InvalidAmount,
    /// Input config value is invalid
    #[error("Input config value is invalid")]
    InvalidConfig,
    /// Reserve is already initialized
    #[error("Reserve is already initialized")]
    AlreadyInitialized,

    // 5
    /// No reserve exists for the asset
    #[error("No reserve exists for the asset")]
    ReserveNotFound,
    /// Reserve is not active
    #[error("Reserve is not active")]
    ReserveNotActive,
    /// Reserve is frozen
    #[error("Reserve is frozen")]
    ReserveFrozen,
    /// Pool is paused
    #[error("Pool is paused")]
    PoolPaused,
    /// Reserve limit reached
    #[error("Reserve limit reached")]
    TooManyReserves,

    // 10
    /// Signer lacks the required role
    #[error("Signer lacks the required role")]
    Unauthorized,
    /// Insufficient liquidity available
    #[error("Insufficient liquidity available")]
    InsufficientLiquidity,
    /// Insufficient token balance
    #[error("Insufficient token balance")]
    InsufficientFunds,
    /// Withdraw amount too large for remaining collateral
    #[error("Withdraw amount too large for remaining collateral")]
    WithdrawTooLarge,
    /// Borrow amount too large for deposited collateral
    #[error("Borrow amount too large for deposited collateral")]
    BorrowTooLarge,

    // 15
    /// Repay amount too small to settle any debt
    #[error("Repay amount too small to settle any debt")]
    RepayTooSmall,
    /// Liquidation amount too small to seize collateral
    #[error("Liquidation amount too small to seize collateral")]
    LiquidationTooSmall,
    /// Cannot liquidate a healthy position
    #[error("Cannot liquidate a healthy position")]
    PositionHealthy,
    /// Collateral and debt assets must differ in a liquidation
    #[error("Collateral and debt assets must differ in a liquidation")]
    SameAssetLiquidation,
    /// Debt claims are not transferable
    #[error("Debt claims are not transferable")]
    DebtNotTransferable,

    // 20
    /// No price is available for the asset
    #[error("No price is available for the asset")]
    PriceUnavailable,
    /// Price must be strictly positive
    #[error("Price must be strictly positive")]
    InvalidPrice,
    /// Timestamp is earlier than the last recorded update
    #[error("Timestamp is earlier than the last recorded update")]
    InvalidTimestamp,
}
