#![deny(missing_docs)]

//! A multi-asset over-collateralized lending engine.
//!
//! Users deposit fungible assets into per-asset reserves, earn a variable
//! yield funded by borrowers, borrow other assets against their deposits
//! subject to a loan-to-value limit, and repay debt. When a borrower's
//! aggregated collateral falls below a liquidation threshold, third
//! parties liquidate part of the position in exchange for discounted
//! collateral.
//!
//! The [`pool::LendingPool`] controller owns all reserve state. Everything
//! it does not own (the USD price feed, custody of the underlying assets,
//! the clock) is injected behind a narrow trait ([`oracle::PriceOracle`],
//! [`token::TokenBank`], [`clock::Clock`]), so hosts and tests swap
//! collaborators freely and nothing external can reach back into the
//! controller mid-operation.
//!
//! Interest accounting uses two fixed-point scales: WAD (10^18) for USD
//! values and the health factor, RAY (10^27) for rates and the interest
//! indices. Claim balances are stored scaled: a balance times the current
//! index recovers the underlying position, so interest accrues to every
//! holder by advancing a single per-reserve index.

pub mod account;
pub mod clock;
pub mod constants;
pub mod error;
pub mod events;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod rate_model;
pub mod state;
pub mod token;

pub use account::{AccountAggregates, UserAccountData};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LendingError;
pub use events::LendingEvent;
pub use math::{Decimal, Rate};
pub use oracle::{PriceFeedOracle, PriceOracle};
pub use pool::{LendingPool, Role};
pub use rate_model::{DualSlopeRateModel, InterestRateModel, InterestRates, RateModelHandle};
pub use state::{AccountId, AssetId, ClaimId, ClaimKind, Reserve, ReserveConfig};
pub use token::{InMemoryTokenBank, TokenBank};
