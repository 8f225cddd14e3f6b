//! Fixed-point math primitives for the lending pool.

pub mod common;
pub mod decimal;
pub mod rate;

pub use common::*;
pub use decimal::*;
pub use rate::*;
