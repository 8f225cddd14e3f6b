//! State records for the lending pool.

pub mod claim;
pub mod reserve;

pub use claim::*;
pub use reserve::*;

use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Opaque handle identifying a user account. Equality is decidable; no
/// further structure is assumed.
#[derive(
    BorshDeserialize, BorshSerialize, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Build an account id whose bytes are all `byte`; convenient for tests
    /// and fixtures
    pub fn from_byte(byte: u8) -> Self {
        Self([byte; 32])
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account:{}", hex_prefix(&self.0))
    }
}

/// Opaque handle identifying a fungible underlying asset.
#[derive(
    BorshDeserialize, BorshSerialize, Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct AssetId(pub [u8; 32]);

impl AssetId {
    /// Build an asset id whose bytes are all `byte`
    pub fn from_byte(byte: u8) -> Self {
        Self([byte; 32])
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", hex_prefix(&self.0))
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..4].iter().map(|b| format!("{:02x}", b)).collect()
}
