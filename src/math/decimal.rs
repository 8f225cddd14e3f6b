//! Math for preserving precision of USD valuations.
//!
//! Decimals are internally scaled by a WAD (10^18) to preserve precision up
//! to 18 decimal places. The underlying representation is a u256 so that any
//! u128 native-unit amount multiplied by a WAD price fits without overflow.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use crate::{
    error::LendingError,
    math::{common::*, Rate},
};
use borsh::io::{self, Read, Write};
use borsh::{BorshDeserialize, BorshSerialize};
use std::{convert::TryFrom, fmt};
use uint::construct_uint;

// U256 with 256 bits consisting of 4 x 64-bit words
construct_uint! {
    pub struct U256(4);
}

/// Large decimal values, precise to 18 digits
#[derive(Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Decimal(pub U256);

impl Decimal {
    /// One
    pub fn one() -> Self {
        Self(Self::wad())
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Largest representable value, used to saturate the health factor of
    /// debt-free accounts
    pub fn max() -> Self {
        Self(U256::max_value())
    }

    fn wad() -> U256 {
        U256::from(WAD)
    }

    fn half_wad() -> U256 {
        U256::from(HALF_WAD)
    }

    /// Create scaled decimal from a bps value
    pub fn from_bps(bps: u64) -> Result<Self, LendingError> {
        Self::from(bps as u128).try_div(10_000u128)
    }

    /// Return raw scaled value if it fits within u128
    #[allow(clippy::wrong_self_convention)]
    pub fn to_scaled_val(&self) -> Result<u128, LendingError> {
        u128::try_from(self.0).map_err(|_| LendingError::MathOverflow)
    }

    /// Create decimal from scaled value
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U256::from(scaled_val))
    }

    /// Round scaled decimal to u128
    pub fn try_round_u128(&self) -> Result<u128, LendingError> {
        let rounded_val = Self::half_wad()
            .checked_add(self.0)
            .ok_or(LendingError::MathOverflow)?
            .checked_div(Self::wad())
            .ok_or(LendingError::MathOverflow)?;
        u128::try_from(rounded_val).map_err(|_| LendingError::MathOverflow)
    }

    /// Floor scaled decimal to u128
    pub fn try_floor_u128(&self) -> Result<u128, LendingError> {
        let floor_val = self
            .0
            .checked_div(Self::wad())
            .ok_or(LendingError::MathOverflow)?;
        u128::try_from(floor_val).map_err(|_| LendingError::MathOverflow)
    }

    /// Ceiling scaled decimal to u128
    pub fn try_ceil_u128(&self) -> Result<u128, LendingError> {
        let ceil_val = Self::wad()
            .checked_sub(U256::from(1u64))
            .ok_or(LendingError::MathOverflow)?
            .checked_add(self.0)
            .ok_or(LendingError::MathOverflow)?
            .checked_div(Self::wad())
            .ok_or(LendingError::MathOverflow)?;
        u128::try_from(ceil_val).map_err(|_| LendingError::MathOverflow)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            scaled_val.insert_str(0, &vec!["0"; SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<u64> for Decimal {
    fn from(val: u64) -> Self {
        Self(Self::wad() * U256::from(val))
    }
}

impl From<u128> for Decimal {
    fn from(val: u128) -> Self {
        Self(Self::wad() * U256::from(val))
    }
}

impl From<Rate> for Decimal {
    fn from(val: Rate) -> Self {
        // RAY fraction rescaled down to WAD
        Self(val.0 / U256::from(WAD_RAY_RATIO))
    }
}

impl TryAdd for Decimal {
    fn try_add(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_add(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TrySub for Decimal {
    fn try_sub(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_sub(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl SaturatingSub for Decimal {
    fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl TryDiv<u128> for Decimal {
    fn try_div(self, rhs: u128) -> Result<Self, LendingError> {
        if rhs == 0 {
            return Err(LendingError::DivisionByZero);
        }
        Ok(Self(
            self.0
                .checked_div(U256::from(rhs))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryDiv<Decimal> for Decimal {
    fn try_div(self, rhs: Self) -> Result<Self, LendingError> {
        if rhs.0.is_zero() {
            return Err(LendingError::DivisionByZero);
        }
        Ok(Self(
            self.0
                .checked_mul(Self::wad())
                .ok_or(LendingError::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<u128> for Decimal {
    fn try_mul(self, rhs: u128) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(U256::from(rhs))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<Rate> for Decimal {
    fn try_mul(self, rhs: Rate) -> Result<Self, LendingError> {
        self.try_mul(Self::from(rhs))
    }
}

impl TryMul<Decimal> for Decimal {
    fn try_mul(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(LendingError::MathOverflow)?
                .checked_div(Self::wad())
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl BorshSerialize for Decimal {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // Serialize each of the four underlying u64 words in little-endian byte order
        for word in self.0 .0.iter() {
            writer.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }
}

impl BorshDeserialize for Decimal {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut words = [0u64; 4];
        for word in words.iter_mut() {
            let mut word_bytes = [0u8; 8];
            reader.read_exact(&mut word_bytes)?;
            *word = u64::from_le_bytes(word_bytes);
        }
        Ok(Decimal(U256(words)))
    }
}
