//! Interest rates, interest indices, and utilization, scaled by RAY (10^27).
//!
//! Indices start at [`Rate::one`] and only ever grow; a scaled claim balance
//! times the current index recovers the underlying position.

use crate::{
    error::LendingError,
    math::{common::*, decimal::U256, Decimal},
};
use borsh::io::{self, Read, Write};
use borsh::{BorshDeserialize, BorshSerialize};
use std::{convert::TryFrom, fmt};

/// RAY-scaled fraction, rate, or index
#[derive(Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Rate(pub U256);

impl Rate {
    /// One (100%, or the initial index)
    pub fn one() -> Self {
        Self(Self::ray())
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn ray() -> U256 {
        U256::from(RAY)
    }

    /// Create rate from a percent value
    pub fn from_percent(percent: u8) -> Self {
        Self(U256::from(percent as u128 * PERCENT_SCALER))
    }

    /// Create rate from a bps value
    pub fn from_bps(bps: u64) -> Self {
        Self(U256::from(bps as u128 * BPS_SCALER))
    }

    /// Return raw scaled value if it fits within u128
    #[allow(clippy::wrong_self_convention)]
    pub fn to_scaled_val(&self) -> Result<u128, LendingError> {
        u128::try_from(self.0).map_err(|_| LendingError::MathOverflow)
    }

    /// Create rate from a raw scaled value
    pub fn from_scaled_val(scaled_val: u128) -> Self {
        Self(U256::from(scaled_val))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= RAY_SCALE {
            scaled_val.insert_str(0, &vec!["0"; RAY_SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - RAY_SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl fmt::Debug for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<Decimal> for Rate {
    fn from(val: Decimal) -> Self {
        // WAD fraction rescaled up to RAY; saturates only past ~10^50
        Self(
            val.0
                .checked_mul(U256::from(WAD_RAY_RATIO))
                .unwrap_or_else(U256::max_value),
        )
    }
}

impl TryAdd for Rate {
    fn try_add(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_add(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TrySub for Rate {
    fn try_sub(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_sub(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryDiv<u64> for Rate {
    fn try_div(self, rhs: u64) -> Result<Self, LendingError> {
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

impl TryDiv<Rate> for Rate {
    fn try_div(self, rhs: Self) -> Result<Self, LendingError> {
        if rhs.0.is_zero() {
            return Err(LendingError::DivisionByZero);
        }
        Ok(Self(
            self.0
                .checked_mul(Self::ray())
                .ok_or(LendingError::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<u64> for Rate {
    fn try_mul(self, rhs: u64) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(U256::from(rhs))
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl TryMul<Rate> for Rate {
    fn try_mul(self, rhs: Self) -> Result<Self, LendingError> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(LendingError::MathOverflow)?
                .checked_div(Self::ray())
                .ok_or(LendingError::MathOverflow)?,
        ))
    }
}

impl BorshSerialize for Rate {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for word in self.0 .0.iter() {
            writer.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }
}

impl BorshDeserialize for Rate {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut words = [0u64; 4];
        for word in words.iter_mut() {
            let mut word_bytes = [0u8; 8];
            reader.read_exact(&mut word_bytes)?;
            *word = u64::from_le_bytes(word_bytes);
        }
        Ok(Rate(U256(words)))
    }
}
