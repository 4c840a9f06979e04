//! Token amount type.
//!
//! Amounts are represented as fixed-point integers (u128) in the ledger's
//! smallest unit ("motes") to avoid floating-point errors. One token is
//! 10^9 motes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of motes per whole token.
pub const MOTES_PER_TOKEN: u128 = 1_000_000_000;

/// A token amount in motes.
///
/// Internally stored as raw motes (u128) for precision. Display renders
/// the amount as decimal tokens with nine fractional digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_motes(motes: u128) -> Self {
        Self(motes)
    }

    /// Whole tokens, truncating any fractional part.
    pub fn from_tokens(tokens: u128) -> Self {
        Self(tokens * MOTES_PER_TOKEN)
    }

    pub fn motes(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0 / MOTES_PER_TOKEN,
            self.0 % MOTES_PER_TOKEN
        )
    }
}
