// Copyright (c) 2026 Meridian Foundation

//! Non-negative fixed-point amounts.
//!
//! All balances, values and fees are expressed in nanos (10^-9 of a coin).
//! The type is a thin wrapper over `u64`; it can never go negative, and all
//! arithmetic used on the consensus path is explicit about overflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nanos per coin (10^9).
pub const NANOS_PER_COIN: u64 = 1_000_000_000;

/// A non-negative fixed-point amount in nanos.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Amount(nanos)
    }

    /// Whole coins, saturating at the top of the u64 range.
    pub const fn from_coins(coins: u64) -> Self {
        Amount(coins.saturating_mul(NANOS_PER_COIN))
    }

    pub const fn nanos(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `None` on overflow. The executor treats an overflowing `value + fee`
    /// as insufficient funds rather than wrapping.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / NANOS_PER_COIN;
        let frac = self.0 % NANOS_PER_COIN;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{frac:09}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add_overflow() {
        let a = Amount::from_nanos(u64::MAX);
        assert_eq!(a.checked_add(Amount::from_nanos(1)), None);
        assert_eq!(
            Amount::from_nanos(1).checked_add(Amount::from_nanos(2)),
            Some(Amount::from_nanos(3))
        );
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Amount::from_nanos(5);
        assert_eq!(a.saturating_sub(Amount::from_nanos(10)), Amount::ZERO);
    }

    #[test]
    fn test_from_coins() {
        assert_eq!(Amount::from_coins(3).nanos(), 3 * NANOS_PER_COIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::from_coins(2).to_string(), "2");
        assert_eq!(Amount::from_nanos(1_500_000_000).to_string(), "1.500000000");
    }
}
