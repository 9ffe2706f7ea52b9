//! Payment amount type.
//!
//! Amounts are whole multiples of the ledger's smallest payment unit. There is
//! no fractional part, so all arithmetic is plain checked integer math.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// An amount of the marketplace's payment token, in the smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Maximum possible amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount from raw units.
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Returns the raw number of units.
    #[must_use]
    pub const fn units(self) -> u64 {
        self.0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} units", self.0)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(CoreError::InvalidAmount("negative values not allowed".into()));
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidAmount(format!("invalid number: {s}")))
    }
}

// Serialized as a decimal string.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_new_returns_units() {
        assert_eq!(Amount::new(1000).units(), 1000);
        assert_eq!(Amount::from(7).units(), 7);
    }

    #[test]
    fn amount_zero_is_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::new(1).is_zero());
    }

    #[test]
    fn checked_add_returns_none_on_overflow() {
        assert_eq!(Amount::new(5).checked_add(Amount::new(3)), Some(Amount::new(8)));
        assert_eq!(Amount::MAX.checked_add(Amount::new(1)), None);
    }

    #[test]
    fn checked_sub_returns_none_on_underflow() {
        assert_eq!(Amount::new(10).checked_sub(Amount::new(3)), Some(Amount::new(7)));
        assert_eq!(Amount::new(1).checked_sub(Amount::new(5)), None);
    }

    #[test]
    fn saturating_ops_clamp() {
        assert_eq!(Amount::MAX.saturating_add(Amount::new(1)), Amount::MAX);
        assert_eq!(Amount::new(1).saturating_sub(Amount::new(5)), Amount::ZERO);
    }

    #[test]
    fn display_formats_units() {
        assert_eq!(Amount::new(975).to_string(), "975 units");
    }

    #[test]
    fn from_str_rejects_invalid() {
        assert_eq!("42".parse::<Amount>(), Ok(Amount::new(42)));
        assert!("abc".parse::<Amount>().is_err());
        assert!("-1".parse::<Amount>().is_err());
        assert!("1.5".parse::<Amount>().is_err());
    }

    #[test]
    fn serde_uses_decimal_string() {
        let amount = Amount::new(u64::MAX);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, format!("\"{}\"", u64::MAX));
        let restored: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, amount);
    }
}
