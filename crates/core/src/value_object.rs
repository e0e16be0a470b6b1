//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// An amount of money in the smallest currency unit (e.g. cents).
///
/// Integer minor units keep fine arithmetic exact.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor(units: u64) -> Self {
        Self(units)
    }

    pub fn minor_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiply by a whole count (e.g. overdue days). Saturates instead of
    /// wrapping.
    pub fn times(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }
}

impl core::fmt::Display for Money {
    /// Renders as major.minor with two decimals (`150` -> `1.50`).
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_by_value() {
        assert_eq!(Money::from_minor(150), Money::from_minor(150));
        assert_ne!(Money::from_minor(150), Money::from_minor(151));
    }

    #[test]
    fn times_saturates() {
        assert_eq!(Money::from_minor(10).times(3), Money::from_minor(30));
        assert_eq!(Money::from_minor(u64::MAX).times(2), Money::from_minor(u64::MAX));
        assert!(Money::from_minor(50).times(0).is_zero());
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(1250).to_string(), "12.50");
    }
}
