use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// An hour quantity stored as whole hundredths of an hour.
///
/// Arithmetic saturates rather than overflowing, so sums over pathological
/// inputs stay well defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Hours = Hours(0);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Rounds to the nearest hundredth. Non-finite input maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self((value * 100.0).round() as i64)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self - other`, floored at zero.
    pub fn clamped_sub(self, other: Hours) -> Hours {
        Hours(self.0.saturating_sub(other.0).max(0))
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Hours {
    type Output = Hours;

    fn sub(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Hours>>(iter: I) -> Hours {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Hours> for Hours {
    fn sum<I: Iterator<Item = &'a Hours>>(iter: I) -> Hours {
        iter.copied().sum()
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(serde::de::Error::custom(format!(
                "hours must be finite (got {value})"
            )));
        }
        Ok(Hours::from_f64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_hundredth() {
        assert_eq!(Hours::from_f64(4.0).hundredths(), 400);
        assert_eq!(Hours::from_f64(0.1 + 0.2).hundredths(), 30);
        assert_eq!(Hours::from_f64(2.345).hundredths(), 235);
        assert_eq!(Hours::from_f64(0.004), Hours::ZERO);
        assert_eq!(Hours::from_f64(f64::INFINITY), Hours::ZERO);
    }

    #[test]
    fn display_drops_trailing_zeros() {
        assert_eq!(Hours::from_f64(8.0).to_string(), "8");
        assert_eq!(Hours::from_f64(2.5).to_string(), "2.5");
        assert_eq!(Hours::from_hundredths(7).to_string(), "0.07");
    }

    #[test]
    fn subtraction_helpers_never_go_negative_when_clamped() {
        let eight = Hours::from_hundredths(800);
        let nine = Hours::from_hundredths(900);
        assert_eq!(eight.clamped_sub(nine), Hours::ZERO);
        assert_eq!(nine - eight, Hours::from_hundredths(100));
        assert_eq!(eight.min(nine), eight);
    }

    #[test]
    fn serializes_as_decimal_number() {
        let json = serde_json::to_string(&Hours::from_f64(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let back: Hours = serde_json::from_str("3.25").unwrap();
        assert_eq!(back.hundredths(), 325);
    }
}
