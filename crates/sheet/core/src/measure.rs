//! Weights and weight units.
//!
//! Weights are held in pounds. Metric units use the game-scale conversion
//! (1 kg = 2 lb) so published tables stay round.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};
use core::str::FromStr;

use crate::fixed::Fixed;

/// Units a weight may be authored or displayed in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum WeightUnits {
    #[default]
    #[strum(serialize = "lb")]
    #[cfg_attr(feature = "serde", serde(rename = "lb"))]
    Pound,
    #[strum(serialize = "oz")]
    #[cfg_attr(feature = "serde", serde(rename = "oz"))]
    Ounce,
    #[strum(serialize = "tn")]
    #[cfg_attr(feature = "serde", serde(rename = "tn"))]
    Ton,
    #[strum(serialize = "kg")]
    #[cfg_attr(feature = "serde", serde(rename = "kg"))]
    Kilogram,
    #[strum(serialize = "g")]
    #[cfg_attr(feature = "serde", serde(rename = "g"))]
    Gram,
}

impl WeightUnits {
    /// Converts a value in these units to pounds.
    pub fn to_pounds(self, value: Fixed) -> Fixed {
        match self {
            Self::Pound => value,
            Self::Ounce => value / Fixed::from(16),
            Self::Ton => value * Fixed::from(2000),
            Self::Kilogram => value * Fixed::from(2),
            Self::Gram => value / Fixed::from(500),
        }
    }

    /// Converts pounds to a value in these units.
    pub fn from_pounds(self, pounds: Fixed) -> Fixed {
        match self {
            Self::Pound => pounds,
            Self::Ounce => pounds * Fixed::from(16),
            Self::Ton => pounds / Fixed::from(2000),
            Self::Kilogram => pounds / Fixed::from(2),
            Self::Gram => pounds * Fixed::from(500),
        }
    }
}

/// A weight, stored in pounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(Fixed);

impl Weight {
    pub const ZERO: Self = Self(Fixed::ZERO);

    pub const fn from_pounds(pounds: Fixed) -> Self {
        Self(pounds)
    }

    pub fn from_units(value: Fixed, units: WeightUnits) -> Self {
        Self(units.to_pounds(value))
    }

    pub const fn pounds(self) -> Fixed {
        self.0
    }

    pub fn in_units(self, units: WeightUnits) -> Fixed {
        units.from_pounds(self.0)
    }

    /// Formats the weight in the given units, e.g. `12.5 lb`.
    pub fn display_in(self, units: WeightUnits) -> String {
        format!("{} {}", self.in_units(units), units)
    }
}

impl Add for Weight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Weight {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Weight {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Fixed> for Weight {
    type Output = Self;

    fn mul(self, rhs: Fixed) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lb", self.0)
    }
}

/// Error returned when a weight string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid weight: {0:?}")]
pub struct ParseWeightError(pub String);

impl FromStr for Weight {
    type Err = ParseWeightError;

    /// Accepts `"12"`, `"12 lb"`, `"3.5kg"`, and so on. A bare number is pounds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: Fixed = number
            .trim()
            .parse()
            .map_err(|_| ParseWeightError(s.to_owned()))?;
        let units = if unit.trim().is_empty() {
            WeightUnits::Pound
        } else {
            unit.trim()
                .parse()
                .map_err(|_| ParseWeightError(s.to_owned()))?
        };
        Ok(Self::from_units(value, units))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Weight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Weight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct WeightVisitor;

        impl serde::de::Visitor<'_> for WeightVisitor {
            type Value = Weight;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a weight such as \"12 lb\" or a number of pounds")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Weight, E> {
                Ok(Weight::from_pounds(Fixed::from_i64(v)))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Weight, E> {
                i64::try_from(v)
                    .map(|v| Weight::from_pounds(Fixed::from_i64(v)))
                    .map_err(|_| E::custom("weight out of range"))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Weight, E> {
                Ok(Weight::from_pounds(Fixed::from_f64(v)))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Weight, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(WeightVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!("12".parse::<Weight>().unwrap().pounds(), Fixed::from(12));
        assert_eq!("3 kg".parse::<Weight>().unwrap().pounds(), Fixed::from(6));
        assert_eq!("8oz".parse::<Weight>().unwrap().pounds(), "0.5".parse().unwrap());
        assert!("heavy".parse::<Weight>().is_err());
    }

    #[test]
    fn displays_in_requested_units() {
        let weight = Weight::from_pounds(Fixed::from(20));
        assert_eq!(weight.display_in(WeightUnits::Kilogram), "10 kg");
        assert_eq!(weight.to_string(), "20 lb");
    }
}
