//! Fixed-point decimal numbers.
//!
//! Rules arithmetic truncates at well-defined points, so every value is a
//! scaled integer with four decimal places. Arithmetic truncates toward zero;
//! [`Fixed::ceil`], [`Fixed::floor`], [`Fixed::round`], and
//! [`Fixed::apply_rounding`] are the only places where rounding happens.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};
use core::str::FromStr;

/// Error returned when a string does not hold a decimal number.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal number: {0:?}")]
pub struct ParseFixedError(pub String);

/// A decimal value with four places of precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i64);

impl Fixed {
    /// Number of decimal places held.
    pub const PLACES: u32 = 4;
    /// Scale between the raw integer and the represented value.
    pub const MULTIPLIER: i64 = 10_000;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::MULTIPLIER);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    /// Wraps an already-scaled raw value.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the scaled raw value.
    pub const fn raw(self) -> i64 {
        self.0
    }

    pub const fn from_i64(value: i64) -> Self {
        Self(value.saturating_mul(Self::MULTIPLIER))
    }

    /// Converts a float, rounding to the nearest representable value so that
    /// literals such as `2.675` survive binary representation error.
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::MULTIPLIER as f64).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    /// Integer part, truncated toward zero.
    pub const fn as_i64(self) -> i64 {
        self.0 / Self::MULTIPLIER
    }

    /// Integer part, truncated toward zero and saturated to `i32`.
    pub fn as_i32(self) -> i32 {
        self.as_i64().clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    pub const fn is_integer(self) -> bool {
        self.0 % Self::MULTIPLIER == 0
    }

    /// Drops everything to the right of the decimal point.
    pub const fn trunc(self) -> Self {
        Self(self.0 / Self::MULTIPLIER * Self::MULTIPLIER)
    }

    /// Rounds up to the nearest whole number. Negative values only truncate,
    /// which is already the upward direction for them.
    pub const fn ceil(self) -> Self {
        let truncated = self.trunc();
        if self.0 > 0 && self.0 != truncated.0 {
            Self(truncated.0 + Self::MULTIPLIER)
        } else {
            truncated
        }
    }

    /// Rounds down to the nearest whole number.
    pub const fn floor(self) -> Self {
        let truncated = self.trunc();
        if self.0 < 0 && self.0 != truncated.0 {
            Self(truncated.0 - Self::MULTIPLIER)
        } else {
            truncated
        }
    }

    /// Rounds to the nearest whole number. Positive halves go up; negative
    /// halves go toward zero.
    pub const fn round(self) -> Self {
        let truncated = self.trunc();
        let remainder = self.0 - truncated.0;
        if remainder >= Self::MULTIPLIER / 2 {
            Self(truncated.0 + Self::MULTIPLIER)
        } else if remainder < -Self::MULTIPLIER / 2 {
            Self(truncated.0 - Self::MULTIPLIER)
        } else {
            truncated
        }
    }

    /// Rounds toward positive infinity, or toward negative infinity when
    /// `round_down` is set.
    pub const fn apply_rounding(self, round_down: bool) -> Self {
        if round_down { self.floor() } else { self.ceil() }
    }

    /// Truncates to a number of decimal places (at most four).
    pub fn trunc_to_places(self, places: u32) -> Self {
        let scale = 10_i64.pow(Self::PLACES - places.min(Self::PLACES));
        Self(self.0 / scale * scale)
    }

    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Division that reports a zero divisor instead of yielding zero.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        Some(Self::saturate(
            i128::from(self.0) * i128::from(Self::MULTIPLIER) / i128::from(rhs.0),
        ))
    }

    /// Formats with a leading `+` for non-negative values.
    pub fn to_signed_string(self) -> String {
        if self.0 >= 0 {
            format!("+{self}")
        } else {
            self.to_string()
        }
    }

    fn saturate(raw: i128) -> Self {
        Self(raw.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_i64(i64::from(value))
    }
}

impl From<i64> for Fixed {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl Add for Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Fixed {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::saturate(i128::from(self.0) * i128::from(rhs.0) / i128::from(Self::MULTIPLIER))
    }
}

/// Division by zero yields zero. Use [`Fixed::checked_div`] to detect it.
impl Div for Fixed {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.checked_div(rhs).unwrap_or(Self::ZERO)
    }
}

/// Remainder after removing all whole multiples of `rhs`.
impl Rem for Fixed {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return Self::ZERO;
        }
        self - rhs * (self / rhs).trunc()
    }
}

impl Neg for Fixed {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Fixed> for Fixed {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.as_i64();
        let fraction = (self.0 % Self::MULTIPLIER).unsigned_abs();
        if fraction == 0 {
            return write!(f, "{integer}");
        }
        let sign = if integer == 0 && self.0 < 0 { "-" } else { "" };
        let digits = format!("{fraction:04}");
        write!(f, "{sign}{integer}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Fixed {
    type Err = ParseFixedError;

    /// Parses a plain decimal. Digits beyond the fourth place are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseFixedError(s.to_owned());
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut scaled_fraction = 0_i64;
        let mut digits = fraction.bytes();
        for _ in 0..Self::PLACES {
            let digit = digits.next().map_or(0, |b| i64::from(b - b'0'));
            scaled_fraction = scaled_fraction * 10 + digit;
        }
        let raw = whole
            .checked_mul(Self::MULTIPLIER)
            .and_then(|v| v.checked_add(scaled_fraction))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -raw } else { raw }))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fixed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.is_integer() {
            serializer.serialize_i64(self.as_i64())
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fixed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FixedVisitor;

        impl serde::de::Visitor<'_> for FixedVisitor {
            type Value = Fixed;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a decimal string")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Fixed, E> {
                Ok(Fixed::from_i64(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Fixed, E> {
                i64::try_from(v)
                    .map(Fixed::from_i64)
                    .map_err(|_| E::custom("number out of range"))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Fixed, E> {
                Ok(Fixed::from_f64(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Fixed, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FixedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(s: &str) -> Fixed {
        s.parse().unwrap()
    }

    #[test]
    fn multiplication_truncates_extra_places() {
        // 1.2345 * 1.1 = 1.35795 -> 1.3579
        assert_eq!(fx("1.2345") * fx("1.1"), fx("1.3579"));
        assert_eq!(Fixed::from(2) * Fixed::from(3), Fixed::from(6));
    }

    #[test]
    fn division_truncates_and_tolerates_zero() {
        assert_eq!(Fixed::from(10) / Fixed::from(3), fx("3.3333"));
        assert_eq!(Fixed::from(-10) / Fixed::from(3), fx("-3.3333"));
        assert_eq!(Fixed::from(1) / Fixed::ZERO, Fixed::ZERO);
        assert_eq!(Fixed::from(1).checked_div(Fixed::ZERO), None);
    }

    #[test]
    fn ceil_only_moves_positive_fractions() {
        assert_eq!(fx("2.1").ceil(), Fixed::from(3));
        assert_eq!(fx("2").ceil(), Fixed::from(2));
        assert_eq!(fx("-2.7").ceil(), Fixed::from(-2));
    }

    #[test]
    fn floor_moves_negative_fractions_down() {
        assert_eq!(fx("2.9").floor(), Fixed::from(2));
        assert_eq!(fx("-2.1").floor(), Fixed::from(-3));
    }

    #[test]
    fn round_is_half_up_for_positives() {
        assert_eq!(fx("2.5").round(), Fixed::from(3));
        assert_eq!(fx("2.4999").round(), Fixed::from(2));
        assert_eq!(fx("-2.5").round(), Fixed::from(-2));
        assert_eq!(fx("-2.5001").round(), Fixed::from(-3));
    }

    #[test]
    fn apply_rounding_direction() {
        assert_eq!(fx("4.2").apply_rounding(false), Fixed::from(5));
        assert_eq!(fx("4.2").apply_rounding(true), Fixed::from(4));
        assert_eq!(fx("-4.2").apply_rounding(true), Fixed::from(-5));
        assert_eq!(fx("-4.2").apply_rounding(false), Fixed::from(-4));
    }

    #[test]
    fn remainder_keeps_sign_of_dividend() {
        assert_eq!(Fixed::from(7) % Fixed::from(4), Fixed::from(3));
        assert_eq!(Fixed::from(-7) % Fixed::from(4), Fixed::from(-3));
        assert_eq!(fx("7.5") % Fixed::from(2), fx("1.5"));
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(fx("12.5000").to_string(), "12.5");
        assert_eq!(Fixed::from(20).to_string(), "20");
        assert_eq!(fx("-0.25").to_string(), "-0.25");
        assert_eq!(Fixed::from(3).to_signed_string(), "+3");
        assert_eq!(Fixed::from(-3).to_signed_string(), "-3");
    }

    #[test]
    fn parse_rejects_garbage_and_truncates_precision() {
        assert!("abc".parse::<Fixed>().is_err());
        assert!("".parse::<Fixed>().is_err());
        assert!("1.2.3".parse::<Fixed>().is_err());
        assert_eq!(fx("0.123456"), fx("0.1234"));
        assert_eq!(fx(".5"), fx("0.5"));
    }

    #[test]
    fn trunc_to_one_place() {
        assert_eq!(fx("26.4567").trunc_to_places(1), fx("26.4"));
        assert_eq!(fx("-1.99").trunc_to_places(1), fx("-1.9"));
    }

    #[test]
    fn from_f64_survives_representation_error() {
        assert_eq!(Fixed::from_f64(2.675), fx("2.675"));
        assert_eq!(Fixed::from_f64(0.3), fx("0.3"));
    }
}
