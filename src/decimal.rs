//! Exact decimal values.
//!
//! A [`Decimal`] is an arbitrary-precision signed coefficient together with the
//! number of digits that sit after the decimal point. No binary floating point
//! is involved anywhere: parsing, printing and rescaling are all done on the
//! big-integer coefficient.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WireError;

/// `10^exp` as a big integer.
pub(crate) fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// An exact decimal number: `coefficient * 10^-scale`.
///
/// Equality and ordering are numeric, so `1.5` equals `1.50` even though the
/// two carry different scales. The scale only influences [`Display`](fmt::Display).
#[derive(Debug, Clone)]
pub struct Decimal {
    coefficient: BigInt,
    scale: u32,
}

impl Decimal {
    /// Build from a raw coefficient and scale.
    pub fn new(coefficient: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            coefficient: coefficient.into(),
            scale,
        }
    }

    /// An integer value (scale 0).
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self::new(value, 0)
    }

    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    /// Digits after the decimal point in this representation.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// Number of decimal digits in the coefficient (zero counts as one digit).
    pub fn digit_count(&self) -> usize {
        if self.coefficient.is_zero() {
            1
        } else {
            self.coefficient.magnitude().to_str_radix(10).len()
        }
    }

    /// Same value at another scale, or `None` if that would drop nonzero digits.
    pub fn with_scale(&self, scale: u32) -> Option<Decimal> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(self.clone()),
            Ordering::Greater => Some(Decimal {
                coefficient: &self.coefficient * pow10(scale - self.scale),
                scale,
            }),
            Ordering::Less if self.is_zero() => Some(Decimal {
                coefficient: BigInt::zero(),
                scale,
            }),
            // Only trailing zeros may go, so the divisor never outgrows the coefficient.
            Ordering::Less if scale < self.min_scale() => None,
            Ordering::Less => Some(Decimal {
                coefficient: &self.coefficient / pow10(self.scale - scale),
                scale,
            }),
        }
    }

    /// Smallest scale at which this value is still exact.
    pub fn min_scale(&self) -> u32 {
        if self.coefficient.is_zero() {
            return 0;
        }
        let digits = self.coefficient.magnitude().to_str_radix(10);
        let zeros = digits.bytes().rev().take_while(|b| *b == b'0').count() as u32;
        self.scale.saturating_sub(zeros)
    }

    /// The same value with trailing fractional zeros removed.
    pub fn trimmed(&self) -> Decimal {
        let scale = self.min_scale();
        // min_scale never drops nonzero digits.
        self.with_scale(scale).unwrap_or_else(|| self.clone())
    }

    /// Position of the leading digit relative to the decimal point.
    fn exponent(&self) -> i64 {
        self.digit_count() as i64 - i64::from(self.scale)
    }

    /// Compare magnitudes of two nonzero values.
    fn cmp_magnitude(&self, other: &Decimal) -> Ordering {
        // Equal exponents bound the scale gap by the coefficient lengths.
        self.exponent().cmp(&other.exponent()).then_with(|| {
            let (a, b) = (self.coefficient.magnitude(), other.coefficient.magnitude());
            match self.scale.cmp(&other.scale) {
                Ordering::Equal => a.cmp(b),
                Ordering::Less => (a * pow10(other.scale - self.scale).magnitude()).cmp(b),
                Ordering::Greater => a.cmp(&(b * pow10(self.scale - other.scale).magnitude())),
            }
        })
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.coefficient.cmp(&other.coefficient);
        }
        let sign = self.coefficient.sign().cmp(&other.coefficient.sign());
        if sign != Ordering::Equal || self.is_zero() {
            return sign;
        }
        let magnitude = self.cmp_magnitude(other);
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.coefficient.magnitude().to_str_radix(10);
        let scale = self.scale as usize;

        if self.is_negative() {
            f.write_str("-")?;
        }
        if scale == 0 {
            return f.write_str(&digits);
        }

        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", int_part, frac_part)
        } else {
            // Pure fraction: pad with leading zeros.
            write!(f, "0.{:0>width$}", digits, width = scale)
        }
    }
}

impl FromStr for Decimal {
    type Err = WireError;

    /// Parse `[+-]digits[.digits]`. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WireError::MalformedDecimalLiteral(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(malformed());
        }
        if body.contains('.') && frac_part.is_empty() {
            return Err(malformed());
        }

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);

        let magnitude = BigUint::from_str(&digits).map_err(|_| malformed())?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };

        Ok(Decimal {
            coefficient: BigInt::from_biguint(sign, magnitude),
            scale: frac_part.len() as u32,
        })
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(v: $t) -> Self {
                    Decimal::from_integer(v)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl From<BigInt> for Decimal {
    fn from(v: BigInt) -> Self {
        Decimal::from_integer(v)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
