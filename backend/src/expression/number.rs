//! Exact rational numbers
//!
//! Payoffs and probabilities are reduced fractions over i128 so that sums such
//! as `0.1 + 0.2` compare equal to `0.3` on every platform. Every rule and the
//! residual-probability math use this type exclusively.
//!
//! CRITICAL: the denominator is always positive and `gcd(numer, denom) == 1`,
//! so the derived `PartialEq`/`Hash` are structural equality on the value.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by exact arithmetic
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum NumberError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid number literal: {0}")]
    InvalidLiteral(String),
}

/// Exact rational number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Number {
    numer: i128,
    denom: i128,
}

/// Largest power of ten used when rendering terminating decimals
const MAX_DECIMAL_DIGITS: u32 = 36;

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    // gcd of two i128 magnitudes only exceeds i128::MAX for (MIN, MIN) or (MIN, 0)
    i128::try_from(a).unwrap_or(i128::MAX)
}

/// Compare `a/b` with `c/d` for positive `b` and `d` without overflowing.
fn cmp_ratio(a: i128, b: i128, c: i128, d: i128) -> Ordering {
    if let (Some(left), Some(right)) = (a.checked_mul(d), c.checked_mul(b)) {
        return left.cmp(&right);
    }

    let (qa, ra) = (a.div_euclid(b), a.rem_euclid(b));
    let (qc, rc) = (c.div_euclid(d), c.rem_euclid(d));
    if qa != qc {
        return qa.cmp(&qc);
    }

    match (ra == 0, rc == 0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        // ra/b < rc/d  <=>  d/rc < b/ra
        (false, false) => cmp_ratio(d, rc, b, ra),
    }
}

impl Number {
    pub const ZERO: Number = Number { numer: 0, denom: 1 };
    pub const ONE: Number = Number { numer: 1, denom: 1 };

    /// Build a reduced fraction `numer / denom`
    pub fn new(numer: i128, denom: i128) -> Result<Self, NumberError> {
        if denom == 0 {
            return Err(NumberError::DivisionByZero);
        }
        let g = gcd(numer, denom);
        let (mut numer, mut denom) = (numer / g, denom / g);
        if denom < 0 {
            numer = numer.checked_neg().ok_or(NumberError::Overflow)?;
            denom = denom.checked_neg().ok_or(NumberError::Overflow)?;
        }
        Ok(Self { numer, denom })
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            numer: value as i128,
            denom: 1,
        }
    }

    pub fn numer(&self) -> i128 {
        self.numer
    }

    pub fn denom(&self) -> i128 {
        self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    pub fn is_negative(&self) -> bool {
        self.numer < 0
    }

    pub fn is_integer(&self) -> bool {
        self.denom == 1
    }

    /// Lossy conversion for presentation layers
    pub fn to_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    pub fn checked_add(&self, other: &Number) -> Result<Number, NumberError> {
        let g = gcd(self.denom, other.denom);
        let (left_scale, right_scale) = (other.denom / g, self.denom / g);
        let left = self
            .numer
            .checked_mul(left_scale)
            .ok_or(NumberError::Overflow)?;
        let right = other
            .numer
            .checked_mul(right_scale)
            .ok_or(NumberError::Overflow)?;
        let numer = left.checked_add(right).ok_or(NumberError::Overflow)?;
        let denom = self
            .denom
            .checked_mul(left_scale)
            .ok_or(NumberError::Overflow)?;
        Number::new(numer, denom)
    }

    pub fn checked_sub(&self, other: &Number) -> Result<Number, NumberError> {
        self.checked_add(&other.checked_neg()?)
    }

    pub fn checked_mul(&self, other: &Number) -> Result<Number, NumberError> {
        let g1 = gcd(self.numer, other.denom).max(1);
        let g2 = gcd(other.numer, self.denom).max(1);
        let numer = (self.numer / g1)
            .checked_mul(other.numer / g2)
            .ok_or(NumberError::Overflow)?;
        let denom = (self.denom / g2)
            .checked_mul(other.denom / g1)
            .ok_or(NumberError::Overflow)?;
        Number::new(numer, denom)
    }

    pub fn checked_div(&self, other: &Number) -> Result<Number, NumberError> {
        if other.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        self.checked_mul(&Number::new(other.denom, other.numer)?)
    }

    /// Remainder with the sign of the dividend (`x - y * trunc(x / y)`)
    pub fn checked_rem(&self, other: &Number) -> Result<Number, NumberError> {
        let quotient = self.checked_div(other)?.trunc();
        self.checked_sub(&other.checked_mul(&quotient)?)
    }

    pub fn checked_neg(&self) -> Result<Number, NumberError> {
        Ok(Self {
            numer: self.numer.checked_neg().ok_or(NumberError::Overflow)?,
            denom: self.denom,
        })
    }

    pub fn checked_pow(&self, exponent: i64) -> Result<Number, NumberError> {
        let mut base = if exponent < 0 {
            Number::ONE.checked_div(self)?
        } else {
            *self
        };
        let mut remaining = exponent.unsigned_abs();
        let mut result = Number::ONE;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(&base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.checked_mul(&base)?;
            }
        }
        Ok(result)
    }

    pub fn abs(&self) -> Result<Number, NumberError> {
        if self.is_negative() {
            self.checked_neg()
        } else {
            Ok(*self)
        }
    }

    pub fn floor(&self) -> Number {
        Self {
            numer: self.numer.div_euclid(self.denom),
            denom: 1,
        }
    }

    pub fn ceil(&self) -> Number {
        let floor = self.numer.div_euclid(self.denom);
        let numer = if self.numer.rem_euclid(self.denom) == 0 {
            floor
        } else {
            floor + 1
        };
        Self { numer, denom: 1 }
    }

    pub fn trunc(&self) -> Number {
        Self {
            numer: self.numer / self.denom,
            denom: 1,
        }
    }

    /// Round half away from zero
    pub fn round(&self) -> Number {
        let whole = self.numer / self.denom;
        let rest = (self.numer % self.denom).unsigned_abs();
        let denom = self.denom.unsigned_abs();
        let numer = if rest * 2 >= denom {
            if self.numer < 0 {
                whole - 1
            } else {
                whole + 1
            }
        } else {
            whole
        };
        Self { numer, denom: 1 }
    }

    /// Integer value, if this number has no fractional part and fits an i64
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            i64::try_from(self.numer).ok()
        } else {
            None
        }
    }

    /// Exact decimal expansion when the denominator only has factors 2 and 5
    fn decimal_digits(&self) -> Option<u32> {
        let mut scale: i128 = 1;
        for digits in 0..=MAX_DECIMAL_DIGITS {
            if scale % self.denom == 0 {
                return Some(digits);
            }
            scale = scale.checked_mul(10)?;
        }
        None
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::ZERO
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::from_integer(value)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ratio(self.numer, self.denom, other.numer, other.denom)
    }
}

impl FromStr for Number {
    type Err = NumberError;

    /// Parse a decimal literal such as `42`, `-0.25` or `1.5e-3` exactly
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || NumberError::InvalidLiteral(text.to_string());
        let trimmed = text.trim();

        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i32 = body[pos + 1..].parse().map_err(|_| invalid())?;
                (&body[..pos], exponent)
            }
            None => (body, 0),
        };

        let (whole, fraction) = match mantissa.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (mantissa, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut numer: i128 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            numer = numer
                .checked_mul(10)
                .and_then(|n| n.checked_add((digit - b'0') as i128))
                .ok_or(NumberError::Overflow)?;
        }
        if numer == 0 {
            return Ok(Number::ZERO);
        }
        if negative {
            numer = -numer;
        }

        let digits = i32::try_from(fraction.len()).map_err(|_| NumberError::Overflow)?;
        let shift = exponent.checked_sub(digits).ok_or(NumberError::Overflow)?;
        let power = 10i128
            .checked_pow(shift.unsigned_abs())
            .ok_or(NumberError::Overflow)?;
        if shift >= 0 {
            Number::new(numer.checked_mul(power).ok_or(NumberError::Overflow)?, 1)
        } else {
            Number::new(numer, power)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            return write!(f, "{}", self.numer);
        }

        let decimal = self.decimal_digits().and_then(|digits| {
            let scale = 10u128.pow(digits);
            let factor = scale / self.denom as u128;
            self.numer
                .unsigned_abs()
                .checked_mul(factor)
                .map(|scaled| (digits, scale, scaled))
        });

        match decimal {
            Some((digits, scale, scaled)) => {
                let sign = if self.numer < 0 { "-" } else { "" };
                write!(
                    f,
                    "{}{}.{:0width$}",
                    sign,
                    scaled / scale,
                    scaled % scale,
                    width = digits as usize
                )
            }
            None => write!(f, "{}/{}", self.numer, self.denom),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Number {
        text.parse().unwrap()
    }

    #[test]
    fn test_decimal_sum_is_exact() {
        let sum = num("0.1").checked_add(&num("0.2")).unwrap();
        assert_eq!(sum, num("0.3"));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(num("42"), Number::from_integer(42));
        assert_eq!(num("-0.25"), Number::new(-1, 4).unwrap());
        assert_eq!(num("1.5e3"), Number::from_integer(1500));
        assert_eq!(num("2e-2"), Number::new(1, 50).unwrap());
        assert_eq!(num(".5"), Number::new(1, 2).unwrap());
        assert!("1.2.3".parse::<Number>().is_err());
        assert!("abc".parse::<Number>().is_err());
        assert!("".parse::<Number>().is_err());
    }

    #[test]
    fn test_normalized_sign_and_gcd() {
        let n = Number::new(6, -8).unwrap();
        assert_eq!(n.numer(), -3);
        assert_eq!(n.denom(), 4);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            Number::ONE.checked_div(&Number::ZERO),
            Err(NumberError::DivisionByZero)
        );
        assert_eq!(Number::new(1, 0), Err(NumberError::DivisionByZero));
    }

    #[test]
    fn test_ordering() {
        assert!(num("0.3") < num("0.31"));
        assert!(num("-1") < num("-0.5"));
        assert!(Number::new(1, 3).unwrap() > num("0.333333"));
    }

    #[test]
    fn test_ordering_near_overflow() {
        let a = Number::new(i128::MAX - 1, i128::MAX).unwrap();
        let b = Number::new(i128::MAX - 2, i128::MAX - 1).unwrap();
        assert_eq!(a.cmp(&b), Ordering::Greater);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(num("2.5").round(), Number::from_integer(3));
        assert_eq!(num("-2.5").round(), Number::from_integer(-3));
        assert_eq!(num("-2.4").round(), Number::from_integer(-2));
        assert_eq!(num("-2.5").floor(), Number::from_integer(-3));
        assert_eq!(num("-2.5").ceil(), Number::from_integer(-2));
        assert_eq!(num("7").ceil(), Number::from_integer(7));
    }

    #[test]
    fn test_remainder_and_power() {
        assert_eq!(num("7").checked_rem(&num("3")).unwrap(), num("1"));
        assert_eq!(num("-7").checked_rem(&num("3")).unwrap(), num("-1"));
        assert_eq!(num("2").checked_pow(10).unwrap(), num("1024"));
        assert_eq!(num("2").checked_pow(-2).unwrap(), num("0.25"));
        assert_eq!(num("5").checked_pow(0).unwrap(), Number::ONE);
    }

    #[test]
    fn test_extreme_exponents() {
        assert_eq!("1.5e-2147483648".parse::<Number>(), Err(NumberError::Overflow));
        assert_eq!("1e2147483647".parse::<Number>(), Err(NumberError::Overflow));
        assert_eq!(num("0e100"), Number::ZERO);
        assert_eq!(num("0.000e-2147483648"), Number::ZERO);
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Number::new(i128::MAX, 1).unwrap();
        assert_eq!(big.checked_add(&Number::ONE), Err(NumberError::Overflow));
        assert_eq!(big.checked_mul(&num("2")), Err(NumberError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(num("10").to_string(), "10");
        assert_eq!(num("-0.25").to_string(), "-0.25");
        assert_eq!(num("0.6").to_string(), "0.6");
        assert_eq!(Number::new(1, 3).unwrap().to_string(), "1/3");
        assert_eq!(num("-0.05").to_string(), "-0.05");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&num("0.125")).unwrap();
        assert_eq!(json, "\"0.125\"");
    }
}
