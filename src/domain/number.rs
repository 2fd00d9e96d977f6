// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numeric payloads of configuration values.
//!
//! [`Number`] holds machine integers and binary floats. [`Decimal`] holds a numeric
//! literal verbatim so that no precision is lost between the source document and the
//! canonical JSON form.

use crate::domain::coerce::Dynamic;
use crate::domain::errors::{ConfigError, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An integer or binary float.
///
/// Unsigned values that fit an `i64` are stored as [`Number::Int`], so equal
/// integers always compare equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer above `i64::MAX`.
    Uint(u64),
    /// A binary float.
    Float(f64),
}

impl Number {
    /// Returns the number as an untyped source value.
    pub fn to_dynamic(&self) -> Dynamic<'static> {
        match *self {
            Number::Int(v) => Dynamic::I64(v),
            Number::Uint(v) => Dynamic::U64(v),
            Number::Float(v) => Dynamic::F64(v),
        }
    }

    /// Returns `true` if the number is an integer.
    pub fn is_integer(&self) -> bool {
        !matches!(self, Number::Float(_))
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Number::Uint(v), Number::Int)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Uint(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// An exact decimal literal such as `3.14159265358979323846` or `-1.5e10`.
///
/// The literal is validated on construction and kept verbatim. Two decimals are
/// equal when their canonical forms are, so `1E3`, `1e3` and `+1e+3` compare equal
/// while `1e3` and `1000` do not.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::Decimal;
///
/// let d: Decimal = "1.50e2".parse().unwrap();
/// assert_eq!(d.as_str(), "1.50e2");
/// assert_eq!(d.to_i64().unwrap(), 150);
/// assert!("1.5.0".parse::<Decimal>().is_err());
/// assert_eq!(d, "+1.50E+2".parse::<Decimal>().unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Decimal(String);

/// The parts of a validated decimal literal.
struct Parts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
    exponent: &'a str,
}

impl Decimal {
    /// Returns the literal.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the literal into the nearest `f64`. Never fails.
    pub fn to_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }

    /// Converts the literal into an `i64` if it denotes an integer in range.
    pub fn to_i64(&self) -> Result<i64> {
        self.to_i128()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| ConfigError::unsafe_conversion("i64", &self.0))
    }

    /// Converts the literal into a `u64` if it denotes a non-negative integer in range.
    pub fn to_u64(&self) -> Result<u64> {
        self.to_i128()
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| ConfigError::unsafe_conversion("u64", &self.0))
    }

    /// Exact integer value of the literal, or `None` if it has a non-zero fractional
    /// part or does not fit an `i128`.
    fn to_i128(&self) -> Option<i128> {
        let parts = split(&self.0)?;
        let exponent: i64 = if parts.exponent.is_empty() {
            0
        } else {
            parts.exponent.parse().ok()?
        };

        let mut digits: Vec<u8> = parts
            .integer
            .bytes()
            .chain(parts.fraction.bytes())
            .skip_while(|b| *b == b'0')
            .collect();
        if digits.is_empty() {
            return Some(0);
        }

        let mut scale = exponent.checked_sub(parts.fraction.len() as i64)?;
        while scale < 0 && digits.last() == Some(&b'0') {
            digits.pop();
            scale += 1;
        }
        if scale < 0 || scale > 38 {
            return None;
        }

        let mut value: i128 = 0;
        for digit in digits {
            value = value.checked_mul(10)?.checked_add(i128::from(digit - b'0'))?;
        }
        value = value.checked_mul(10i128.checked_pow(scale as u32)?)?;
        Some(if parts.negative { -value } else { value })
    }

    /// Returns the literal in JSON number grammar, keeping every digit.
    ///
    /// The exponent is written as `e` followed by an explicit sign, which is how
    /// `serde_json` spells parsed literals.
    ///
    /// ```
    /// use cfgtree::domain::Decimal;
    ///
    /// let d: Decimal = "+007.50".parse().unwrap();
    /// assert_eq!(d.to_canonical(), "7.50");
    /// assert_eq!("1E3".parse::<Decimal>().unwrap().to_canonical(), "1e+3");
    /// ```
    pub fn to_canonical(&self) -> String {
        let Some(parts) = split(&self.0) else {
            return self.0.clone();
        };
        let mut out = String::with_capacity(self.0.len() + 1);
        if parts.negative {
            out.push('-');
        }
        match parts.integer.trim_start_matches('0') {
            "" => out.push('0'),
            integer => out.push_str(integer),
        }
        if !parts.fraction.is_empty() {
            out.push('.');
            out.push_str(parts.fraction);
        }
        if !parts.exponent.is_empty() {
            out.push('e');
            if !parts.exponent.starts_with('-') {
                out.push('+');
            }
            out.push_str(parts.exponent);
        }
        out
    }

    /// Returns the literal as an untyped text-renderable source.
    pub fn to_dynamic(&self) -> Dynamic<'_> {
        Dynamic::Display(self)
    }
}

/// Splits `-?digits(.digits)?([eE][+-]?digits)?`; at least one mantissa digit is required.
fn split(literal: &str) -> Option<Parts<'_>> {
    let (negative, rest) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal.strip_prefix('+').unwrap_or(literal)),
    };
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    let (integer, fraction) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (mantissa, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !all_digits(integer) || !all_digits(fraction) {
        return None;
    }
    if rest.contains('e') || rest.contains('E') {
        let unsigned = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if unsigned.is_empty() || !all_digits(unsigned) {
            return None;
        }
    }

    Some(Parts {
        negative,
        integer,
        fraction,
        exponent: exponent.strip_prefix('+').unwrap_or(exponent),
    })
}

impl FromStr for Decimal {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        split(trimmed).ok_or_else(|| ConfigError::ParseError {
            message: format!("invalid decimal literal '{}'", s),
            source: None,
        })?;
        Ok(Decimal(trimmed.to_string()))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.to_canonical() == other.to_canonical()
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_canonical().hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
