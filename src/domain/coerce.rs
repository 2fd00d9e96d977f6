// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checked conversions from untyped source values to primitive types.
//!
//! Configuration data frequently arrives weakly typed. The functions in this module
//! convert a [`Dynamic`] source into a specific primitive and fail instead of
//! truncating, wrapping, or clamping:
//!
//! - integer narrowing fails with [`ConfigError::UnsafeConversion`] when the value is
//!   outside the target range, or when a float is not exactly integral;
//! - widening to `f64` always succeeds for numeric sources;
//! - any source whose dynamic type the conversion does not support fails with
//!   [`ConfigError::InvalidSourceType`].
//!
//! # Examples
//!
//! ```
//! use cfgtree::domain::coerce::{self, Dynamic};
//! use cfgtree::domain::ConfigError;
//!
//! assert_eq!(coerce::to_i64(&Dynamic::F64(3.0)).unwrap(), 3);
//! assert!(matches!(
//!     coerce::to_i64(&Dynamic::F64(3.5)),
//!     Err(ConfigError::UnsafeConversion { .. })
//! ));
//! assert!(matches!(
//!     coerce::to_u64(&Dynamic::from(-1i32)),
//!     Err(ConfigError::UnsafeConversion { .. })
//! ));
//! ```

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// 2^63, the first `f64` above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first `f64` above `u64::MAX`.
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// An untyped source value.
///
/// The variant set covers the standard scalar types plus byte sequences, text,
/// text-renderable objects, and sequences. Anything else is represented by
/// [`Dynamic::Opaque`], which every conversion rejects.
#[derive(Clone, Copy)]
pub enum Dynamic<'a> {
    /// The absence of a value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// An `i8`.
    I8(i8),
    /// An `i16`.
    I16(i16),
    /// An `i32`.
    I32(i32),
    /// An `i64`.
    I64(i64),
    /// An `isize`.
    Isize(isize),
    /// A `u8`.
    U8(u8),
    /// A `u16`.
    U16(u16),
    /// A `u32`.
    U32(u32),
    /// A `u64`.
    U64(u64),
    /// A `usize`.
    Usize(usize),
    /// An `f32`.
    F32(f32),
    /// An `f64`.
    F64(f64),
    /// A byte sequence.
    Bytes(&'a [u8]),
    /// A string.
    Str(&'a str),
    /// An object that renders itself as text.
    Display(&'a dyn fmt::Display),
    /// A sequence already made of strings.
    Strings(&'a [String]),
    /// A heterogeneous sequence.
    List(&'a [Dynamic<'a>]),
    /// A value of a type no conversion supports, named for diagnostics.
    Opaque(&'static str),
}

impl Dynamic<'_> {
    /// Returns the name of the dynamic type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Nil => "nil",
            Dynamic::Bool(_) => "bool",
            Dynamic::I8(_) => "i8",
            Dynamic::I16(_) => "i16",
            Dynamic::I32(_) => "i32",
            Dynamic::I64(_) => "i64",
            Dynamic::Isize(_) => "isize",
            Dynamic::U8(_) => "u8",
            Dynamic::U16(_) => "u16",
            Dynamic::U32(_) => "u32",
            Dynamic::U64(_) => "u64",
            Dynamic::Usize(_) => "usize",
            Dynamic::F32(_) => "f32",
            Dynamic::F64(_) => "f64",
            Dynamic::Bytes(_) => "bytes",
            Dynamic::Str(_) => "string",
            Dynamic::Display(_) => "display",
            Dynamic::Strings(_) => "string list",
            Dynamic::List(_) => "list",
            Dynamic::Opaque(name) => name,
        }
    }

    /// Returns `true` for the integer and float variants.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Dynamic::I8(_)
                | Dynamic::I16(_)
                | Dynamic::I32(_)
                | Dynamic::I64(_)
                | Dynamic::Isize(_)
                | Dynamic::U8(_)
                | Dynamic::U16(_)
                | Dynamic::U32(_)
                | Dynamic::U64(_)
                | Dynamic::Usize(_)
                | Dynamic::F32(_)
                | Dynamic::F64(_)
        )
    }

    fn invalid(&self, expected: &'static str) -> ConfigError {
        ConfigError::InvalidSourceType {
            expected,
            found: self.type_name(),
        }
    }
}

impl fmt::Debug for Dynamic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Nil => f.write_str("Nil"),
            Dynamic::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Dynamic::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Dynamic::I16(v) => f.debug_tuple("I16").field(v).finish(),
            Dynamic::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Dynamic::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Dynamic::Isize(v) => f.debug_tuple("Isize").field(v).finish(),
            Dynamic::U8(v) => f.debug_tuple("U8").field(v).finish(),
            Dynamic::U16(v) => f.debug_tuple("U16").field(v).finish(),
            Dynamic::U32(v) => f.debug_tuple("U32").field(v).finish(),
            Dynamic::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Dynamic::Usize(v) => f.debug_tuple("Usize").field(v).finish(),
            Dynamic::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Dynamic::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Dynamic::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Dynamic::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Dynamic::Display(v) => f.debug_tuple("Display").field(&v.to_string()).finish(),
            Dynamic::Strings(v) => f.debug_tuple("Strings").field(v).finish(),
            Dynamic::List(v) => f.debug_tuple("List").field(v).finish(),
            Dynamic::Opaque(name) => f.debug_tuple("Opaque").field(name).finish(),
        }
    }
}

macro_rules! dynamic_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Dynamic<'_> {
                fn from(v: $ty) -> Self {
                    Dynamic::$variant(v)
                }
            }
        )*
    };
}

dynamic_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl<'a> From<&'a str> for Dynamic<'a> {
    fn from(v: &'a str) -> Self {
        Dynamic::Str(v)
    }
}

impl<'a> From<&'a String> for Dynamic<'a> {
    fn from(v: &'a String) -> Self {
        Dynamic::Str(v)
    }
}

impl<'a> From<&'a [u8]> for Dynamic<'a> {
    fn from(v: &'a [u8]) -> Self {
        Dynamic::Bytes(v)
    }
}

impl<'a> From<&'a [String]> for Dynamic<'a> {
    fn from(v: &'a [String]) -> Self {
        Dynamic::Strings(v)
    }
}

impl<'a> From<&'a [Dynamic<'a>]> for Dynamic<'a> {
    fn from(v: &'a [Dynamic<'a>]) -> Self {
        Dynamic::List(v)
    }
}

impl<'a, T> From<Option<T>> for Dynamic<'a>
where
    T: Into<Dynamic<'a>>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Dynamic::Nil, Into::into)
    }
}

/// Converts a boolean source. Only a boolean is accepted.
pub fn to_bool(src: &Dynamic<'_>) -> Result<bool> {
    match src {
        Dynamic::Bool(v) => Ok(*v),
        other => Err(other.invalid("bool")),
    }
}

/// Converts bytes, strings, and text-renderable sources into bytes.
///
/// A nil source yields an empty buffer.
pub fn to_bytes(src: &Dynamic<'_>) -> Result<Vec<u8>> {
    match src {
        Dynamic::Nil => Ok(Vec::new()),
        Dynamic::Bytes(v) => Ok(v.to_vec()),
        Dynamic::Str(v) => Ok(v.as_bytes().to_vec()),
        Dynamic::Display(v) => Ok(v.to_string().into_bytes()),
        other => Err(other.invalid("bytes")),
    }
}

/// Converts bytes, strings, and text-renderable sources into a string.
///
/// A nil source yields an empty string. Bytes that are not valid UTF-8 are rejected
/// as an unsafe conversion rather than replaced.
pub fn to_string(src: &Dynamic<'_>) -> Result<String> {
    match src {
        Dynamic::Nil => Ok(String::new()),
        Dynamic::Bytes(v) => String::from_utf8(v.to_vec())
            .map_err(|e| ConfigError::unsafe_conversion("string", e)),
        Dynamic::Str(v) => Ok((*v).to_string()),
        Dynamic::Display(v) => Ok(v.to_string()),
        other => Err(other.invalid("string")),
    }
}

/// Converts a sequence of strings.
///
/// A heterogeneous sequence is accepted when every element is a string; the first
/// element that is not fails with [`ConfigError::InvalidSourceElement`].
pub fn to_string_list(src: &Dynamic<'_>) -> Result<Vec<String>> {
    match src {
        Dynamic::Nil => Ok(Vec::new()),
        Dynamic::Strings(v) => Ok(v.to_vec()),
        Dynamic::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Dynamic::Str(s) => Ok((*s).to_string()),
                _ => Err(ConfigError::InvalidSourceElement { index }),
            })
            .collect(),
        other => Err(other.invalid("string list")),
    }
}

/// Converts a numeric source into an `i64`.
pub fn to_i64(src: &Dynamic<'_>) -> Result<i64> {
    match *src {
        Dynamic::I8(v) => Ok(v.into()),
        Dynamic::I16(v) => Ok(v.into()),
        Dynamic::I32(v) => Ok(v.into()),
        Dynamic::I64(v) => Ok(v),
        Dynamic::Isize(v) => i64::try_from(v).map_err(|_| ConfigError::unsafe_conversion("i64", v)),
        Dynamic::U8(v) => Ok(v.into()),
        Dynamic::U16(v) => Ok(v.into()),
        Dynamic::U32(v) => Ok(v.into()),
        Dynamic::U64(v) => u64_to_i64(v),
        Dynamic::Usize(v) => u64_to_i64(v as u64),
        Dynamic::F32(v) => f64_to_i64(v.into()),
        Dynamic::F64(v) => f64_to_i64(v),
        ref other => Err(other.invalid("i64")),
    }
}

/// Converts a numeric source into a `u64`.
pub fn to_u64(src: &Dynamic<'_>) -> Result<u64> {
    match *src {
        Dynamic::I8(v) => i64_to_u64(v.into()),
        Dynamic::I16(v) => i64_to_u64(v.into()),
        Dynamic::I32(v) => i64_to_u64(v.into()),
        Dynamic::I64(v) => i64_to_u64(v),
        Dynamic::Isize(v) => i64_to_u64(v as i64),
        Dynamic::U8(v) => Ok(v.into()),
        Dynamic::U16(v) => Ok(v.into()),
        Dynamic::U32(v) => Ok(v.into()),
        Dynamic::U64(v) => Ok(v),
        Dynamic::Usize(v) => Ok(v as u64),
        Dynamic::F32(v) => f64_to_u64(v.into()),
        Dynamic::F64(v) => f64_to_u64(v),
        ref other => Err(other.invalid("u64")),
    }
}

/// Widens a numeric source into an `f64`. Never fails for numeric sources.
pub fn to_f64(src: &Dynamic<'_>) -> Result<f64> {
    match *src {
        Dynamic::I8(v) => Ok(v.into()),
        Dynamic::I16(v) => Ok(v.into()),
        Dynamic::I32(v) => Ok(v.into()),
        Dynamic::I64(v) => Ok(v as f64),
        Dynamic::Isize(v) => Ok(v as f64),
        Dynamic::U8(v) => Ok(v.into()),
        Dynamic::U16(v) => Ok(v.into()),
        Dynamic::U32(v) => Ok(v.into()),
        Dynamic::U64(v) => Ok(v as f64),
        Dynamic::Usize(v) => Ok(v as f64),
        Dynamic::F32(v) => Ok(v.into()),
        Dynamic::F64(v) => Ok(v),
        ref other => Err(other.invalid("f64")),
    }
}

/// Converts an unsigned value into an `i64`, failing above `i64::MAX`.
pub fn u64_to_i64(src: u64) -> Result<i64> {
    i64::try_from(src).map_err(|_| ConfigError::unsafe_conversion("i64", src))
}

/// Converts a signed value into a `u64`, failing below zero.
pub fn i64_to_u64(src: i64) -> Result<u64> {
    u64::try_from(src).map_err(|_| ConfigError::unsafe_conversion("u64", src))
}

/// Converts a float into an `i64` when it is finite, integral, and in range.
///
/// The integer is converted back and must compare equal to the source.
pub fn f64_to_i64(src: f64) -> Result<i64> {
    if !src.is_finite() || src < -I64_BOUND || src >= I64_BOUND {
        return Err(ConfigError::unsafe_conversion("i64", src));
    }
    let dst = src as i64;
    if dst as f64 != src {
        return Err(ConfigError::unsafe_conversion("i64", src));
    }
    Ok(dst)
}

/// Converts a float into a `u64` when it is finite, integral, non-negative, and in range.
///
/// The integer is converted back and must compare equal to the source.
pub fn f64_to_u64(src: f64) -> Result<u64> {
    if !src.is_finite() || src < 0.0 || src >= U64_BOUND {
        return Err(ConfigError::unsafe_conversion("u64", src));
    }
    let dst = src as u64;
    if dst as f64 != src {
        return Err(ConfigError::unsafe_conversion("u64", src));
    }
    Ok(dst)
}
