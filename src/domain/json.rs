// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical JSON form of a value tree.
//!
//! | Kind      | JSON                                          |
//! |-----------|-----------------------------------------------|
//! | Null      | `null`                                        |
//! | Bool      | boolean                                       |
//! | String    | string                                        |
//! | Bytes     | standard base64 string                        |
//! | Struct    | object, labels in insertion order             |
//! | List      | array                                         |
//! | Number    | number                                        |
//! | Decimal   | number with every digit of the literal        |
//!
//! Undefined values and non-finite floats have no JSON form and fail to serialize.

use crate::domain::errors::{ConfigError, Result};
use crate::domain::number::Number;
use crate::domain::value::{Node, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::str::FromStr;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.node() {
            Node::Undefined => Err(S::Error::custom("undefined value has no JSON form")),
            Node::Null => serializer.serialize_unit(),
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::String(v) => serializer.serialize_str(v),
            Node::Bytes(v) => serializer.serialize_str(&STANDARD.encode(v)),
            Node::Number(Number::Int(v)) => serializer.serialize_i64(*v),
            Node::Number(Number::Uint(v)) => serializer.serialize_u64(*v),
            Node::Number(Number::Float(v)) if v.is_finite() => serializer.serialize_f64(*v),
            Node::Number(Number::Float(v)) => {
                Err(S::Error::custom(format!("{} has no JSON form", v)))
            }
            Node::Decimal(d) => serde_json::Number::from_str(&d.to_canonical())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            Node::Struct(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (label, value) in entries {
                    map.serialize_entry(label, value)?;
                }
                map.end()
            }
            Node::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl Value {
    /// Serializes this value to canonical JSON.
    ///
    /// ```
    /// use cfgtree::domain::{Decimal, Value};
    ///
    /// let root = Value::from_entries([
    ///     ("pi", Value::from("3.14159265358979323846".parse::<Decimal>().unwrap())),
    ///     ("raw", Value::from(b"hi".to_vec())),
    /// ]);
    /// assert_eq!(
    ///     root.to_json_string().unwrap(),
    ///     r#"{"pi":3.14159265358979323846,"raw":"aGk="}"#
    /// );
    /// ```
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(json_error)
    }

    /// Serializes this value to canonical JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(json_error)
    }

    /// Converts this value into an owned untyped JSON tree.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(json_error)
    }

    /// Parses JSON text into a value tree.
    ///
    /// Integers that fit 64 bits become numbers. Every other numeric literal becomes a
    /// decimal with every digit kept. Exponents come back spelled with an explicit
    /// sign (`1e400` reads as `1e+400`), which compares equal to the original.
    pub fn from_json(bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })
    }
}

fn json_error(e: serde_json::Error) -> ConfigError {
    ConfigError::SerializeError {
        message: e.to_string(),
    }
}
