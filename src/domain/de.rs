// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural decoding of value trees through serde.
//!
//! `&Value` is a [`serde::Deserializer`]: struct values map onto fields by label and
//! list values onto sequence elements by index. Integer targets receive integers and
//! rely on serde's own range checks, so decoding `300` into a `u8` fails instead of
//! wrapping. Decimal values decode exactly into integer targets when they are integral.
//!
//! `Value` is also [`serde::Deserialize`], so a decode target can keep a raw subtree
//! and decode it later.

use crate::domain::errors::ConfigError;
use crate::domain::number::{Decimal, Number};
use crate::domain::value::{Node, Value};
use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;
use std::fmt;

/// Map key that carries a decimal literal through `deserialize_any`.
pub(crate) const DECIMAL_TOKEN: &str = "$cfgtree::private::Decimal";
/// Map key serde_json uses for numbers under its `arbitrary_precision` feature.
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

impl<'de> de::Deserializer<'de> for &'de Value {
    type Error = ConfigError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Undefined | Node::Null => visitor.visit_unit(),
            Node::Bool(v) => visitor.visit_bool(*v),
            Node::String(v) => visitor.visit_borrowed_str(v),
            Node::Bytes(v) => visitor.visit_borrowed_bytes(v),
            Node::Number(Number::Int(v)) => visitor.visit_i64(*v),
            Node::Number(Number::Uint(v)) => visitor.visit_u64(*v),
            Node::Number(Number::Float(v)) => visitor.visit_f64(*v),
            Node::Decimal(d) => visitor.visit_map(DecimalAccess { literal: Some(d) }),
            Node::Struct(entries) => visitor.visit_map(StructAccess {
                entries: entries.iter(),
                pending: None,
            }),
            Node::List(items) => visitor.visit_seq(ListAccess {
                items: items.iter(),
            }),
        }
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Decimal(d) => visitor.visit_i64(d.to_i64()?),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Decimal(d) => visitor.visit_u64(d.to_u64()?),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_u64(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Decimal(d) => visitor.visit_f64(d.to_f64()),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Decimal(d) => visitor.visit_borrowed_str(d.as_str()),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::Undefined | Node::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        match self.node() {
            Node::String(variant) => visitor.visit_enum(variant.as_str().into_deserializer()),
            Node::Struct(entries) if entries.len() == 1 => {
                let (variant, value) = &entries[0];
                visitor.visit_enum(EnumValue { variant, value })
            }
            _ => Err(de::Error::invalid_type(unexpected(self), &"enum variant")),
        }
    }

    forward_to_deserialize_any! {
        bool i128 u128 char bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value.node() {
        Node::Undefined | Node::Null => de::Unexpected::Unit,
        Node::Bool(v) => de::Unexpected::Bool(*v),
        Node::String(v) => de::Unexpected::Str(v),
        Node::Bytes(v) => de::Unexpected::Bytes(v),
        Node::Number(Number::Int(v)) => de::Unexpected::Signed(*v),
        Node::Number(Number::Uint(v)) => de::Unexpected::Unsigned(*v),
        Node::Number(Number::Float(v)) => de::Unexpected::Float(*v),
        Node::Decimal(_) => de::Unexpected::Other("decimal"),
        Node::Struct(_) => de::Unexpected::Map,
        Node::List(_) => de::Unexpected::Seq,
    }
}

struct StructAccess<'de> {
    entries: std::slice::Iter<'de, (String, Value)>,
    pending: Option<&'de Value>,
}

impl<'de> MapAccess<'de> for StructAccess<'de> {
    type Error = ConfigError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, ConfigError> {
        match self.entries.next() {
            Some((label, value)) => {
                self.pending = Some(value);
                let key: de::value::BorrowedStrDeserializer<'de, ConfigError> =
                    de::value::BorrowedStrDeserializer::new(label);
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, ConfigError> {
        match self.pending.take() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct ListAccess<'de> {
    items: std::slice::Iter<'de, Value>,
}

impl<'de> SeqAccess<'de> for ListAccess<'de> {
    type Error = ConfigError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, ConfigError> {
        self.items
            .next()
            .map(|item| seed.deserialize(item))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Presents a decimal as a single-entry map keyed by [`DECIMAL_TOKEN`].
struct DecimalAccess<'de> {
    literal: Option<&'de Decimal>,
}

impl<'de> MapAccess<'de> for DecimalAccess<'de> {
    type Error = ConfigError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, ConfigError> {
        if self.literal.is_none() {
            return Ok(None);
        }
        let key: de::value::BorrowedStrDeserializer<'de, ConfigError> =
            de::value::BorrowedStrDeserializer::new(DECIMAL_TOKEN);
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, ConfigError> {
        match self.literal.take() {
            Some(d) => {
                let literal: de::value::BorrowedStrDeserializer<'de, ConfigError> =
                    de::value::BorrowedStrDeserializer::new(d.as_str());
                seed.deserialize(literal)
            }
            None => Err(de::Error::custom("value requested before key")),
        }
    }
}

struct EnumValue<'de> {
    variant: &'de str,
    value: &'de Value,
}

impl<'de> EnumAccess<'de> for EnumValue<'de> {
    type Error = ConfigError;
    type Variant = &'de Value;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), ConfigError> {
        let key: de::value::BorrowedStrDeserializer<'de, ConfigError> =
            de::value::BorrowedStrDeserializer::new(self.variant);
        Ok((seed.deserialize(key)?, self.value))
    }
}

impl<'de> VariantAccess<'de> for &'de Value {
    type Error = ConfigError;

    fn unit_variant(self) -> Result<(), ConfigError> {
        match self.node() {
            Node::Undefined | Node::Null => Ok(()),
            _ => Err(de::Error::invalid_type(unexpected(self), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, ConfigError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, ConfigError> {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        de::Deserializer::deserialize_map(self, visitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::from(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::null())
    }

    fn visit_some<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        de::Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items: Vec<Value> = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::from(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(label) = map.next_key::<String>()? {
            let value: Value = map.next_value()?;
            entries.push((label, value));
        }
        Ok(number_token(&entries).unwrap_or_else(|| Value::from_entries(entries)))
    }
}

/// Recognizes the single-entry map a number token deserializes to.
///
/// A document object only reads as a number when it has exactly one entry, its label
/// is one of the token keys and its value is a valid numeric literal. Any other
/// object using those labels stays a struct.
fn number_token(entries: &[(String, Value)]) -> Option<Value> {
    let [(label, value)] = entries else {
        return None;
    };
    if label != DECIMAL_TOKEN && label != JSON_NUMBER_TOKEN {
        return None;
    }
    match value.node() {
        Node::String(literal) => number_from_literal(literal).ok(),
        _ => None,
    }
}

/// Builds a number from a literal: integers that fit 64 bits become [`Number`]s,
/// everything else keeps its literal as a [`Decimal`].
pub(crate) fn number_from_literal(literal: &str) -> Result<Value, ConfigError> {
    if let Ok(v) = literal.parse::<i64>() {
        return Ok(Value::from(v));
    }
    if let Ok(v) = literal.parse::<u64>() {
        return Ok(Value::from(v));
    }
    literal.parse::<Decimal>().map(Value::from)
}

impl<'de> de::Deserialize<'de> for Value {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Database {
        host: String,
        port: u16,
        #[serde(default)]
        replicas: Vec<String>,
        timeout: Option<f64>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Fast,
        Safe,
        Custom { level: u8 },
    }

    fn database() -> Value {
        Value::from_entries([
            ("host", Value::from("localhost")),
            ("port", Value::from(5432i64)),
            ("replicas", Value::from_items([Value::from("r1")])),
            ("timeout", Value::null()),
        ])
    }

    #[test]
    fn test_decode_struct_by_label() {
        let db: Database = database().decode().unwrap();
        assert_eq!(
            db,
            Database {
                host: "localhost".to_string(),
                port: 5432,
                replicas: vec!["r1".to_string()],
                timeout: None,
            }
        );
    }

    #[test]
    fn test_decode_list_by_index() {
        let value = Value::from_items([Value::from(1i64), Value::from(2i64)]);
        let items: Vec<u32> = value.decode().unwrap();
        assert_eq!(items, vec![1, 2]);

        let pair: (u8, u8) = value.decode().unwrap();
        assert_eq!(pair, (1, 2));
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        let value = Value::from(300i64);
        let result: Result<u8, _> = value.decode();
        assert!(matches!(result, Err(ConfigError::DecodeError { .. })));
    }

    #[test]
    fn test_decode_rejects_incompatible_shape() {
        let value = Value::from_items([Value::from("a")]);
        let result: Result<Database, _> = value.decode();
        assert!(result.is_err());

        let result: Result<Vec<String>, _> = database().decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_float_into_integer_fails() {
        let value = Value::from(3.5f64);
        assert!(value.decode::<i32>().is_err());
    }

    #[test]
    fn test_decode_decimal_targets() {
        let exact = Value::from("12.00".parse::<Decimal>().unwrap());
        assert_eq!(exact.decode::<i32>().unwrap(), 12);
        assert_eq!(exact.decode::<f64>().unwrap(), 12.0);
        assert_eq!(exact.decode::<String>().unwrap(), "12.00");

        let fraction = Value::from("1.5".parse::<Decimal>().unwrap());
        assert!(matches!(
            fraction.decode::<u64>(),
            Err(ConfigError::UnsafeConversion { .. })
        ));
    }

    #[test]
    fn test_decode_enums() {
        assert_eq!(Value::from("fast").decode::<Mode>().unwrap(), Mode::Fast);
        assert_eq!(Value::from("safe").decode::<Mode>().unwrap(), Mode::Safe);

        let custom = Value::from_entries([(
            "custom",
            Value::from_entries([("level", Value::from(3i64))]),
        )]);
        assert_eq!(custom.decode::<Mode>().unwrap(), Mode::Custom { level: 3 });
        assert!(Value::from(1i64).decode::<Mode>().is_err());
    }

    #[test]
    fn test_decode_map_target() {
        let map: BTreeMap<String, u16> = Value::from_entries([
            ("a", Value::from(1i64)),
            ("b", Value::from(2i64)),
        ])
        .decode()
        .unwrap();
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn test_decode_raw_subtree() {
        #[derive(Deserialize)]
        struct Plugin {
            name: String,
            settings: Value,
        }

        let value = Value::from_entries([
            ("name", Value::from("cache")),
            (
                "settings",
                Value::from_entries([
                    ("size", Value::from(64i64)),
                    ("ratio", Value::from("0.125".parse::<Decimal>().unwrap())),
                ]),
            ),
        ]);

        let plugin: Plugin = value.decode().unwrap();
        assert_eq!(plugin.name, "cache");
        assert_eq!(plugin.settings, value.lookup(["settings"]).unwrap().clone());
        assert_eq!(
            plugin.settings.lookup(["ratio"]).unwrap().kind(),
            crate::domain::Kind::Decimal
        );
    }

    #[test]
    fn test_number_from_literal() {
        assert_eq!(number_from_literal("42").unwrap(), Value::from(42i64));
        assert_eq!(
            number_from_literal("18446744073709551615").unwrap(),
            Value::from(u64::MAX)
        );
        assert_eq!(
            number_from_literal("1.10").unwrap(),
            Value::from("1.10".parse::<Decimal>().unwrap())
        );
        assert!(number_from_literal("one").is_err());
    }
}
