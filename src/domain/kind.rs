// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of dynamic types a configuration value may hold.

use std::fmt;

/// Discriminant of a [`Value`](crate::domain::Value).
///
/// Every value reports exactly one kind, and the kind of a node never changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value was produced.
    #[default]
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool,
    /// A UTF-8 string.
    String,
    /// Raw bytes.
    Bytes,
    /// Labeled children.
    Struct,
    /// Ordered children.
    List,
    /// An integer or binary float.
    Number,
    /// An exact decimal literal.
    Decimal,
}

impl Kind {
    /// Returns the name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Undefined => "Undefined",
            Kind::Null => "Null",
            Kind::Bool => "Bool",
            Kind::String => "String",
            Kind::Bytes => "Bytes",
            Kind::Struct => "Struct",
            Kind::List => "List",
            Kind::Number => "Number",
            Kind::Decimal => "Decimal",
        }
    }

    /// Returns `true` for kinds that hold children.
    pub fn is_container(&self) -> bool {
        matches!(self, Kind::Struct | Kind::List)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
