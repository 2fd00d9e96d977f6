// SPDX-License-Identifier: MIT OR Apache-2.0

//! The polymorphic configuration value tree.
//!
//! Every loader turns its source format into a tree of [`Value`] nodes. A node is a
//! closed sum keyed by [`Kind`] plus two pieces of diagnostic metadata: the reference
//! (the structural path that produced it) and the file it came from. Metadata never
//! takes part in equality, so trees produced from different files compare by content.
//!
//! Trees are built once by a loader and then only read. Reloading produces a new tree.

use crate::domain::coerce::{self, Dynamic};
use crate::domain::errors::{ConfigError, Result};
use crate::domain::iter::Iter;
use crate::domain::kind::Kind;
use crate::domain::number::{Decimal, Number};
use crate::ports::decoder::{Decode, DecodeContext};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// The payload of a value, selected by its kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    /// No value was produced.
    #[default]
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Labeled children, in source order.
    Struct(Vec<(String, Value)>),
    /// Ordered children.
    List(Vec<Value>),
    /// An integer or binary float.
    Number(Number),
    /// An exact decimal literal.
    Decimal(Decimal),
}

impl Node {
    /// Returns the kind of the payload.
    pub fn kind(&self) -> Kind {
        match self {
            Node::Undefined => Kind::Undefined,
            Node::Null => Kind::Null,
            Node::Bool(_) => Kind::Bool,
            Node::String(_) => Kind::String,
            Node::Bytes(_) => Kind::Bytes,
            Node::Struct(_) => Kind::Struct,
            Node::List(_) => Kind::List,
            Node::Number(_) => Kind::Number,
            Node::Decimal(_) => Kind::Decimal,
        }
    }
}

/// A node of a configuration tree.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::{Kind, Value};
///
/// let root = Value::from_entries([
///     ("port", Value::from(8080i64)),
///     ("name", Value::from("svc")),
/// ]);
///
/// assert_eq!(root.kind(), Kind::Struct);
/// assert_eq!(root.lookup(["port"]).unwrap().as_i64().unwrap(), 8080);
/// assert_eq!(root.lookup(["name"]).unwrap().as_string().unwrap(), "svc");
/// assert!(root.lookup(["missing"]).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Value {
    node: Node,
    reference: Option<Arc<str>>,
    file: Option<Arc<Path>>,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Value {
    /// Creates a value from a payload.
    pub fn new(node: Node) -> Self {
        Self {
            node,
            reference: None,
            file: None,
        }
    }

    /// Creates a null value.
    pub fn null() -> Self {
        Self::new(Node::Null)
    }

    /// Creates a struct value from labeled children.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(Node::Struct(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Creates a list value from ordered children.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::new(Node::List(items.into_iter().collect()))
    }

    /// Sets the reference describing where this node was produced.
    pub fn with_reference(mut self, reference: impl Into<Arc<str>>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Sets the file this node was read from.
    pub fn with_file(mut self, file: impl Into<Arc<Path>>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Stamps every node of this subtree with the file it was read from and the dotted
    /// path of labels that leads to it. The root of the subtree gets no reference.
    ///
    /// ```
    /// use cfgtree::domain::Value;
    /// use std::path::Path;
    ///
    /// let root = Value::from_entries([("db", Value::from_entries([("hosts", Value::from_items([Value::from("a")]))]))])
    ///     .with_origin(Path::new("/etc/app.yaml"));
    /// let host = root.lookup(["db", "hosts", "0"]).unwrap();
    /// assert_eq!(host.reference(), Some("db.hosts.0"));
    /// assert_eq!(host.file(), Some(Path::new("/etc/app.yaml")));
    /// ```
    pub fn with_origin(self, file: &Path) -> Self {
        let file: Arc<Path> = Arc::from(file);
        self.stamp(None, &file)
    }

    fn stamp(mut self, reference: Option<String>, file: &Arc<Path>) -> Self {
        let child_ref = |label: &str| match &reference {
            Some(parent) => format!("{}.{}", parent, label),
            None => label.to_string(),
        };
        self.node = match self.node {
            Node::Struct(entries) => Node::Struct(
                entries
                    .into_iter()
                    .map(|(label, value)| {
                        let reference = child_ref(&label);
                        (label, value.stamp(Some(reference), file))
                    })
                    .collect(),
            ),
            Node::List(items) => Node::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| value.stamp(Some(child_ref(&index.to_string())), file))
                    .collect(),
            ),
            other => other,
        };
        self.reference = reference.map(Arc::from);
        self.file = Some(Arc::clone(file));
        self
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        self.node.kind()
    }

    /// Returns the payload.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Consumes the value and returns its payload.
    pub fn into_node(self) -> Node {
        self.node
    }

    /// Returns the reference describing where this node was produced, if known.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Returns the file this node was read from, if known.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Returns `true` if this value is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self.node, Node::Null)
    }

    /// Returns the closest untyped native representation of this value.
    ///
    /// Structs have no untyped scalar form and are reported as opaque.
    /// Lists are represented by [`Value::to_dynamic_list`].
    pub fn to_dynamic(&self) -> Dynamic<'_> {
        match &self.node {
            Node::Undefined => Dynamic::Opaque("undefined"),
            Node::Null => Dynamic::Nil,
            Node::Bool(v) => Dynamic::Bool(*v),
            Node::String(v) => Dynamic::Str(v),
            Node::Bytes(v) => Dynamic::Bytes(v),
            Node::Struct(_) => Dynamic::Opaque("struct"),
            Node::List(_) => Dynamic::Opaque("list"),
            Node::Number(n) => n.to_dynamic(),
            Node::Decimal(d) => d.to_dynamic(),
        }
    }

    /// Returns the untyped children of a list, or `None` for other kinds.
    pub fn to_dynamic_list(&self) -> Option<Vec<Dynamic<'_>>> {
        match &self.node {
            Node::List(items) => Some(items.iter().map(Value::to_dynamic).collect()),
            _ => None,
        }
    }

    /// Extracts a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        coerce::to_bool(&self.to_dynamic())
    }

    /// Extracts a string. Decimals render as their literal; null yields an empty string.
    pub fn as_string(&self) -> Result<String> {
        coerce::to_string(&self.to_dynamic())
    }

    /// Extracts bytes. Strings yield their UTF-8 encoding; null yields an empty buffer.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        coerce::to_bytes(&self.to_dynamic())
    }

    /// Extracts a list of strings. Every element must be a string.
    pub fn as_string_list(&self) -> Result<Vec<String>> {
        match self.to_dynamic_list() {
            Some(items) => coerce::to_string_list(&Dynamic::List(&items)),
            None => coerce::to_string_list(&self.to_dynamic()),
        }
    }

    /// Extracts an `i64`, failing rather than truncating.
    pub fn as_i64(&self) -> Result<i64> {
        match &self.node {
            Node::Decimal(d) => d.to_i64(),
            _ => coerce::to_i64(&self.to_dynamic()),
        }
    }

    /// Extracts a `u64`, failing rather than truncating.
    pub fn as_u64(&self) -> Result<u64> {
        match &self.node {
            Node::Decimal(d) => d.to_u64(),
            _ => coerce::to_u64(&self.to_dynamic()),
        }
    }

    /// Extracts an `f64`. Any numeric value widens without a precision check.
    pub fn as_f64(&self) -> Result<f64> {
        match &self.node {
            Node::Decimal(d) => Ok(d.to_f64()),
            _ => coerce::to_f64(&self.to_dynamic()),
        }
    }

    /// Returns the child for one path segment.
    ///
    /// Structs resolve the segment by label. Lists resolve it by index when the segment
    /// is made of ASCII digits only. Every other kind has no children.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match &self.node {
            Node::Struct(entries) => entries
                .iter()
                .find(|(label, _)| label == segment)
                .map(|(_, value)| value),
            Node::List(items) => parse_index(segment).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Navigates a path of segments from this node.
    ///
    /// An empty path yields this node. Any segment that fails to resolve yields `None`,
    /// never a partial result.
    ///
    /// ```
    /// use cfgtree::domain::Value;
    ///
    /// let root = Value::from_entries([(
    ///     "servers",
    ///     Value::from_items([Value::from("a"), Value::from("b")]),
    /// )]);
    /// assert_eq!(root.lookup(["servers", "1"]).unwrap().as_string().unwrap(), "b");
    /// assert!(root.lookup(["servers", "2"]).is_none());
    /// assert!(root.lookup(["servers", "x"]).is_none());
    /// ```
    pub fn lookup<I>(&self, path: I) -> Option<&Value>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        path.into_iter()
            .try_fold(self, |node, segment| node.child(segment.as_ref()))
    }

    /// Returns an iterator over the children of a list.
    pub fn list(&self) -> Result<Iter<'_>> {
        match &self.node {
            Node::List(items) => Ok(Iter::list(items)),
            other => Err(ConfigError::KindMismatch {
                expected: Kind::List,
                found: other.kind(),
            }),
        }
    }

    /// Returns an iterator over the labeled children of a struct.
    pub fn structure(&self) -> Result<Iter<'_>> {
        match &self.node {
            Node::Struct(entries) => Ok(Iter::structure(entries)),
            other => Err(ConfigError::KindMismatch {
                expected: Kind::Struct,
                found: other.kind(),
            }),
        }
    }

    /// Returns the number of children of a struct or list, and zero otherwise.
    pub fn len(&self) -> usize {
        match &self.node {
            Node::Struct(entries) => entries.len(),
            Node::List(items) => items.len(),
            _ => 0,
        }
    }

    /// Returns `true` if this value has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes this value into a structured type by mapping struct labels to fields
    /// and list indices to elements.
    ///
    /// ```
    /// use cfgtree::domain::Value;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Server {
    ///     port: u16,
    ///     hosts: Vec<String>,
    /// }
    ///
    /// let value = Value::from_entries([
    ///     ("port", Value::from(8080i64)),
    ///     ("hosts", Value::from_items([Value::from("a")])),
    /// ]);
    /// let server: Server = value.decode().unwrap();
    /// assert_eq!(server.port, 8080);
    /// assert_eq!(server.hosts, vec!["a".to_string()]);
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(self)
    }

    /// Decodes this value structurally. serde targets cannot receive the context, so
    /// this is equivalent to [`Value::decode`]; targets that need it implement
    /// [`Decode`] and go through [`Value::decode_into_with_ctx`].
    pub fn decode_with_ctx<T: DeserializeOwned>(&self, _ctx: &DecodeContext) -> Result<T> {
        self.decode()
    }

    /// Lets a target that implements the decode capability populate itself.
    pub fn decode_into<T: Decode + ?Sized>(&self, target: &mut T) -> Result<()> {
        target.decode(self)
    }

    /// Lets a target that implements the decode capability populate itself, handing it
    /// the decode context.
    pub fn decode_into_with_ctx<T: Decode + ?Sized>(
        &self,
        ctx: &DecodeContext,
        target: &mut T,
    ) -> Result<()> {
        target.decode_with_ctx(ctx, self)
    }

    /// Deep-merges `other` into this value and returns the result.
    ///
    /// Structs are merged label by label, recursing into labels both sides define.
    /// Any other collision is resolved in favor of `other`. The merged struct keeps the
    /// metadata of `self`.
    pub fn merged(self, other: Value) -> Value {
        match (self.node, other.node) {
            (Node::Struct(mut entries), Node::Struct(incoming)) => {
                for (label, value) in incoming {
                    match entries.iter().position(|(l, _)| *l == label) {
                        Some(pos) => {
                            let existing = std::mem::take(&mut entries[pos].1);
                            entries[pos].1 = existing.merged(value);
                        }
                        None => entries.push((label, value)),
                    }
                }
                Value {
                    node: Node::Struct(entries),
                    reference: self.reference,
                    file: self.file,
                }
            }
            (previous, node) => {
                if !matches!(previous, Node::Undefined) {
                    tracing::debug!(
                        reference = other.reference.as_deref().unwrap_or(""),
                        file = ?other.file,
                        "overriding {} value with {}",
                        previous.kind(),
                        node.kind()
                    );
                }
                Value {
                    node,
                    reference: other.reference,
                    file: other.file,
                }
            }
        }
    }
}

/// Parses an index-shaped path segment.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::new(Node::Bool(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::new(Node::String(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::new(Node::String(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::new(Node::Bytes(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::new(Node::Number(Number::from(v)))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::new(Node::Number(Number::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::new(Node::Number(Number::from(v)))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Value::new(Node::Number(v))
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::new(Node::Decimal(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::new(Node::List(v))
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::new(node)
    }
}
