// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decode capability for targets that populate themselves from a value tree.
//!
//! Structural decoding through serde covers most targets. A type that needs to
//! interpret a subtree itself (a plugin table, a polymorphic section, a value that
//! depends on runtime state) implements [`Decode`] instead. Context-aware targets
//! override [`Decode::decode_with_ctx`] and read what they need from the
//! [`DecodeContext`].

use crate::domain::{Result, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A target that decodes itself from a value.
///
/// # Examples
///
/// ```rust
/// use cfgtree::domain::{Result, Value};
/// use cfgtree::ports::{Decode, DecodeContext};
///
/// struct Prefix(String);
///
/// #[derive(Default)]
/// struct Greeting(String);
///
/// impl Decode for Greeting {
///     fn decode(&mut self, value: &Value) -> Result<()> {
///         self.0 = value.as_string()?;
///         Ok(())
///     }
///
///     fn decode_with_ctx(&mut self, ctx: &DecodeContext, value: &Value) -> Result<()> {
///         self.decode(value)?;
///         if let Some(prefix) = ctx.get::<Prefix>() {
///             self.0.insert_str(0, &prefix.0);
///         }
///         Ok(())
///     }
/// }
///
/// let ctx = DecodeContext::new().with(Prefix("hello ".to_string()));
/// let mut greeting = Greeting::default();
/// Value::from("world").decode_into_with_ctx(&ctx, &mut greeting).unwrap();
/// assert_eq!(greeting.0, "hello world");
/// ```
pub trait Decode {
    /// Populates `self` from `value`.
    fn decode(&mut self, value: &Value) -> Result<()>;

    /// Populates `self` from `value` with access to caller-supplied context.
    ///
    /// The default ignores the context and calls [`Decode::decode`].
    fn decode_with_ctx(&mut self, ctx: &DecodeContext, value: &Value) -> Result<()> {
        let _ = ctx;
        self.decode(value)
    }
}

/// Caller-supplied state handed to context-aware decoders, keyed by type.
#[derive(Clone, Default)]
pub struct DecodeContext {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl DecodeContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns the context.
    pub fn with<T: Any + Send + Sync>(mut self, entry: T) -> Self {
        self.insert(entry);
        self
    }

    /// Adds an entry, replacing any previous entry of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, entry: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(entry));
    }

    /// Returns the entry of type `T`, if present.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<T>())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the context holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeContext")
            .field("entries", &self.entries.len())
            .finish()
    }
}
