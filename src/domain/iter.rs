// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-pass traversal over the children of a list or struct.

use crate::domain::value::Value;
use std::fmt;
use std::iter::{Enumerate, FusedIterator};
use std::slice;

/// The label of a child: its key in a struct or its index in a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label<'a> {
    /// The key of a struct child.
    Key(&'a str),
    /// The index of a list child.
    Index(usize),
}

impl<'a> Label<'a> {
    /// Returns the key of a struct child, or `None` for list children.
    pub fn as_key(&self) -> Option<&'a str> {
        match *self {
            Label::Key(key) => Some(key),
            Label::Index(_) => None,
        }
    }
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Key(key) => f.write_str(key),
            Label::Index(index) => write!(f, "{}", index),
        }
    }
}

enum Entries<'a> {
    Struct(slice::Iter<'a, (String, Value)>),
    List(Enumerate<slice::Iter<'a, Value>>),
}

/// A forward-only cursor over the children of a list or struct.
///
/// Obtained from [`Value::list`] or [`Value::structure`]. The cursor is not
/// restartable; ask the value for a new one to traverse again. Once exhausted it
/// stays exhausted.
///
/// `Iter` can be driven either as a cursor or as a standard iterator:
///
/// ```
/// use cfgtree::domain::{Label, Value};
///
/// let root = Value::from_entries([("a", Value::from(1i64)), ("b", Value::from(2i64))]);
///
/// let mut cursor = root.structure().unwrap();
/// assert!(cursor.value().is_none());
/// while cursor.advance() {
///     println!("{} = {:?}", cursor.label().unwrap(), cursor.value().unwrap());
/// }
/// assert!(!cursor.advance());
///
/// let labels: Vec<Label<'_>> = root.structure().unwrap().map(|(label, _)| label).collect();
/// assert_eq!(labels, vec![Label::Key("a"), Label::Key("b")]);
/// ```
pub struct Iter<'a> {
    entries: Entries<'a>,
    current: Option<(Label<'a>, &'a Value)>,
}

impl<'a> Iter<'a> {
    pub(crate) fn list(items: &'a [Value]) -> Self {
        Self {
            entries: Entries::List(items.iter().enumerate()),
            current: None,
        }
    }

    pub(crate) fn structure(entries: &'a [(String, Value)]) -> Self {
        Self {
            entries: Entries::Struct(entries.iter()),
            current: None,
        }
    }

    /// Moves to the next child. Returns `false` once the children are exhausted.
    pub fn advance(&mut self) -> bool {
        self.next().is_some()
    }

    /// Returns the current child, or `None` before the first advance and after exhaustion.
    pub fn value(&self) -> Option<&'a Value> {
        self.current.map(|(_, value)| value)
    }

    /// Returns the label of the current child.
    pub fn label(&self) -> Option<Label<'a>> {
        self.current.map(|(label, _)| label)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Label<'a>, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match &mut self.entries {
            Entries::Struct(entries) => entries
                .next()
                .map(|(key, value)| (Label::Key(key.as_str()), value)),
            Entries::List(items) => items.next().map(|(index, value)| (Label::Index(index), value)),
        };
        self.current = item;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.entries {
            Entries::Struct(entries) => entries.size_hint(),
            Entries::List(items) => items.size_hint(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Value {
        Value::from_items([Value::from("x"), Value::from("y")])
    }

    #[test]
    fn test_cursor_walks_list() {
        let value = list();
        let mut cursor = value.list().unwrap();

        assert!(cursor.value().is_none());
        assert!(cursor.label().is_none());

        assert!(cursor.advance());
        assert_eq!(cursor.label(), Some(Label::Index(0)));
        assert_eq!(cursor.value().unwrap().as_string().unwrap(), "x");

        assert!(cursor.advance());
        assert_eq!(cursor.label().unwrap().to_string(), "1");

        assert!(!cursor.advance());
        assert!(cursor.value().is_none());
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        let value = list();
        let mut cursor = value.list().unwrap();
        while cursor.advance() {}
        for _ in 0..3 {
            assert!(!cursor.advance());
        }
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_struct_labels_keep_insertion_order() {
        let value = Value::from_entries([
            ("zeta", Value::from(1i64)),
            ("alpha", Value::from(2i64)),
        ]);
        let keys: Vec<&str> = value
            .structure()
            .unwrap()
            .filter_map(|(label, _)| label.as_key())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_iterators_are_independent() {
        let value = list();
        let mut first = value.list().unwrap();
        first.advance();
        first.advance();

        let second = value.list().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(first.len(), 0);
    }

    #[test]
    fn test_empty_list() {
        let value = Value::from_items(Vec::new());
        let mut cursor = value.list().unwrap();
        assert!(!cursor.advance());
    }
}
