// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML configuration loader.
//!
//! This module provides a loader that builds value trees from YAML documents. A
//! directory load reads every `.yaml`/`.yml` file below the directory and merges the
//! documents in path order.

use crate::adapters::merge_documents;
use crate::domain::{ConfigError, Node, Result, Value};
use crate::ports::{Files, Loader};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.ya?ml$").expect("default YAML pattern is valid"));

/// Loader for YAML files.
///
/// Integers become numbers (signed when they fit an `i64`), floats become binary
/// floats, and mapping keys that are scalars are converted to their text. Tagged
/// values are loaded as their untagged content.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::YamlLoader;
/// use cfgtree::ports::{Files, Loader};
/// use std::path::Path;
///
/// let mut files = Files::new();
/// files.insert("app.yaml".into(), b"database:\n  host: localhost\n  port: 5432".to_vec());
///
/// let root = YamlLoader::new().load(Path::new("app.yaml"), &files).unwrap();
/// assert_eq!(root.lookup(["database", "host"]).unwrap().as_string().unwrap(), "localhost");
/// assert_eq!(root.lookup(["database", "port"]).unwrap().as_u64().unwrap(), 5432);
/// ```
#[derive(Debug, Clone)]
pub struct YamlLoader {
    pattern: Regex,
}

impl YamlLoader {
    /// Creates a YAML loader that selects `.yaml` and `.yml` files in directories.
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Creates a YAML loader with a custom file name pattern for directory loads.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if `pattern` is not a valid regular expression.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ConfigError::ParseError {
            message: format!("Invalid file name pattern: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { pattern })
    }

    /// Parses a single YAML document.
    pub fn parse(content: &[u8]) -> Result<Value> {
        let document: serde_yaml::Value =
            serde_yaml::from_slice(content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;
        convert(document)
    }
}

impl Default for YamlLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn convert(value: serde_yaml::Value) -> Result<Value> {
    let node = match value {
        serde_yaml::Value::Null => Node::Null,
        serde_yaml::Value::Bool(b) => Node::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(Value::from(v));
            }
            if let Some(v) = n.as_u64() {
                return Ok(Value::from(v));
            }
            match n.as_f64() {
                Some(v) => return Ok(Value::from(v)),
                None => {
                    return Err(ConfigError::ParseError {
                        message: format!("Unsupported YAML number: {}", n),
                        source: None,
                    })
                }
            }
        }
        serde_yaml::Value::String(s) => Node::String(s),
        serde_yaml::Value::Sequence(items) => Node::List(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                entries.push((key_to_label(key)?, convert(value)?));
            }
            Node::Struct(entries)
        }
        serde_yaml::Value::Tagged(tagged) => return convert(tagged.value),
    };
    Ok(Value::new(node))
}

fn key_to_label(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => key_to_label(tagged.value),
        other => Err(ConfigError::ParseError {
            message: format!("Unsupported YAML mapping key: {:?}", other),
            source: None,
        }),
    }
}

impl Loader for YamlLoader {
    fn loader_type(&self) -> &str {
        "yaml"
    }

    fn allow_dir(&self) -> bool {
        true
    }

    fn path_pattern(&self) -> Option<&Regex> {
        Some(&self.pattern)
    }

    fn load(&self, path: &Path, files: &Files) -> Result<Value> {
        merge_documents(path, files, Self::parse)
    }

    fn clear(&self) {
        tracing::debug!("Clearing the yaml loader");
    }
}
