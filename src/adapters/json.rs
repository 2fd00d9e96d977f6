// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON configuration loader.

use crate::adapters::merge_documents;
use crate::domain::{ConfigError, Result, Value};
use crate::ports::{Files, Loader};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.json$").expect("default JSON pattern is valid"));

/// Loader for JSON files.
///
/// Integer literals that fit 64 bits become numbers. Any other numeric literal is kept
/// as an exact decimal, so `0.1` reads back as `0.1` and not as its nearest binary float.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::JsonLoader;
/// use cfgtree::domain::Kind;
/// use cfgtree::ports::{Files, Loader};
/// use std::path::Path;
///
/// let mut files = Files::new();
/// files.insert("app.json".into(), br#"{"ratio": 0.1, "retries": 3}"#.to_vec());
///
/// let root = JsonLoader::new().load(Path::new("app.json"), &files).unwrap();
/// assert_eq!(root.lookup(["ratio"]).unwrap().kind(), Kind::Decimal);
/// assert_eq!(root.lookup(["retries"]).unwrap().as_i64().unwrap(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct JsonLoader {
    pattern: Regex,
}

impl JsonLoader {
    /// Creates a JSON loader that selects `.json` files in directories.
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }

    /// Creates a JSON loader with a custom file name pattern for directory loads.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ConfigError::ParseError {
            message: format!("Invalid file name pattern: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { pattern })
    }
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader for JsonLoader {
    fn loader_type(&self) -> &str {
        "json"
    }

    fn allow_dir(&self) -> bool {
        true
    }

    fn path_pattern(&self) -> Option<&Regex> {
        Some(&self.pattern)
    }

    fn load(&self, path: &Path, files: &Files) -> Result<Value> {
        merge_documents(path, files, Value::from_json)
    }

    fn clear(&self) {
        tracing::debug!("Clearing the json loader");
    }
}
