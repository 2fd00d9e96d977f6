// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loader trait definition.
//!
//! This module defines the `Loader` trait, the port through which a concrete file
//! format is plugged into the registry. A loader receives the raw content of every
//! file selected for a path and turns it into a single value tree. Finding, filtering
//! and reading the files is done by the path resolver, not by the loader.

use crate::domain::{Result, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The files selected for a load, keyed by path in ascending order.
///
/// A single-file load holds exactly one entry keyed by the requested path.
pub type Files = BTreeMap<PathBuf, Vec<u8>>;

/// A hook run when a loader is bound to a registry.
///
/// Loaders that need to validate their own setup before they are used expose this
/// capability through [`Loader::register_hook`]. A failing hook rejects the binding
/// and leaves the registry unchanged.
pub trait RegisterHook: Send + Sync {
    /// Called once at binding time.
    fn on_register(&self) -> Result<()>;
}

/// A trait for configuration format loaders.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the registry shares one loader between
/// every thread that reloads configuration.
///
/// # Examples
///
/// ```rust
/// use cfgtree::domain::{Result, Value};
/// use cfgtree::ports::{Files, Loader};
/// use regex::Regex;
/// use std::path::Path;
///
/// /// Reads each file as one line-oriented list of strings.
/// struct LinesLoader;
///
/// impl Loader for LinesLoader {
///     fn loader_type(&self) -> &str {
///         "lines"
///     }
///
///     fn allow_dir(&self) -> bool {
///         false
///     }
///
///     fn path_pattern(&self) -> Option<&Regex> {
///         None
///     }
///
///     fn load(&self, _path: &Path, files: &Files) -> Result<Value> {
///         let lines = files
///             .values()
///             .flat_map(|content| String::from_utf8_lossy(content).lines().map(Value::from).collect::<Vec<_>>());
///         Ok(Value::from_items(lines))
///     }
///
///     fn clear(&self) {}
/// }
///
/// let mut files = Files::new();
/// files.insert("motd".into(), b"hello\nworld".to_vec());
/// let value = LinesLoader.load(Path::new("motd"), &files).unwrap();
/// assert_eq!(value.as_string_list().unwrap(), vec!["hello", "world"]);
/// ```
pub trait Loader: Send + Sync {
    /// Returns the type of this loader, such as `"yaml"` or `"json"`.
    ///
    /// Used for logging and error messages.
    fn loader_type(&self) -> &str;

    /// Returns `true` if this loader accepts a directory path.
    ///
    /// When `false`, loading a directory fails with
    /// [`ConfigError::PathNotFile`](crate::domain::ConfigError::PathNotFile) before
    /// anything is read.
    fn allow_dir(&self) -> bool;

    /// Returns the pattern that file names inside a directory must match.
    ///
    /// `None` selects every file. The pattern is never applied to an explicitly
    /// requested single file.
    fn path_pattern(&self) -> Option<&Regex>;

    /// Builds a value tree from the selected files.
    ///
    /// `path` is the cleaned path that was requested. `files` is never empty, and
    /// no single-file entry is empty after trimming.
    fn load(&self, path: &Path, files: &Files) -> Result<Value>;

    /// Releases any state the loader caches between loads.
    fn clear(&self);

    /// Returns the registration hook of this loader, if it has one.
    fn register_hook(&self) -> Option<&dyn RegisterHook> {
        None
    }
}
