// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing loader implementations.
//!
//! This module contains concrete implementations of the [`Loader`](crate::ports::Loader)
//! trait, one per file format. Each loader accepts a single file or a directory; the
//! documents of a directory are merged in ascending path order.

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "yaml")]
pub mod yaml;

// Re-export adapters based on feature flags
#[cfg(feature = "json")]
pub use json::JsonLoader;
#[cfg(feature = "yaml")]
pub use yaml::YamlLoader;

#[cfg(any(feature = "yaml", feature = "json"))]
use crate::{
    domain::{Result, Value},
    ports::Files,
};
#[cfg(any(feature = "yaml", feature = "json"))]
use std::path::Path;

/// Parses every file with `parse` and merges the documents in path order.
///
/// Each node is stamped with the file it came from. Struct documents merge
/// recursively and any other collision goes to the later file. Null documents
/// (empty files) contribute nothing. Errors name the offending file when it
/// differs from the requested path.
#[cfg(any(feature = "yaml", feature = "json"))]
pub(crate) fn merge_documents<F>(path: &Path, files: &Files, parse: F) -> Result<Value>
where
    F: Fn(&[u8]) -> Result<Value>,
{
    let mut merged: Option<Value> = None;

    for (file, content) in files {
        let document = parse(content).map_err(|e| {
            if file.as_path() == path {
                e
            } else {
                e.at_path(file)
            }
        })?;
        if document.is_null() && files.len() > 1 {
            tracing::debug!("Skipping empty document '{}'", file.display());
            continue;
        }

        let document = document.with_origin(file);
        merged = Some(match merged {
            Some(previous) => previous.merged(document),
            None => document,
        });
    }

    Ok(merged.unwrap_or_else(Value::null))
}
