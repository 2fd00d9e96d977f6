// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines every error that can occur while binding a loader, resolving
//! a configuration path, coercing values, or decoding a value tree. All errors use
//! `thiserror` for proper error handling and conversion.
//!
//! Errors raised while resolving a path are wrapped in [`ConfigError::AtPath`] so the
//! offending path is always reported. The wrapper keeps the original error as its
//! source, and [`ConfigError::cause`] peels the wrappers off for programmatic matching.

use crate::domain::kind::Kind;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for configuration operations.
///
/// It is marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::errors::ConfigError;
/// use std::path::Path;
///
/// let err = ConfigError::PathNoContent.at_path(Path::new("/etc/app.yaml"));
/// assert!(matches!(err.cause(), ConfigError::PathNoContent));
/// assert_eq!(err.to_string(), "path has no content (path: /etc/app.yaml)");
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No loader is bound to the registry.
    #[error("loader undefined")]
    LoaderUndefined,

    /// The loader's registration hook rejected the binding.
    #[error("loader '{loader}' rejected registration: {source}")]
    LoaderRegistrationFailed {
        /// The type of the loader that was rejected
        loader: String,
        /// The error returned by the hook
        #[source]
        source: Box<ConfigError>,
    },

    /// The configuration path is empty.
    #[error("path undefined")]
    PathUndefined,

    /// The configuration path does not exist.
    #[error("path not found: {source}")]
    PathNotFound {
        /// The underlying stat error
        #[source]
        source: io::Error,
    },

    /// The configuration path exists but could not be inspected.
    #[error("path unavailable: {source}")]
    PathUnavailable {
        /// The underlying stat error
        #[source]
        source: io::Error,
    },

    /// The file is empty or the directory holds no matching files.
    #[error("path has no content")]
    PathNoContent,

    /// A directory was given to a loader that only accepts single files.
    #[error("only accepts single file, but got directory")]
    PathNotFile,

    /// A configuration file exceeds the size limit.
    #[error("configuration file too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// The size of the file
        size: u64,
        /// The maximum accepted size
        max: u64,
    },

    /// The dynamic type of a source value is not supported by the requested conversion.
    #[error("invalid source type: cannot convert {found} to {expected}")]
    InvalidSourceType {
        /// The requested target type
        expected: &'static str,
        /// The dynamic type that was found
        found: &'static str,
    },

    /// An element of a sequence has an unsupported dynamic type.
    #[error("invalid source element {index}")]
    InvalidSourceElement {
        /// Index of the offending element
        index: usize,
    },

    /// The value is out of range for the target type or not exactly representable.
    #[error("unsafe conversion of {value} to {target}")]
    UnsafeConversion {
        /// The requested target type
        target: &'static str,
        /// The rendered source value
        value: String,
    },

    /// A value has a different kind than the operation requires.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// The kind the operation requires
        expected: Kind,
        /// The kind of the value
        found: Kind,
    },

    /// A loader failed to parse configuration content.
    #[error("failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A value tree could not be decoded into the requested target.
    #[error("failed to decode configuration: {message}")]
    DecodeError {
        /// The error message
        message: String,
    },

    /// A value tree could not be serialized.
    #[error("failed to serialize configuration: {message}")]
    SerializeError {
        /// The error message
        message: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// An error annotated with the path it was raised for.
    #[error("{source} (path: {})", path.display())]
    AtPath {
        /// The offending path
        path: PathBuf,
        /// The original error
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Wraps this error with the path it was raised for.
    pub fn at_path(self, path: &Path) -> Self {
        ConfigError::AtPath {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any path annotations.
    pub fn cause(&self) -> &ConfigError {
        match self {
            ConfigError::AtPath { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Returns the outermost path annotation, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn unsafe_conversion(target: &'static str, value: impl fmt::Display) -> Self {
        ConfigError::UnsafeConversion {
            target,
            value: value.to_string(),
        }
    }
}

impl serde::de::Error for ConfigError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ConfigError::DecodeError {
            message: msg.to_string(),
        }
    }
}

impl serde::ser::Error for ConfigError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ConfigError::SerializeError {
            message: msg.to_string(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
