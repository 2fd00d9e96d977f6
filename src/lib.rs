// SPDX-License-Identifier: MIT OR Apache-2.0

//! A format-agnostic configuration tree with checked coercions.
//!
//! An application binds one [`Loader`](ports::Loader) for its file format, loads a file
//! or directory into a generic value tree, and reads typed values out of that tree by
//! structural path. Numeric reads never silently lose precision or sign, and a reload
//! swaps the whole tree atomically while other threads keep reading.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: The value tree and its kinds, checked coercions, errors
//!   (`Value`, `Kind`, `ConfigError`)
//! - **Ports**: Trait definitions that define interfaces (`Loader`, `Decode`)
//! - **Adapters**: Loaders for specific file formats (YAML, JSON)
//! - **Service**: Path resolution and the registry that holds the active tree
//!
//! # Feature Flags
//!
//! - `yaml`: Enable the YAML loader (default)
//! - `json`: Enable the JSON loader (default)
//! - `full`: Enable all features
//!
//! The canonical JSON form of a tree is always available.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cfgtree::prelude::*;
//!
//! # fn main() -> Result<()> {
//! cfgtree::use_loader(YamlLoader::new())?;
//! cfgtree::load_configs("/etc/myapp/conf.d")?;
//!
//! if let Some(port) = cfgtree::lookup(["server", "port"]) {
//!     let port: u16 = port.decode()?;
//!     println!("listening on {}", port);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use service::registry::{clear, global, load_configs, lookup, root, use_loader};

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigError, Decimal, Kind, Label, Number, Result, Value};
    pub use crate::ports::{Decode, DecodeContext, Files, Loader, RegisterHook};
    pub use crate::service::Registry;

    // Re-export adapters based on feature flags
    #[cfg(feature = "json")]
    pub use crate::adapters::JsonLoader;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlLoader;
}
