// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the traits that connect the value model to the outside:
//! loaders that produce value trees from file content, and decode targets that
//! consume them. Loaders are implemented by adapters in the adapters layer.

pub mod decoder;
pub mod loader;

// Re-export commonly used types
pub use decoder::{Decode, DecodeContext};
pub use loader::{Files, Loader, RegisterHook};
