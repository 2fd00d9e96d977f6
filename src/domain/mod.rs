// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the value model.
//!
//! This module contains the configuration value tree, its dynamic kinds, the checked
//! coercions used to read typed values out of it, and the errors shared by every
//! layer. It is independent of any file format or filesystem concern.

pub mod coerce;
mod de;
pub mod errors;
pub mod iter;
mod json;
pub mod kind;
pub mod number;
pub mod value;

// Re-export commonly used types
pub use coerce::Dynamic;
pub use errors::{ConfigError, Result};
pub use iter::{Iter, Label};
pub use kind::Kind;
pub use number::{Decimal, Number};
pub use value::{Node, Value};
