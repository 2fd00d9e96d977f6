// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the registry and path resolution.
//!
//! This module binds loaders to the filesystem: the path resolver selects and reads
//! the files for a load, and the registry installs the resulting tree for concurrent
//! readers.

pub mod path_resolver;
pub mod registry;

// Re-export commonly used types
pub use path_resolver::{clean_path, default_config_dir, load_from_path, MAX_CONFIG_FILE_SIZE};
pub use registry::{global, Registry};
