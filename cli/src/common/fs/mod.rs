//! # Causeur Filesystem Utilities
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Filesystem helpers shared by the configuration loader and the transcript.
//! Import from the submodule, e.g. `use crate::common::fs::io::ensure_dir_exists;`.
//!

/// Contains basic file I/O operations (`ensure_dir_exists`, `read_file_to_string`).
pub mod io;
