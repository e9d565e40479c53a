//! Shared utilities.
//!
//! - [`fs`] - directory creation, atomic writes and timestamp-aware copying

pub mod fs;

pub use fs::{atomic_write, copy_dir, copy_if_modified, ensure_dir, safe_write};
