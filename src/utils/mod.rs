//! Shared utilities.
//!
//! - [`fs`] - atomic writes and directory helpers

pub mod fs;

pub use fs::{atomic_write, ensure_dir};
