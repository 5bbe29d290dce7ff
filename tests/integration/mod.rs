//! Integration test suite for dxpm
//!
//! End-to-end tests that drive the public API against a temporary project
//! directory and the in-memory gateway from `dxpm_cli::test_utils`.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **install**: dependency ordering, idempotence, short-circuits, partial
//!   failure and cycles
//! - **uninstall**: unconditional uninstall and manifest cleanup
//! - **manifest**: preservation of unknown fields and concurrent updates

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod install;
mod manifest;
mod uninstall;
