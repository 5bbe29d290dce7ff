//! Core types for dxpm.
//!
//! ## Error Management
//! - [`DxpmError`] - typed failure modes of the install/uninstall pipeline
//! - [`ErrorContext`] - error wrapper with details and suggestions for CLI output
//! - [`user_friendly_error`] - attach suggestions to known error kinds
//!
//! Operations return [`anyhow::Result`]; typed errors are recovered with
//! `downcast_ref::<DxpmError>()`.
//!
//! ```rust,no_run
//! use dxpm_cli::core::{DxpmError, user_friendly_error};
//!
//! fn run() -> anyhow::Result<()> {
//!     Err(DxpmError::NoDefaultDevHub.into())
//! }
//!
//! if let Err(e) = run() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{DxpmError, ErrorContext, user_friendly_error};
