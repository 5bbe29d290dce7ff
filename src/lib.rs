//! dxpm - a package manager for Salesforce DX projects.
//!
//! dxpm installs unlocked and managed packages into Salesforce orgs together
//! with everything they depend on, and keeps the project's
//! `sfdx-project.json` in step with what was actually installed.
//!
//! # Architecture Overview
//!
//! All contact with orgs and the dev hub goes through the `sfdx` CLI. Nothing
//! is persisted between runs except the manifest itself:
//!
//! - `sfdx-project.json` lists each dependency of the first package directory
//!   and maps its name to the installed version id in `packageAliases`
//! - org, package version and installed-package listings are fetched on
//!   demand and cached for the duration of one command
//!
//! A typical install flows through the modules like this:
//!
//! ```text
//! cli ─▶ installer ─▶ resolver::identity   (alias → username / version id)
//!                 ├─▶ resolver::graph      (metadata, installed state, cycles)
//!                 ├─▶ sfdx                 (install action)
//!                 └─▶ manifest             (record the dependency)
//! ```
//!
//! # Modules
//!
//! - [`cli`] - `install`, `uninstall` and `org` commands
//! - [`config`] - global settings from `~/.dxpm/config.toml`
//! - [`core`] - error types and user-facing error rendering
//! - [`installer`] - the install/uninstall orchestrator
//! - [`manifest`] - `sfdx-project.json` parsing and locked updates
//! - [`resolver`] - alias resolution and dependency discovery
//! - [`sfdx`] - the [`Gateway`](sfdx::Gateway) trait and its `sfdx` implementation
//! - [`utils`] - atomic file writes
//! - [`version`] - version string ordering
//!
//! # Package references
//!
//! Wherever a package is expected, dxpm accepts:
//!
//! | Form            | Example            | Meaning                          |
//! |-----------------|--------------------|----------------------------------|
//! | version id      | `04t5g000000ABCD`  | exactly this version             |
//! | package id      | `0Ho5g000000WXYZ`  | latest version of the package    |
//! | name            | `Logger`           | latest version of the package    |
//! | name@LATEST     | `Logger@LATEST`    | latest version of the package    |
//! | name@version    | `Logger@2.1.0.3`   | exactly this version string      |
//!
//! Orgs can be named by alias, org id (`00D...`) or username.

pub mod cli;
pub mod config;
pub mod core;
pub mod installer;
pub mod manifest;
pub mod resolver;
pub mod sfdx;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
