//! Identity resolution and dependency discovery.
//!
//! - [`identity`] - org and package alias resolution ([`IdentityResolver`])
//! - [`graph`] - version metadata, installed state and cycle tracking
//!   ([`DependencyWalker`])
//! - [`cache`] - the resettable, optionally expiring cache both are built on
//!
//! Both components own their caches explicitly. The installer holds one of
//! each for the lifetime of a command and calls `reset()` when it needs fresh
//! state.

pub mod cache;
pub mod graph;
pub mod identity;

pub use cache::Cached;
pub use graph::DependencyWalker;
pub use identity::{IdentityResolver, LATEST};
