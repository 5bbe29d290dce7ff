//! Populate-once caches for gateway listings.
//!
//! A [`Cached`] value is filled on first use and then served from memory until
//! [`Cached::reset`] is called or its optional TTL runs out. Expiry is checked
//! by [`Cached::is_loaded`] only, so a value read right after a load is never
//! dropped mid-operation.

use std::time::{Duration, Instant};

/// A lazily filled value with an optional time-to-live.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<(T, Instant)>,
    ttl: Option<Duration>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> Cached<T> {
    /// An empty cache. `None` keeps values until reset.
    pub const fn new(ttl: Option<Duration>) -> Self {
        Self {
            value: None,
            ttl,
        }
    }

    /// The stored value, regardless of age.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref().map(|(value, _)| value)
    }

    /// Store a freshly loaded value and return a reference to it.
    pub fn set(&mut self, value: T) -> &T {
        let (value, _) = self.value.insert((value, Instant::now()));
        value
    }

    /// Drop the cached value.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Whether a value is stored and still within its TTL.
    pub fn is_loaded(&self) -> bool {
        match &self.value {
            Some((_, loaded_at)) => !self.ttl.is_some_and(|ttl| loaded_at.elapsed() >= ttl),
            None => false,
        }
    }
}
