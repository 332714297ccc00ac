//! Random provider and credential selection.

use gateway_core::{GatewayError, GatewayResult, ModelRoute, ProviderDescriptor};
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Source of uniform index draws
pub trait RandomSource: Send + Sync {
    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Replays a fixed sequence of draws, wrapping around.
///
/// Each value is reduced modulo the requested length.
#[derive(Debug, Default)]
pub struct FixedRandom {
    draws: Vec<usize>,
    cursor: AtomicUsize,
}

impl FixedRandom {
    /// Sequence to replay
    #[must_use]
    pub fn new(draws: Vec<usize>) -> Self {
        Self {
            draws,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedRandom {
    fn pick(&self, len: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.draws.len();
        self.draws[i] % len
    }
}

/// Uniform random selector; keeps no state between calls
#[derive(Clone)]
pub struct ProviderSelector {
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for ProviderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelector").finish_non_exhaustive()
    }
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl ProviderSelector {
    /// Selector over a random source
    #[must_use]
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Draw one provider, then one of its credentials.
    ///
    /// The drawn credential replaces the descriptor's active one.
    pub fn select(&self, route: &ModelRoute) -> GatewayResult<ProviderDescriptor> {
        if route.is_empty() {
            return Err(GatewayError::NoProviderAvailable(route.model.clone()));
        }

        let index = self.random.pick(route.providers.len());
        let mut descriptor = route.providers[index].clone();

        if descriptor.api_keys.len() > 1 {
            let key = self.random.pick(descriptor.api_keys.len());
            descriptor.api_key = descriptor.api_keys[key].clone();
        }

        Ok(descriptor)
    }
}
