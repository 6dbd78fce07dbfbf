//! Tokio runtime spawner implementation.

use std::future::Future;

use crate::core::PoolError;

use super::Spawn;

/// Tokio-based spawner that runs pool tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Create a `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Create a `TokioSpawner` for the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NoRuntime` when called outside a tokio runtime.
    pub fn current() -> Result<Self, PoolError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| PoolError::NoRuntime(e.to_string()))
    }

    /// The underlying runtime handle.
    #[must_use]
    pub const fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.handle.spawn(fut));
    }
}
