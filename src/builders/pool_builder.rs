//! Fluent construction of a [`Pool`].

use std::sync::Arc;

use crate::config::PoolConfig;
use crate::core::{log_errors, ErrorHandler, Pool, PoolError, WorkError};
use crate::runtime::TokioSpawner;

/// Builder for [`Pool`].
///
/// ```rust,ignore
/// let pool = PoolBuilder::new()
///     .workers(4)
///     .admission_buffer(16)
///     .async_errors(true)
///     .error_handler(|pool, err| {
///         tracing::warn!(error = %err, "work failed");
///         if !err.is_context() {
///             pool.kill();
///         }
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct PoolBuilder {
    config: PoolConfig,
    handler: Option<ErrorHandler>,
    spawner: Option<TokioSpawner>,
}

impl PoolBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(config: PoolConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Number of workers.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Admission buffer capacity; zero is a synchronous hand-off.
    #[must_use]
    pub const fn admission_buffer(mut self, capacity: usize) -> Self {
        self.config.admission_buffer = Some(capacity);
        self
    }

    /// Never block submitters on admission.
    #[must_use]
    pub const fn unbounded_admission(mut self) -> Self {
        self.config.admission_buffer = None;
        self
    }

    /// Admit work from a spawned task so `submit` never waits.
    #[must_use]
    pub const fn async_submit(mut self, enabled: bool) -> Self {
        self.config.async_submit = enabled;
        self
    }

    /// Run the error handler on a spawned task per error.
    #[must_use]
    pub const fn async_errors(mut self, enabled: bool) -> Self {
        self.config.async_errors = enabled;
        self
    }

    /// Handler receiving every routed error. Defaults to [`log_errors`].
    #[must_use]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Pool, WorkError) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Run the pool on a specific runtime instead of the current one.
    #[must_use]
    pub fn runtime(mut self, handle: tokio::runtime::Handle) -> Self {
        self.spawner = Some(TokioSpawner::new(handle));
        self
    }

    /// Build and start the pool.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` if the configuration is invalid
    /// - `PoolError::NoRuntime` if no runtime was given and none is current
    pub fn build(self) -> Result<Pool, PoolError> {
        let handler = self.handler.unwrap_or_else(log_errors);
        let spawner = match self.spawner {
            Some(spawner) => spawner,
            None => TokioSpawner::current()?,
        };
        Pool::with_spawner(self.config, handler, spawner)
    }
}
