//! Pool configuration.

use std::env;

use serde::{Deserialize, Serialize};

/// Upper bound on workers accepted by [`PoolConfig::validate`].
pub const MAX_WORKERS: usize = 1 << 16;

/// Environment variable holding the worker count.
pub const ENV_WORKERS: &str = "CTXPOOL_WORKERS";
/// Environment variable holding the admission buffer (`unbounded` allowed).
pub const ENV_ADMISSION_BUFFER: &str = "CTXPOOL_ADMISSION_BUFFER";
/// Environment variable enabling asynchronous submission.
pub const ENV_ASYNC_SUBMIT: &str = "CTXPOOL_ASYNC_SUBMIT";
/// Environment variable enabling asynchronous error dispatch.
pub const ENV_ASYNC_ERRORS: &str = "CTXPOOL_ASYNC_ERRORS";

/// Configuration for a [`Pool`](crate::core::Pool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of workers. Zero builds a pool that never runs anything.
    pub workers: usize,
    /// Admission channel capacity. `Some(0)` hands items directly to a free
    /// worker, `None` never blocks submitters.
    pub admission_buffer: Option<usize>,
    /// Run the admission wait on a spawned task so `submit` returns at once.
    pub async_submit: bool,
    /// Call the error handler on a spawned task per error instead of inline.
    pub async_errors: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            admission_buffer: Some(0),
            async_submit: false,
            async_errors: false,
        }
    }
}

impl PoolConfig {
    /// Default configuration: one worker per CPU, synchronous hand-off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Buffer up to `capacity` admitted items.
    #[must_use]
    pub const fn with_admission_buffer(mut self, capacity: usize) -> Self {
        self.admission_buffer = Some(capacity);
        self
    }

    /// Never block submitters on admission.
    #[must_use]
    pub const fn with_unbounded_admission(mut self) -> Self {
        self.admission_buffer = None;
        self
    }

    /// Toggle asynchronous submission.
    #[must_use]
    pub const fn with_async_submit(mut self, enabled: bool) -> Self {
        self.async_submit = enabled;
        self
    }

    /// Toggle asynchronous error dispatch.
    #[must_use]
    pub const fn with_async_errors(mut self, enabled: bool) -> Self {
        self.async_errors = enabled;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers > MAX_WORKERS {
            return Err(format!(
                "workers must be at most {MAX_WORKERS}, got {}",
                self.workers
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `CTXPOOL_*` environment variables, loading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable or invalid value.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup<L>(lookup: L) -> Result<Self, String>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_WORKERS) {
            cfg.workers = raw
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_WORKERS}: {e}"))?;
        }
        if let Some(raw) = lookup(ENV_ADMISSION_BUFFER) {
            let raw = raw.trim();
            cfg.admission_buffer = if raw.eq_ignore_ascii_case("unbounded") {
                None
            } else {
                Some(
                    raw.parse()
                        .map_err(|e| format!("{ENV_ADMISSION_BUFFER}: {e}"))?,
                )
            };
        }
        if let Some(raw) = lookup(ENV_ASYNC_SUBMIT) {
            cfg.async_submit = parse_flag(ENV_ASYNC_SUBMIT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ASYNC_ERRORS) {
            cfg.async_errors = parse_flag(ENV_ASYNC_ERRORS, &raw)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("{key}: expected a boolean, got `{other}`")),
    }
}
