//! Error types for pool construction and routed work failures.

use thiserror::Error;

/// Why a [`WorkContext`](crate::core::WorkContext) is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context, or one of its ancestors, was cancelled.
    #[error("context canceled")]
    Cancelled,
    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Errors delivered to the pool's error handler.
#[derive(Debug, Error)]
pub enum WorkError {
    /// The work item could not be handed to a worker before its context expired.
    #[error("failed to send work item to a worker before the context expired")]
    CantDo,
    /// The work item's own context ended while a worker held it.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The work returned an error; passed through verbatim.
    #[error(transparent)]
    Action(anyhow::Error),
    /// The work panicked.
    #[error("work item panicked: {0}")]
    Panicked(String),
}

impl WorkError {
    /// Classify an error returned by work.
    ///
    /// A bare [`ContextError`] becomes [`WorkError::Context`]; anything else is
    /// kept verbatim as [`WorkError::Action`].
    #[must_use]
    pub fn from_work(err: anyhow::Error) -> Self {
        // anyhow also downcasts through `.context()` wrappers, so only the
        // outermost error decides.
        let bare = err
            .chain()
            .next()
            .and_then(|outer| outer.downcast_ref::<ContextError>().copied());
        match bare {
            Some(ctx_err) => Self::Context(ctx_err),
            None => Self::Action(err),
        }
    }

    /// Whether this error is, or wraps, a context cancellation or deadline.
    #[must_use]
    pub fn is_context(&self) -> bool {
        match self {
            Self::Context(_) => true,
            Self::Action(err) => err.chain().any(|cause| cause.is::<ContextError>()),
            Self::CantDo | Self::Panicked(_) => false,
        }
    }

    /// The context error carried by this error, if any.
    #[must_use]
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Context(ctx_err) => Some(*ctx_err),
            Self::Action(err) => err
                .chain()
                .find_map(|cause| cause.downcast_ref::<ContextError>().copied()),
            Self::CantDo | Self::Panicked(_) => None,
        }
    }
}

/// Errors produced while building a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No tokio runtime was available to spawn workers on.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
}

/// Application-facing result using anyhow for work and higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
