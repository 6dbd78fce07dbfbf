//! Cancellable execution context handed to every unit of work.
//!
//! A [`WorkContext`] pairs a [`CancellationToken`] with an optional deadline.
//! Children share their parent's cancellation and keep the earlier of the two
//! deadlines, so cancelling a parent reaches every item derived from it while
//! cancelling an item never reaches back up.
//!
//! The first reason observed for a context sticks: a context that expired and
//! was cancelled afterwards keeps reporting `DeadlineExceeded`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ContextError;

/// Cancellation token plus optional deadline.
#[derive(Debug, Clone)]
pub struct WorkContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    // Shared by clones, fresh for children.
    reason: Arc<Mutex<Option<ContextError>>>,
}

impl Default for WorkContext {
    fn default() -> Self {
        Self::background()
    }
}

impl WorkContext {
    /// A root context that is never done unless cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            reason: Arc::default(),
        }
    }

    /// A child context that is done when this one is, or when cancelled itself.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            reason: Arc::default(),
        }
    }

    /// A child context that also expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context that also expires at `deadline`.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = self.deadline.map_or(deadline, |parent| parent.min(deadline));
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
            reason: Arc::default(),
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        {
            let mut reason = self.reason.lock();
            if reason.is_none() {
                *reason = Some(if self.expired() {
                    ContextError::DeadlineExceeded
                } else {
                    ContextError::Cancelled
                });
            }
        }
        self.token.cancel();
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= Instant::now())
    }

    /// The deadline, if one applies.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        let mut reason = self.reason.lock();
        if reason.is_some() {
            return *reason;
        }
        *reason = if self.expired() {
            Some(ContextError::DeadlineExceeded)
        } else if self.token.is_cancelled() {
            Some(ContextError::Cancelled)
        } else {
            None
        };
        *reason
    }

    /// Whether the context is done.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// `Ok(())` while live, the [`ContextError`] once done.
    ///
    /// # Errors
    ///
    /// Returns the reason the context is done.
    pub fn check(&self) -> Result<(), ContextError> {
        self.err().map_or(Ok(()), Err)
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
                let _ = self.err();
            }
            None => self.token.cancelled().await,
        }
    }
}
