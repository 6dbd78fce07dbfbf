//! Units of work and the per-item finish bookkeeping.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::wait_group::WaitGroup;
use super::{AppResult, WorkContext};

/// A unit of work that understands its [`WorkContext`].
///
/// Well-behaved work watches `ctx` and returns once it is done, usually with
/// `ctx.check()?` or by racing `ctx.done()`. Closures of the shape
/// `FnOnce(WorkContext) -> impl Future<Output = AppResult<()>>` are accepted
/// directly by [`Pool::submit`](crate::core::Pool::submit).
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use ctxpool::core::{AppResult, Work, WorkContext};
///
/// struct Fetch {
///     url: String,
/// }
///
/// #[async_trait]
/// impl Work for Fetch {
///     async fn run(self: Box<Self>, ctx: WorkContext) -> AppResult<()> {
///         tokio::select! {
///             () = ctx.done() => Err(ctx.check().unwrap_err().into()),
///             body = download(&self.url) => body.map(drop),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + 'static {
    /// Run the work to completion under `ctx`.
    async fn run(self: Box<Self>, ctx: WorkContext) -> AppResult<()>;
}

/// Adapter turning a closure into [`Work`].
pub(crate) struct FnWork<F>(pub(crate) F);

#[async_trait]
impl<F, Fut> Work for FnWork<F>
where
    F: FnOnce(WorkContext) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    async fn run(self: Box<Self>, ctx: WorkContext) -> AppResult<()> {
        (self.0)(ctx).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemState {
    Pending,
    Finished,
}

/// Work plus its context and the pool's pending counter.
///
/// Shared between the admission path and the worker that claims it; whichever
/// notices termination first calls [`WorkItem::finish`].
pub(crate) struct WorkItem {
    id: u64,
    ctx: WorkContext,
    work: Mutex<Option<Box<dyn Work>>>,
    state: Mutex<ItemState>,
    pending: Arc<WaitGroup>,
}

impl WorkItem {
    /// Build an item. The caller has already counted it in `pending`.
    pub(crate) fn new(
        id: u64,
        ctx: WorkContext,
        work: Box<dyn Work>,
        pending: Arc<WaitGroup>,
    ) -> Self {
        Self {
            id,
            ctx,
            work: Mutex::new(Some(work)),
            state: Mutex::new(ItemState::Pending),
            pending,
        }
    }

    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    pub(crate) const fn context(&self) -> &WorkContext {
        &self.ctx
    }

    /// Take the work out for execution. Only the first caller gets it.
    pub(crate) fn take_work(&self) -> Option<Box<dyn Work>> {
        self.work.lock().take()
    }

    /// Cancel the item's context and release its pending slot, once.
    ///
    /// Returns `true` if this call did the release.
    pub(crate) fn finish(&self) -> bool {
        let mut state = self.state.lock();
        if *state == ItemState::Finished {
            return false;
        }
        self.ctx.cancel();
        self.pending.done();
        *state = ItemState::Finished;
        drop(state);
        // Unrun work is dropped with the item.
        self.work.lock().take();
        true
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        *self.state.lock() == ItemState::Finished
    }
}
