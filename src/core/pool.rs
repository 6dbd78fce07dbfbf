//! The pool facade: admission, shutdown and join.
//!
//! A [`Pool`] owns a fixed set of worker tasks, a shared admission channel, a
//! one-shot death signal, the pending-work counter and the error router.
//! Handles are cheap to clone; the last handle dropped kills the pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use ctxpool::config::PoolConfig;
//! use ctxpool::core::{Pool, WorkContext};
//!
//! let pool = Pool::new(
//!     PoolConfig::new().with_workers(4),
//!     std::sync::Arc::new(|pool: &Pool, err| {
//!         eprintln!("work failed: {err}");
//!         pool.kill();
//!     }),
//! )?;
//!
//! let ctx = WorkContext::background().with_timeout(Duration::from_secs(5));
//! pool.submit(&ctx, |ctx| async move {
//!     ctx.check()?;
//!     Ok(())
//! })
//! .await;
//!
//! pool.wait().await;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flume::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::builders::PoolBuilder;
use crate::config::PoolConfig;
use crate::runtime::{Spawn, TokioSpawner};

use super::error_router::{ErrorHandler, ErrorRouter, ErrorSink};
use super::wait_group::WaitGroup;
use super::work_item::{FnWork, WorkItem};
use super::worker::Worker;
use super::{AppResult, PoolError, Work, WorkContext, WorkError};

/// Statistics about pool activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of workers.
    pub worker_count: usize,
    /// Items admitted but not yet finished.
    pub pending: usize,
    /// Items accepted by `submit` while the pool was alive.
    pub submitted: u64,
    /// Items whose work started running.
    pub executed: u64,
    /// Items finished by any path.
    pub finished: u64,
    /// Errors delivered to the router.
    pub errors_routed: u64,
    /// Items dropped because the pool died.
    pub abandoned: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted: AtomicU64,
    pub executed: AtomicU64,
    pub finished: AtomicU64,
    pub errors_routed: AtomicU64,
    pub abandoned: AtomicU64,
}

impl PoolCounters {
    fn snapshot(&self, worker_count: usize, pending: usize) -> PoolStats {
        PoolStats {
            worker_count,
            pending,
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            finished: self.finished.load(Ordering::Relaxed),
            errors_routed: self.errors_routed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Observable, irreversible pool-termination event.
#[derive(Debug, Clone)]
pub struct DeathSignal {
    token: CancellationToken,
}

impl DeathSignal {
    /// Whether the pool has died.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the pool has died.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

pub(crate) struct PoolInner {
    id: Uuid,
    config: PoolConfig,
    death: CancellationToken,
    admission_tx: Sender<Arc<WorkItem>>,
    // Kept so a pool with no workers still blocks admission instead of failing
    // fast, and so `kill` can drain buffered items.
    admission_rx: Receiver<Arc<WorkItem>>,
    errors: ErrorSink,
    pending: Arc<WaitGroup>,
    counters: Arc<PoolCounters>,
    next_item_id: AtomicU64,
    spawner: TokioSpawner,
}

impl PoolInner {
    fn kill(&self) {
        if self.death.is_cancelled() {
            return;
        }
        self.death.cancel();
        info!(pool_id = %self.id, "pool killed");

        // Items still sitting in the buffer will never reach a worker.
        while let Ok(item) = self.admission_rx.try_recv() {
            if item.finish() {
                self.counters.finished.fetch_add(1, Ordering::Relaxed);
                self.counters.abandoned.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        if !self.death.is_cancelled() {
            debug!(pool_id = %self.id, "last pool handle dropped, killing pool");
            self.kill();
        }
    }
}

/// Bounded, cancellation-aware worker pool.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.inner.id)
            .field("workers", &self.inner.config.workers)
            .field("dead", &self.is_dead())
            .finish_non_exhaustive()
    }
}

impl Pool {
    /// Create a pool on the current tokio runtime.
    ///
    /// Spawns `config.workers` worker tasks and one error router.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` if the configuration is invalid
    /// - `PoolError::NoRuntime` if called outside a tokio runtime
    pub fn new(config: PoolConfig, handler: ErrorHandler) -> Result<Self, PoolError> {
        Self::with_spawner(config, handler, TokioSpawner::current()?)
    }

    /// Create a pool whose tasks run on `spawner`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn with_spawner(
        config: PoolConfig,
        handler: ErrorHandler,
        spawner: TokioSpawner,
    ) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        // With no workers nothing may be buffered: every item waits out its
        // context and fails admission.
        let (admission_tx, admission_rx) = match config.admission_buffer {
            _ if config.workers == 0 => flume::bounded(0),
            Some(capacity) => flume::bounded(capacity),
            None => flume::unbounded(),
        };
        // Rendezvous: a reporter waits until the router takes its error.
        let (error_tx, error_rx) = flume::bounded(0);
        let death = CancellationToken::new();
        let counters = Arc::new(PoolCounters::default());
        let errors = ErrorSink::new(error_tx, death.clone(), Arc::clone(&counters));

        let inner = Arc::new(PoolInner {
            id: Uuid::new_v4(),
            config,
            death: death.clone(),
            admission_tx,
            admission_rx: admission_rx.clone(),
            errors: errors.clone(),
            pending: Arc::new(WaitGroup::new()),
            counters: Arc::clone(&counters),
            next_item_id: AtomicU64::new(0),
            spawner: spawner.clone(),
        });

        let router = ErrorRouter {
            pool: Arc::downgrade(&inner),
            rx: error_rx,
            death: death.clone(),
            handler,
            async_dispatch: inner.config.async_errors,
            spawner: spawner.clone(),
        };
        spawner.spawn(router.run());

        for worker_id in 0..inner.config.workers {
            let worker = Worker {
                id: worker_id,
                admission: admission_rx.clone(),
                death: death.clone(),
                errors: errors.clone(),
                counters: Arc::clone(&counters),
                spawner: spawner.clone(),
            };
            spawner.spawn(worker.run());
        }

        info!(
            pool_id = %inner.id,
            workers = inner.config.workers,
            admission_buffer = ?inner.config.admission_buffer,
            async_submit = inner.config.async_submit,
            async_errors = inner.config.async_errors,
            "pool started"
        );

        Ok(Self { inner })
    }

    /// Start building a pool.
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    pub(crate) const fn from_inner(inner: Arc<PoolInner>) -> Self {
        Self { inner }
    }

    /// Unique identifier of this pool, used in logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The configuration the pool was built with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Submit a closure under a child of `ctx`.
    ///
    /// See [`Pool::submit_work`].
    pub async fn submit<F, Fut>(&self, ctx: &WorkContext, work: F)
    where
        F: FnOnce(WorkContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.submit_work(ctx, FnWork(work)).await;
    }

    /// Submit work under a child of `ctx`.
    ///
    /// Does nothing if the pool is dead. Otherwise the item counts as pending
    /// until it finishes. Waits until a worker or buffer slot takes the item,
    /// the item's context ends (routing [`WorkError::CantDo`]) or the pool
    /// dies. With `async_submit` configured that wait happens on a spawned
    /// task and this returns immediately.
    pub async fn submit_work<W: Work>(&self, ctx: &WorkContext, work: W) {
        if self.is_dead() {
            debug!(pool_id = %self.inner.id, "pool dead, ignoring submission");
            return;
        }

        let inner = &self.inner;
        inner.pending.add(1);
        inner.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let id = inner.next_item_id.fetch_add(1, Ordering::Relaxed);
        let item = Arc::new(WorkItem::new(
            id,
            ctx.child(),
            Box::new(work),
            Arc::clone(&inner.pending),
        ));

        if inner.config.async_submit {
            let pool = self.clone();
            inner.spawner.spawn(async move { pool.admit(item).await });
        } else {
            self.admit(item).await;
        }
    }

    /// Hand `item` to the admission channel, or finish it trying.
    async fn admit(&self, item: Arc<WorkItem>) {
        let inner = &self.inner;
        let ctx = item.context().clone();

        if ctx.is_done() {
            debug!(pool_id = %inner.id, item_id = item.id(), "work item expired before admission");
            inner.errors.route(WorkError::CantDo).await;
            self.finish(&item);
            return;
        }

        tokio::select! {
            biased;
            () = inner.death.cancelled() => {
                self.abandon(&item);
            }
            () = ctx.done() => {
                debug!(pool_id = %inner.id, item_id = item.id(), "work item expired waiting for a worker");
                inner.errors.route(WorkError::CantDo).await;
                self.finish(&item);
            }
            sent = inner.admission_tx.send_async(Arc::clone(&item)) => {
                if sent.is_err() {
                    self.finish(&item);
                } else if inner.death.is_cancelled() {
                    // `kill` may already have drained the buffer.
                    self.abandon(&item);
                }
            }
        }
    }

    fn abandon(&self, item: &WorkItem) {
        if item.finish() {
            self.inner.counters.finished.fetch_add(1, Ordering::Relaxed);
            self.inner.counters.abandoned.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn finish(&self, item: &WorkItem) {
        if item.finish() {
            self.inner.counters.finished.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Kill the pool. Idempotent.
    ///
    /// Idle workers exit, buffered items are finished without running, and
    /// running items have their context cancelled. Work that ignores its
    /// context keeps running until it returns on its own.
    pub fn kill(&self) {
        self.inner.kill();
    }

    /// Whether the pool has died.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.inner.death.is_cancelled()
    }

    /// Observable of the pool's death.
    #[must_use]
    pub fn death_signal(&self) -> DeathSignal {
        DeathSignal {
            token: self.inner.death.clone(),
        }
    }

    /// Resolves once no work is pending or the pool dies.
    ///
    /// The returned future does not borrow the pool, so it can be stored or
    /// raced in `tokio::select!`.
    pub fn done(&self) -> impl Future<Output = ()> + Send + 'static {
        let pending = Arc::clone(&self.inner.pending);
        let death = self.inner.death.clone();
        async move {
            if death.is_cancelled() {
                return;
            }
            tokio::select! {
                () = pending.wait() => {}
                () = death.cancelled() => {}
            }
        }
    }

    /// Wait until no work is pending or the pool dies.
    pub async fn wait(&self) {
        self.done().await;
    }

    /// Blocking form of [`Pool::wait`] for threads outside the runtime.
    ///
    /// Calling this from a runtime worker thread can deadlock.
    pub fn wait_blocking(&self) {
        futures::executor::block_on(self.done());
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner
            .counters
            .snapshot(self.inner.config.workers, self.inner.pending.count())
    }
}
