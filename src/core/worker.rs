//! Worker loop: claims admitted items and races each against its context and
//! the pool's death.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flume::Receiver;
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::runtime::{Spawn, TokioSpawner};

use super::error_router::ErrorSink;
use super::pool::PoolCounters;
use super::work_item::WorkItem;
use super::{ContextError, WorkError};

/// One worker's view of the pool.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) admission: Receiver<Arc<WorkItem>>,
    pub(crate) death: CancellationToken,
    pub(crate) errors: ErrorSink,
    pub(crate) counters: Arc<PoolCounters>,
    pub(crate) spawner: TokioSpawner,
}

impl Worker {
    /// Main loop. Returns once the pool dies.
    pub(crate) async fn run(self) {
        debug!(worker_id = self.id, "worker started");

        loop {
            let item = tokio::select! {
                biased;
                () = self.death.cancelled() => break,
                received = self.admission.recv_async() => match received {
                    Ok(item) => item,
                    Err(_) => {
                        debug!(worker_id = self.id, "admission channel closed");
                        break;
                    }
                },
            };

            self.execute(&item).await;

            if item.finish() {
                self.counters.finished.fetch_add(1, Ordering::Relaxed);
            }

            // Don't pick up new work once the pool is dying.
            if self.death.is_cancelled() {
                break;
            }
        }

        debug!(worker_id = self.id, "worker exiting");
    }

    async fn execute(&self, item: &WorkItem) {
        let item_id = item.id();

        // Both select branches can be ready at once; death wins.
        if self.death.is_cancelled() {
            debug!(worker_id = self.id, item_id, "pool dead, abandoning work item");
            self.counters.abandoned.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let ctx = item.context().clone();
        if let Some(reason) = ctx.err() {
            debug!(worker_id = self.id, item_id, %reason, "work item expired before it started");
            self.errors.route(WorkError::Context(reason)).await;
            return;
        }

        let Some(work) = item.take_work() else {
            return;
        };

        self.counters.executed.fetch_add(1, Ordering::Relaxed);
        debug!(worker_id = self.id, item_id, "executing work item");

        // At most one context error per item, whoever sees it first.
        let ctx_reported = Arc::new(AtomicBool::new(false));
        let (finished_tx, finished_rx) = oneshot::channel::<()>();

        {
            let ctx = ctx.clone();
            let errors = self.errors.clone();
            let ctx_reported = Arc::clone(&ctx_reported);
            let worker_id = self.id;
            self.spawner.spawn(async move {
                let outcome = AssertUnwindSafe(work.run(ctx)).catch_unwind().await;
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        let err = WorkError::from_work(err);
                        let first_ctx_report = !ctx_reported.swap(true, Ordering::AcqRel);
                        if !err.is_context() || first_ctx_report {
                            errors.route(err).await;
                        }
                    }
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        warn!(worker_id, item_id, panic = %message, "work item panicked");
                        errors.route(WorkError::Panicked(message)).await;
                    }
                }
                drop(finished_tx);
            });
        }

        tokio::select! {
            biased;
            _ = finished_rx => {
                debug!(worker_id = self.id, item_id, "work item completed");
            }
            () = self.death.cancelled() => {
                debug!(worker_id = self.id, item_id, "pool died during work item");
                self.counters.abandoned.fetch_add(1, Ordering::Relaxed);
            }
            () = ctx.done() => {
                if !ctx_reported.swap(true, Ordering::AcqRel) {
                    let reason = ctx.err().unwrap_or(ContextError::Cancelled);
                    debug!(worker_id = self.id, item_id, %reason, "work item context ended");
                    self.errors.route(WorkError::Context(reason)).await;
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
