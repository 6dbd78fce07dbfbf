//! Single consumer of every error the pool produces.
//!
//! Workers and the admission path push errors through an [`ErrorSink`]; one
//! router task per pool drains them into the user's handler until the pool
//! dies. The error channel is a rendezvous channel, so with inline dispatch a
//! slow handler back-pressures whoever is reporting.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use flume::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::runtime::{Spawn, TokioSpawner};

use super::pool::{Pool, PoolCounters, PoolInner};
use super::WorkError;

/// Callback receiving every routed error together with the pool it came from.
pub type ErrorHandler = Arc<dyn Fn(&Pool, WorkError) + Send + Sync + 'static>;

/// Handler used when none is supplied: logs each error.
#[must_use]
pub fn log_errors() -> ErrorHandler {
    Arc::new(|pool: &Pool, err: WorkError| {
        error!(pool_id = %pool.id(), error = %err, "unhandled work error");
    })
}

/// Sending half of the error channel, shared by workers and admission.
#[derive(Clone)]
pub(crate) struct ErrorSink {
    tx: Sender<WorkError>,
    death: CancellationToken,
    counters: Arc<PoolCounters>,
}

impl ErrorSink {
    pub(crate) const fn new(
        tx: Sender<WorkError>,
        death: CancellationToken,
        counters: Arc<PoolCounters>,
    ) -> Self {
        Self { tx, death, counters }
    }

    /// Hand `err` to the router, giving up if the pool dies first.
    pub(crate) async fn route(&self, err: WorkError) {
        // `select!` moves `err` into the send future up front, so render it
        // for the death-branch log beforehand.
        let rendered = err.to_string();
        tokio::select! {
            biased;
            () = self.death.cancelled() => {
                debug!(error = %rendered, "pool dead, dropping error");
            }
            sent = self.tx.send_async(err) => match sent {
                Ok(()) => {
                    self.counters.errors_routed.fetch_add(1, Ordering::Relaxed);
                }
                Err(flume::SendError(err)) => {
                    debug!(error = %err, "error router gone, dropping error");
                }
            },
        }
    }
}

/// State owned by the router task.
pub(crate) struct ErrorRouter {
    pub(crate) pool: Weak<PoolInner>,
    pub(crate) rx: Receiver<WorkError>,
    pub(crate) death: CancellationToken,
    pub(crate) handler: ErrorHandler,
    pub(crate) async_dispatch: bool,
    pub(crate) spawner: TokioSpawner,
}

impl ErrorRouter {
    /// Drain errors into the handler until death.
    pub(crate) async fn run(self) {
        loop {
            let err = tokio::select! {
                biased;
                () = self.death.cancelled() => break,
                received = self.rx.recv_async() => match received {
                    Ok(err) => err,
                    Err(_) => break,
                },
            };

            // Both branches can be ready at once; death wins.
            if self.death.is_cancelled() {
                debug!(error = %err, "pool died while routing, dropping error");
                break;
            }

            let Some(inner) = self.pool.upgrade() else {
                break;
            };
            let pool = Pool::from_inner(inner);

            if self.async_dispatch {
                let handler = Arc::clone(&self.handler);
                self.spawner.spawn(async move {
                    handler(&pool, err);
                });
            } else {
                (self.handler)(&pool, err);
            }
        }
        debug!("error router exiting");
    }
}
