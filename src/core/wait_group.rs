//! Pending-work counter with an async zero notification.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Counts admitted work that has not finished yet.
#[derive(Debug, Default)]
pub(crate) struct WaitGroup {
    count: Mutex<usize>,
    zero: Notify,
}

impl WaitGroup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, n: usize) {
        *self.count.lock() += n;
    }

    /// Mark one unit of work finished, waking waiters when the count hits zero.
    pub(crate) fn done(&self) {
        let mut count = self.count.lock();
        debug_assert!(*count > 0, "WaitGroup::done called more times than add");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_waiters();
        }
    }

    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Resolves once the count is zero.
    pub(crate) async fn wait(&self) {
        loop {
            // Register before checking so a concurrent `done` cannot be missed.
            let notified = self.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}
