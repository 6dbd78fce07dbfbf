//! Runtime adapters used to run workers, the error router and work.

use std::future::Future;

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning detached tasks on a runtime.
pub trait Spawn {
    /// Spawn a detached task.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
