//! # ctxpool
//!
//! A bounded worker pool for cancellable work.
//!
//! Work runs on a fixed number of workers under a [`WorkContext`]: a
//! cancellation token with an optional deadline. Every failure, whether the
//! work could not be admitted in time, ran past its context, returned an error
//! or panicked, is funnelled through one error handler. The pool can be waited
//! on like a wait group and killed like a context.
//!
//! ## Key Features
//!
//! - **Backpressure**: admission waits for a free worker or buffer slot, up to
//!   the item's own deadline
//! - **Exactly-once completion**: each item is finished once, whichever of
//!   completion, expiry or pool death is seen first
//! - **One error per context expiry**: the worker and the work never both
//!   report the same deadline
//! - **Single error sink**: errors are handled inline or on spawned tasks
//! - **Join barrier**: [`Pool::wait`], [`Pool::wait_blocking`] and the
//!   `'static` [`Pool::done`] future
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use ctxpool::{Pool, WorkContext, WorkError};
//!
//! let pool = Pool::builder()
//!     .workers(4)
//!     .error_handler(|_pool, err: WorkError| eprintln!("failed: {err}"))
//!     .build()?;
//!
//! for url in urls {
//!     let ctx = WorkContext::background().with_timeout(Duration::from_secs(2));
//!     pool.submit(&ctx, move |ctx| async move {
//!         tokio::select! {
//!             () = ctx.done() => Err(ctx.check().unwrap_err().into()),
//!             res = fetch(&url) => res,
//!         }
//!     })
//!     .await;
//! }
//!
//! pool.wait().await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Pool, worker, work item and error routing.
pub mod core;
/// Configuration models for pools.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Runtime adapters used to spawn pool tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::builders::PoolBuilder;
pub use crate::config::PoolConfig;
pub use crate::core::{
    AppResult, ContextError, DeathSignal, ErrorHandler, Pool, PoolError, PoolStats, Work,
    WorkContext, WorkError,
};
