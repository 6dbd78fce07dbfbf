//! Pool, worker and work-item core.

pub mod context;
pub mod error;
pub mod error_router;
pub mod pool;
pub mod work_item;

mod wait_group;
mod worker;

pub use context::WorkContext;
pub use error::{AppResult, ContextError, PoolError, WorkError};
pub use error_router::{log_errors, ErrorHandler};
pub use pool::{DeathSignal, Pool, PoolStats};
pub use work_item::Work;
