//! Cache, connectivity, retry, and repository layer between callers and the wine store.

use std::time::Duration;

pub mod cache;
pub mod connection;
pub mod optimistic;
pub mod repository;
pub mod retry;

#[cfg(test)]
mod fake;

pub use cache::{WineCache, WineList};
pub use connection::{ConnectionMonitor, ConnectionState, NetworkEvent};
pub use optimistic::{is_temp_id, OptimisticWrites, WriteHandle, TEMP_ID_PREFIX};
pub use repository::WineRepository;
pub use retry::{RetryExecutor, RetryPolicy};

/// How long a full reload stays fresh.
pub const CACHE_VALIDITY: Duration = Duration::from_secs(10 * 60);

/// Upper bound for a full listing before falling back to cached data.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound for an interactive create before keeping the record offline.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(4);

/// Timing knobs of the sync layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    pub cache_validity: Duration,
    pub load_timeout: Duration,
    pub write_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cache_validity: CACHE_VALIDITY,
            load_timeout: LOAD_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}
