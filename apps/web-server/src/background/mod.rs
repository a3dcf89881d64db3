//! Background jobs.

mod scheduler;

use std::sync::Arc;

use yatube_infra::InMemoryCache;

pub use scheduler::{CacheSweeper, SchedulerConfig};

/// Sweep expired in-memory page cache entries on a schedule. Returns `None`
/// when disabled or when pages live in Redis, which expires keys itself.
pub async fn start_cache_sweep(
    config: SchedulerConfig,
    cache: Option<Arc<InMemoryCache>>,
) -> Result<Option<CacheSweeper>, tokio_cron_scheduler::JobSchedulerError> {
    let Some(cache) = cache else {
        return Ok(None);
    };
    if !config.enabled {
        tracing::info!("Page cache sweep disabled");
        return Ok(None);
    }

    CacheSweeper::start(&config, cache).await.map(Some)
}
