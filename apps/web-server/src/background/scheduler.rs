//! Cron sweep of expired in-memory page cache entries.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use yatube_infra::InMemoryCache;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Seconds-resolution cron expression.
    pub cache_sweep_schedule: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_sweep_schedule: "0 * * * * *".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            cache_sweep_schedule: std::env::var("CACHE_SWEEP_SCHEDULE")
                .unwrap_or(defaults.cache_sweep_schedule),
        }
    }
}

/// Running sweep job. Dropping it leaves the job running until shutdown.
pub struct CacheSweeper {
    scheduler: JobScheduler,
}

impl CacheSweeper {
    pub async fn start(
        config: &SchedulerConfig,
        cache: Arc<InMemoryCache>,
    ) -> Result<Self, JobSchedulerError> {
        let job = Job::new_async(config.cache_sweep_schedule.as_str(), move |_id, _lock| {
            let cache = cache.clone();
            Box::pin(async move {
                sweep(&cache).await;
            })
        })?;

        let scheduler = JobScheduler::new().await?;
        let job_id = scheduler.add(job).await?;
        scheduler.start().await?;
        tracing::info!(schedule = %config.cache_sweep_schedule, %job_id, "Page cache sweep scheduled");

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.shutdown().await?;
        tracing::info!("Page cache sweep stopped");
        Ok(())
    }
}

pub(crate) async fn sweep(cache: &InMemoryCache) -> usize {
    let removed = cache.purge_expired().await;
    if removed > 0 {
        tracing::debug!(removed, "Swept expired page cache entries");
    }
    removed
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use yatube_core::ports::Cache;

    use super::*;

    #[tokio::test]
    async fn sweep_drops_only_expired_pages() {
        let cache = InMemoryCache::new();
        cache
            .set("page:/", "old", Some(Duration::from_millis(5)))
            .await
            .unwrap();
        cache
            .set("page:/home", "fresh", Some(Duration::from_secs(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(sweep(&cache).await, 1);
        assert_eq!(cache.get("page:/home").await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn malformed_schedule_is_refused() {
        let config = SchedulerConfig {
            enabled: true,
            cache_sweep_schedule: "every minute".to_string(),
        };
        let started = CacheSweeper::start(&config, Arc::new(InMemoryCache::new())).await;
        assert!(started.is_err());
    }
}
