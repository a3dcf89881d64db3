//! Application state - shared across all handlers.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::{Cache, PasswordService, TokenService};
use yatube_core::services::{FeedService, PageCache, PostingService, Repositories};
use yatube_infra::{Argon2PasswordService, InMemoryCache, InMemoryDatabase, JwtTokenService};

use crate::config::{AppConfig, CacheBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub feed: FeedService,
    pub posting: PostingService,
    pub page_cache: PageCache,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Set when pages are cached in process memory; swept periodically.
    pub memory_cache: Option<Arc<InMemoryCache>>,
}

impl AppState {
    pub fn from_parts(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        page_cache_ttl: Duration,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            feed: FeedService::new(repos.clone()),
            posting: PostingService::new(repos.clone()),
            page_cache: PageCache::new(cache, page_cache_ttl),
            repos,
            tokens,
            passwords,
            memory_cache: None,
        }
    }

    /// Everything in process memory. Used when no database is configured
    /// and by the HTTP tests.
    pub fn in_memory(tokens: Arc<dyn TokenService>, page_cache_ttl: Duration) -> Self {
        let cache = Arc::new(InMemoryCache::new());
        let mut state = Self::from_parts(
            InMemoryDatabase::new().repositories(),
            cache.clone(),
            page_cache_ttl,
            tokens,
            Arc::new(Argon2PasswordService::new()),
        );
        state.memory_cache = Some(cache);
        state
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> io::Result<Self> {
        let repos = Self::repositories(config).await?;
        let (cache, memory_cache) = Self::cache(config).await?;

        tracing::info!(
            page_cache_ttl_secs = config.page_cache_ttl.as_secs(),
            "Application state initialized"
        );

        Ok(Self {
            memory_cache,
            ..Self::from_parts(
                repos,
                cache,
                config.page_cache_ttl,
                Arc::new(JwtTokenService::from_env()),
                Arc::new(Argon2PasswordService::new()),
            )
        })
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> io::Result<Repositories> {
        match &config.database {
            Some(db_config) => {
                let db = db_config.connect().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to database");
                    io::Error::other(e.to_string())
                })?;
                Ok(yatube_infra::postgres_repositories(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
                Ok(InMemoryDatabase::new().repositories())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> io::Result<Repositories> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Ok(InMemoryDatabase::new().repositories())
    }

    async fn cache(
        config: &AppConfig,
    ) -> io::Result<(Arc<dyn Cache>, Option<Arc<InMemoryCache>>)> {
        if config.cache_backend == CacheBackend::Redis {
            #[cfg(feature = "redis")]
            {
                let redis_config = yatube_infra::RedisConfig::from_env();
                match yatube_infra::RedisCache::new(redis_config.clone()).await {
                    Ok(redis) => return Ok((Arc::new(redis), None)),
                    Err(e) if redis_config.fallback_to_memory => {
                        tracing::warn!(error = %e, "Redis unavailable, caching pages in memory");
                    }
                    Err(e) => return Err(io::Error::other(e.to_string())),
                }
            }

            #[cfg(not(feature = "redis"))]
            {
                tracing::warn!("CACHE_BACKEND=redis but the redis feature is disabled");
            }
        }

        let memory = Arc::new(InMemoryCache::new());
        Ok((memory.clone(), Some(memory)))
    }
}
