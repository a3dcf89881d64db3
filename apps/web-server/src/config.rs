//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use yatube_core::services::PAGE_CACHE_TTL;

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;

/// Where rendered pages are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl CacheBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "redis" => CacheBackend::Redis,
            _ => CacheBackend::Memory,
        }
    }
}

/// A group created at startup when its slug is not yet taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSeed {
    pub slug: String,
    pub title: String,
}

/// Staff account created at startup when the username is free.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub page_cache_ttl: Duration,
    pub cache_backend: CacheBackend,
    pub seed_groups: Vec<GroupSeed>,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            page_cache_ttl: env::var("PAGE_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(PAGE_CACHE_TTL),
            cache_backend: env::var("CACHE_BACKEND")
                .map(|v| CacheBackend::parse(&v))
                .unwrap_or(CacheBackend::Memory),
            seed_groups: env::var("SEED_GROUPS")
                .map(|v| parse_group_seeds(&v))
                .unwrap_or_default(),
            admin: Self::admin_from_env(),
        }
    }

    fn admin_from_env() -> Option<AdminSeed> {
        let username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty())?;
        let password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty())?;
        let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{}@localhost", username));

        Some(AdminSeed {
            username,
            email,
            password,
        })
    }
}

/// Parse `SEED_GROUPS`.
/// Format: `<slug>=<title>` pairs separated by commas.
/// Example: SEED_GROUPS=cats=Cats,leo=Leo Tolstoy fans
fn parse_group_seeds(raw: &str) -> Vec<GroupSeed> {
    raw.split(',')
        .filter_map(|pair| {
            let (slug, title) = pair.split_once('=')?;
            let (slug, title) = (slug.trim(), title.trim());
            if slug.is_empty() || title.is_empty() {
                return None;
            }
            Some(GroupSeed {
                slug: slug.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_seeds_skip_malformed_pairs() {
        let seeds = parse_group_seeds("cats=Cats, broken ,=Nameless,leo= Leo fans ");
        assert_eq!(
            seeds,
            vec![
                GroupSeed {
                    slug: "cats".into(),
                    title: "Cats".into()
                },
                GroupSeed {
                    slug: "leo".into(),
                    title: "Leo fans".into()
                },
            ]
        );
    }

    #[test]
    fn unknown_cache_backend_means_memory() {
        assert_eq!(CacheBackend::parse("Redis"), CacheBackend::Redis);
        assert_eq!(CacheBackend::parse("memcached"), CacheBackend::Memory);
    }
}
