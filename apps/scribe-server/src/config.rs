//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scribe_core::domain::DEFAULT_PAGE_SIZE;
use scribe_core::services::DEFAULT_PAGE_TTL;
use scribe_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absent means the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Absent means the in-memory cache.
    pub redis_url: Option<String>,
    pub redis_connect_timeout: Duration,
    pub page_size: u64,
    pub page_cache_ttl: Duration,
    pub media_root: PathBuf,
    pub session: SessionConfig,
    pub jwt: JwtConfig,
}

/// How sessions are carried and who counts as staff.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub staff_usernames: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "scribe_session".to_string(),
            staff_usernames: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Roles granted to `username` when a session is issued.
    pub fn roles_for(&self, username: &str) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.staff_usernames.iter().any(|staff| staff == username) {
            roles.push("staff".to_string());
        }
        roles
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            min_connections: parsed("DB_MIN_CONNECTIONS", 10),
            ..DatabaseConfig::new(url)
        });

        let staff_usernames = env::var("STAFF_USERNAMES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            redis_url: env::var("REDIS_URL").ok(),
            redis_connect_timeout: Duration::from_secs(parsed("REDIS_CONNECT_TIMEOUT_SECS", 5)),
            page_size: parsed("PAGE_SIZE", DEFAULT_PAGE_SIZE),
            page_cache_ttl: Duration::from_secs(parsed(
                "PAGE_CACHE_TTL_SECS",
                DEFAULT_PAGE_TTL.as_secs(),
            )),
            media_root: PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string())),
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE")
                    .unwrap_or_else(|_| SessionConfig::default().cookie_name),
                staff_usernames,
            },
            jwt: JwtConfig::from_env(),
        }
    }

    /// In-memory everything, for tests.
    #[cfg(test)]
    pub fn for_tests(media_root: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database: None,
            redis_url: None,
            redis_connect_timeout: Duration::from_secs(1),
            page_size: DEFAULT_PAGE_SIZE,
            page_cache_ttl: DEFAULT_PAGE_TTL,
            media_root,
            session: SessionConfig {
                staff_usernames: vec!["editor".to_string()],
                ..SessionConfig::default()
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            },
        }
    }
}
