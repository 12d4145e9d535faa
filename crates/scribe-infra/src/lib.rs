//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`:
//! record storage, page cache backends, session tokens, password hashing
//! and media storage.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL record storage via SeaORM
//! - `redis` - Redis page cache

pub mod auth;
pub mod cache;
pub mod database;
pub mod media;

// Re-exports - always available
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use cache::InMemoryCache;
pub use database::{DatabaseConfig, InMemoryStore};
pub use media::LocalMediaStore;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, postgres_repositories};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
