//! Server configuration parsed from CLI arguments and environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::outbound::cache::CacheTtls;
use crate::outbound::persistence::PoolConfig;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Score-tracking game backend")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,

    /// Seconds to wait for a pooled connection before failing the request.
    #[arg(long, env = "DB_CONNECTION_TIMEOUT_SECS", default_value_t = 30)]
    pub db_connection_timeout_secs: u64,

    /// Seconds a cached rankings snapshot stays fresh.
    #[arg(long, env = "CACHE_TTL_RANKINGS_SECS", default_value_t = 30)]
    pub cache_ttl_rankings_secs: i64,

    /// Seconds a cached statistics snapshot stays fresh.
    #[arg(long, env = "CACHE_TTL_STATS_SECS", default_value_t = 10)]
    pub cache_ttl_stats_secs: i64,

    /// Seconds a cached user listing stays fresh.
    #[arg(long, env = "CACHE_TTL_USERS_SECS", default_value_t = 30)]
    pub cache_ttl_users_secs: i64,
}

impl ServerConfig {
    /// Database pool settings derived from this configuration.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url.clone())
            .with_max_size(self.db_pool_size)
            .with_connection_timeout(Duration::from_secs(self.db_connection_timeout_secs))
    }

    /// Cache lifetimes derived from this configuration.
    #[must_use]
    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            rankings: chrono::Duration::seconds(self.cache_ttl_rankings_secs),
            stats: chrono::Duration::seconds(self.cache_ttl_stats_secs),
            users: chrono::Duration::seconds(self.cache_ttl_users_secs),
        }
    }
}
