//! Service configuration

use anyhow::Context;
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    pub database_max_connections: u32,
    /// Apply `migrations/` on startup
    pub run_migrations: bool,
    /// How long a cached rate card may be served before reloading
    pub cache_ttl: Duration,
    /// Allow any origin (for local admin panel development)
    pub cors_permissive: bool,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            http_port: env_or("HTTP_PORT", 8080),
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            run_migrations: env_flag("RUN_MIGRATIONS"),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", 600)),
            cors_permissive: env_flag("CORS_PERMISSIVE"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("CHAUFFEUR_FARES_TEST_PORT", "not-a-port");
        assert_eq!(env_or("CHAUFFEUR_FARES_TEST_PORT", 8080u16), 8080);

        std::env::set_var("CHAUFFEUR_FARES_TEST_PORT", " 9000 ");
        assert_eq!(env_or("CHAUFFEUR_FARES_TEST_PORT", 8080u16), 9000);
    }

    #[test]
    fn test_env_flag() {
        std::env::set_var("CHAUFFEUR_FARES_TEST_FLAG", "TRUE");
        assert!(env_flag("CHAUFFEUR_FARES_TEST_FLAG"));

        std::env::set_var("CHAUFFEUR_FARES_TEST_FLAG", "0");
        assert!(!env_flag("CHAUFFEUR_FARES_TEST_FLAG"));

        assert!(!env_flag("CHAUFFEUR_FARES_TEST_UNSET_FLAG"));
    }
}
