//! Server configuration.
//!
//! Values come from command-line flags, each of which can also be set through
//! an environment variable (and so through a `.env` file).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::store::StoreConfig;

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Command-line arguments of the `bus-lookup` server.
#[derive(Debug, Parser)]
#[command(name = "bus-lookup")]
#[command(about = "Region, stop and bus arrival lookups over a schedule database", long_about = None)]
pub struct ServerArgs {
    /// SQLite database holding the schedule tables
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://schedule.db")]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection before failing a request
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Serve a JSON schedule from memory instead of the database
    #[arg(long, env = "SCHEDULE_FIXTURE", value_name = "FILE")]
    pub fixture: Option<PathBuf>,
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,

    /// Database connection settings
    pub store: StoreConfig,

    /// JSON schedule served from memory in place of the database
    pub fixture: Option<PathBuf>,
}

impl ServerConfig {
    /// Set the listen address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set database connection settings.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Serve `path` from memory instead of opening the database.
    pub fn with_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = Some(path.into());
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store: StoreConfig::default(),
            fixture: None,
        }
    }
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        if args.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database URL",
                reason: "must not be empty".into(),
            });
        }
        if args.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "max connections",
                reason: "must be at least 1".into(),
            });
        }

        let store = StoreConfig::new(args.database_url)
            .with_max_connections(args.max_connections)
            .with_acquire_timeout(Duration::from_secs(args.acquire_timeout_secs));

        let config = ServerConfig::default()
            .with_bind(args.bind)
            .with_store(store);
        Ok(match args.fixture {
            Some(path) => config.with_fixture(path),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerArgs {
        ServerArgs::try_parse_from(std::iter::once("bus-lookup").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.store.database_url, "sqlite://schedule.db");
        assert_eq!(config.store.max_connections, 10);
        assert_eq!(config.store.acquire_timeout, Duration::from_secs(5));
        assert!(config.fixture.is_none());
    }

    #[test]
    fn config_from_flags() {
        let args = parse(&[
            "--database-url",
            "sqlite:///srv/gtfs.db",
            "--bind",
            "0.0.0.0:8080",
            "--max-connections",
            "4",
            "--acquire-timeout-secs",
            "2",
        ]);
        let config = ServerConfig::try_from(args).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.store.database_url, "sqlite:///srv/gtfs.db");
        assert_eq!(config.store.max_connections, 4);
        assert_eq!(config.store.acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn fixture_flag() {
        let args = parse(&["--database-url", "sqlite://x.db", "--fixture", "demo.json"]);
        let config = ServerConfig::try_from(args).unwrap();
        assert_eq!(config.fixture, Some(PathBuf::from("demo.json")));
    }

    #[test]
    fn zero_connections_rejected() {
        let args = parse(&["--database-url", "sqlite://x.db", "--max-connections", "0"]);
        let err = ServerConfig::try_from(args).unwrap_err();
        assert_eq!(err.to_string(), "invalid max connections: must be at least 1");
    }

    #[test]
    fn bad_bind_address_rejected() {
        let result = ServerArgs::try_parse_from(["bus-lookup", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}
