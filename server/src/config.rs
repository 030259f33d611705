//! Runtime configuration loaded from environment variables with defaults.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (`HOST`, default `127.0.0.1`)
    pub host: String,
    /// Port to bind to (`PORT`, default `3000`)
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`DATABASE_URL`, default `sqlite::memory:`)
    pub url: String,
    /// Pool size (`DATABASE_MAX_CONNECTIONS`, default 5)
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// A private in-memory database, as used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// Every connection to an in-memory SQLite URL opens its own database.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut database = DatabaseConfig {
            url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string()),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };
        if database.is_in_memory() {
            database.max_connections = 1;
        }

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: lookup("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000),
            },
            database,
        }
    }
}
