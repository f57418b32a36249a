//! Runtime configuration
//!
//! Everything is read from environment variables at startup.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub graphql_path: String,
    pub store_uri: String,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 4000,
            graphql_path: "/graphql".to_string(),
            store_uri: "file://.planner-data".to_string(),
            upload_dir: PathBuf::from("files"),
            upload_max_bytes: 10 * 1024 * 1024,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}

/// First path segments already served by the REST routes or Socket.IO
const RESERVED_SEGMENTS: [&str; 4] = ["weeks", "tasks", "health", "socket.io"];

fn is_valid_graphql_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    let first = rest.split('/').next().unwrap_or_default();
    !first.is_empty()
        && !RESERVED_SEGMENTS.contains(&first)
        && !path.contains(['{', '}', '*', ':'])
        && !path.contains("//")
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; unset variables keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("HOST") {
            config.host = parse("HOST", raw)?;
        }
        if let Some(raw) = lookup("PORT") {
            config.port = parse("PORT", raw)?;
        }
        if let Some(raw) = lookup("GRAPHQL_PATH") {
            let path = raw.trim().to_string();
            if !is_valid_graphql_path(&path) {
                return Err(ConfigError::Invalid {
                    name: "GRAPHQL_PATH",
                    value: raw,
                });
            }
            config.graphql_path = path;
        }
        if let Some(raw) = lookup("STORE_URI") {
            config.store_uri = raw;
        }
        if let Some(raw) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("UPLOAD_MAX_BYTES") {
            config.upload_max_bytes = parse("UPLOAD_MAX_BYTES", raw)?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
