//! Server configuration from the environment (and `.env` via dotenvy)

use std::net::SocketAddr;

use crate::services::RatioGrid;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Insert the starter catalog when the database has no colours
    pub seed_catalog: bool,
    pub ratio_grid: RatioGrid,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: ([127, 0, 0, 1], 3000).into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            seed_catalog: true,
            ratio_grid: RatioGrid::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr.parse().map_err(|e: std::net::AddrParseError| {
                invalid("BIND_ADDR", &addr, e.to_string())
            })?;
        }
        if let Some(n) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = match n.trim().parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => return Err(invalid("DATABASE_MAX_CONNECTIONS", &n, "expected a positive integer")),
            };
        }
        if let Some(flag) = lookup("SEED_CATALOG") {
            config.seed_catalog = parse_flag(&flag)
                .ok_or_else(|| invalid("SEED_CATALOG", &flag, "expected true or false"))?;
        }
        if let Some(grid) = lookup("MIX_RATIO_GRID") {
            config.ratio_grid = grid
                .parse()
                .map_err(|_| invalid("MIX_RATIO_GRID", &grid, "expected reference or symmetric"))?;
        }
        if let Some(bytes) = lookup("MAX_BODY_BYTES") {
            config.max_body_bytes = bytes
                .trim()
                .parse()
                .map_err(|_| invalid("MAX_BODY_BYTES", &bytes, "expected a byte count"))?;
        }

        Ok(config)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.ratio_grid, RatioGrid::Reference);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SEED_CATALOG", "off"),
            ("MIX_RATIO_GRID", "symmetric"),
            ("MAX_BODY_BYTES", "1024"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.seed_catalog);
        assert_eq!(config.ratio_grid, RatioGrid::Symmetric);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            ("BIND_ADDR", "localhost"),
            ("SEED_CATALOG", "maybe"),
            ("MIX_RATIO_GRID", "wide"),
            ("MAX_BODY_BYTES", "-1"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }
}
