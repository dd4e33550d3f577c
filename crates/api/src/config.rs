//! Application configuration loaded from environment variables.

use domain::{AvailableTable, ConfirmationPolicy};
use thiserror::Error;

const DEFAULT_FLOOR_PLAN: &str = "T1:2,T2:4,T3:6";

/// Errors that stop the server from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An entry of `RESTAURANT_TABLES` is not `id:capacity`.
    #[error("Invalid floor plan entry {entry:?}: expected ID:CAPACITY")]
    InvalidTableEntry { entry: String },

    /// `RESTAURANT_TABLES` lists no tables.
    #[error("Floor plan lists no tables")]
    EmptyFloorPlan,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL URL; unset means the in-memory store
/// - `DATABASE_MAX_CONNECTIONS` — pool size (default: `5`)
/// - `RESTAURANT_TABLES` — floor plan as `ID:CAPACITY` pairs (default: `"T1:2,T2:4,T3:6"`)
/// - `CONFIRMATION_POLICY` — `immediate` or `deferred` (default: `immediate`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub floor_plan: Vec<AvailableTable>,
    pub confirmation_policy: ConfirmationPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let floor_plan = match lookup("RESTAURANT_TABLES") {
            Some(raw) => parse_floor_plan(&raw)?,
            None => defaults.floor_plan,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.database_max_connections),
            floor_plan,
            confirmation_policy: lookup("CONFIRMATION_POLICY")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.confirmation_policy),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            floor_plan: default_floor_plan(),
            confirmation_policy: ConfirmationPolicy::default(),
        }
    }
}

fn default_floor_plan() -> Vec<AvailableTable> {
    DEFAULT_FLOOR_PLAN
        .split(',')
        .filter_map(|entry| parse_table(entry).ok())
        .collect()
}

/// Parses a floor plan such as `"T1:2,T2:4"`.
///
/// Whitespace around entries is ignored. Capacities must be positive.
pub fn parse_floor_plan(raw: &str) -> Result<Vec<AvailableTable>, ConfigError> {
    let tables = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_table)
        .collect::<Result<Vec<_>, _>>()?;

    if tables.is_empty() {
        return Err(ConfigError::EmptyFloorPlan);
    }
    Ok(tables)
}

fn parse_table(entry: &str) -> Result<AvailableTable, ConfigError> {
    let invalid = || ConfigError::InvalidTableEntry {
        entry: entry.to_string(),
    };

    let (id, capacity) = entry.split_once(':').ok_or_else(invalid)?;
    let id = id.trim();
    let capacity: u32 = capacity.trim().parse().map_err(|_| invalid())?;
    if id.is_empty() || capacity == 0 {
        return Err(invalid());
    }
    Ok(AvailableTable::new(id, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::Immediate);
        assert_eq!(
            config.floor_plan,
            vec![
                AvailableTable::new("T1", 2),
                AvailableTable::new("T2", 4),
                AvailableTable::new("T3", 6),
            ]
        );
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.floor_plan.len(), 3);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = from_vars(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("DATABASE_URL", "postgres://localhost/reservations"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("RESTAURANT_TABLES", "A:8, B:2"),
            ("CONFIRMATION_POLICY", "Deferred"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/reservations")
        );
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(
            config.floor_plan,
            vec![AvailableTable::new("A", 8), AvailableTable::new("B", 2)]
        );
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::Deferred);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_vars(&[
            ("PORT", "not-a-port"),
            ("DATABASE_URL", "  "),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("CONFIRMATION_POLICY", "later"),
        ])
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.confirmation_policy, ConfirmationPolicy::Immediate);
    }

    #[test]
    fn test_bad_floor_plan_is_an_error() {
        assert_eq!(
            from_vars(&[("RESTAURANT_TABLES", "T1:2,T2")]).unwrap_err(),
            ConfigError::InvalidTableEntry {
                entry: "T2".to_string()
            }
        );
        assert!(from_vars(&[("RESTAURANT_TABLES", "T1:0")]).is_err());
        assert!(from_vars(&[("RESTAURANT_TABLES", ":4")]).is_err());
        assert_eq!(
            from_vars(&[("RESTAURANT_TABLES", " , ")]).unwrap_err(),
            ConfigError::EmptyFloorPlan
        );
    }
}
