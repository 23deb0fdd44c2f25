use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// JSON file the site document is persisted to. In-memory only when unset.
    pub site_data_path: Option<PathBuf>,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Largest accepted request body, in bytes.
    pub body_limit_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{name} must be a valid {expected}, got {value:?}")]
pub struct ConfigError {
    name: &'static str,
    expected: &'static str,
    value: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", "u16", 3030)?,
            site_data_path: lookup("SITE_DATA_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            event_bus_capacity: parse_positive(&lookup, "EVENT_BUS_CAPACITY", 1024)?,
            body_limit_bytes: parse_positive(&lookup, "BODY_LIMIT_BYTES", 2 * 1024 * 1024)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            site_data_path: None,
            event_bus_capacity: 1024,
            body_limit_bytes: 2 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError {
            name,
            expected,
            value,
        }),
    }
}

/// Like [`parse`], but zero is rejected too.
fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    const EXPECTED: &str = "positive integer";
    match parse(lookup, name, EXPECTED, default)? {
        0 => Err(ConfigError {
            name,
            expected: EXPECTED,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3030");
        assert_eq!(config.site_data_path, None);
        assert_eq!(config.event_bus_capacity, 1024);
        assert_eq!(config.body_limit_bytes, 2 * 1024 * 1024);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn values_are_read() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SITE_DATA_PATH", "/var/lib/site.json"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.site_data_path, Some(PathBuf::from("/var/lib/site.json")));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a valid u16, got \"eighty\"");
        assert!(load(&[("EVENT_BUS_CAPACITY", "-1")]).is_err());

        let err = load(&[("EVENT_BUS_CAPACITY", "0")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "EVENT_BUS_CAPACITY must be a valid positive integer, got \"0\""
        );
        assert!(load(&[("BODY_LIMIT_BYTES", "0")]).is_err());
    }
}
