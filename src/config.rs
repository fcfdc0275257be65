//! Configuration of the `todos` binary, read from environment variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `JSONSTORE_TOKEN` | Store identifier, required | none |
//! | `JSONSTORE_ENDPOINT` | Store endpoint URL | `https://www.jsonstore.io` |
//! | `JSONSTORE_TIMEOUT` | Request timeout, e.g. `5000`, `750ms`, `5s` | `5000` |

use std::env;

use crate::client::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_MS};
use crate::error::{Error, Result};

/// Application configuration, read from the process environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Store identifier from `JSONSTORE_TOKEN`, surrounding whitespace removed
    pub store_token: String,
    /// Store endpoint from `JSONSTORE_ENDPOINT`
    pub endpoint: String,
    /// Request timeout in milliseconds from `JSONSTORE_TIMEOUT`, never zero
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    /// `Error::Config` when `JSONSTORE_TOKEN` is unset or blank. An unparsable
    /// or zero `JSONSTORE_TIMEOUT` falls back to the default instead.
    pub fn from_env() -> Result<Self> {
        let store_token = env::var("JSONSTORE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("JSONSTORE_TOKEN environment variable must be set".to_string()))?;
        let endpoint = env::var("JSONSTORE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        // Parse request timeout (supports: 5000, 750ms, 5s)
        let timeout_ms = env::var("JSONSTORE_TIMEOUT")
            .ok()
            .and_then(|s| parse_duration_ms(&s))
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(Config {
            store_token: store_token.trim().to_string(),
            endpoint,
            timeout_ms,
        })
    }

    /// Client settings for the configured store
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            store_id: self.store_token.clone(),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

/// Parse duration string to milliseconds (supports: 750ms, 5s, 2m, 5000, etc.)
pub fn parse_duration_ms(s: &str) -> Option<u64> {
    let s = s.trim().to_lowercase();
    let (num_str, factor): (&str, u64) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60 * 1000)
    } else {
        (s.as_str(), 1)
    };

    num_str.trim().parse::<u64>().ok().map(|n| n.saturating_mul(factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_optional() {
        env::remove_var("JSONSTORE_ENDPOINT");
        env::remove_var("JSONSTORE_TIMEOUT");
    }

    #[test]
    fn test_parse_duration_ms() {
        // Plain milliseconds
        assert_eq!(parse_duration_ms("5000"), Some(5000));
        assert_eq!(parse_duration_ms("0"), Some(0));

        // Suffixes
        assert_eq!(parse_duration_ms("750ms"), Some(750));
        assert_eq!(parse_duration_ms("5s"), Some(5000));
        assert_eq!(parse_duration_ms("2m"), Some(120_000));

        // Case and whitespace
        assert_eq!(parse_duration_ms(" 3S "), Some(3000));
        assert_eq!(parse_duration_ms("10 ms"), Some(10));

        // Invalid inputs
        assert_eq!(parse_duration_ms(""), None);
        assert_eq!(parse_duration_ms("soon"), None);
        assert_eq!(parse_duration_ms("1.5s"), None);
        assert_eq!(parse_duration_ms("-1"), None);
    }

    #[test]
    #[serial]
    fn test_config_from_env_default() {
        clear_optional();
        env::set_var("JSONSTORE_TOKEN", "store-token");

        let config = Config::from_env().unwrap();

        assert_eq!(config.store_token, "store-token");
        assert_eq!(config.endpoint, "https://www.jsonstore.io");
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    #[serial]
    fn test_config_missing_token() {
        clear_optional();
        env::remove_var("JSONSTORE_TOKEN");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("JSONSTORE_TOKEN"));

        env::set_var("JSONSTORE_TOKEN", "   ");
        assert!(Config::from_env().is_err());
        env::remove_var("JSONSTORE_TOKEN");
    }

    #[test]
    #[serial]
    fn test_config_timeout() {
        clear_optional();
        env::set_var("JSONSTORE_TOKEN", "store-token");

        env::set_var("JSONSTORE_TIMEOUT", "750ms");
        assert_eq!(Config::from_env().unwrap().timeout_ms, 750);

        env::set_var("JSONSTORE_TIMEOUT", "10s");
        assert_eq!(Config::from_env().unwrap().timeout_ms, 10_000);

        // Invalid or zero falls back to the default bound
        env::set_var("JSONSTORE_TIMEOUT", "forever");
        assert_eq!(Config::from_env().unwrap().timeout_ms, 5000);
        env::set_var("JSONSTORE_TIMEOUT", "0");
        assert_eq!(Config::from_env().unwrap().timeout_ms, 5000);

        env::remove_var("JSONSTORE_TIMEOUT");
    }

    #[test]
    #[serial]
    fn test_client_config_from_env() {
        clear_optional();
        env::set_var("JSONSTORE_TOKEN", "store-token");
        env::set_var("JSONSTORE_ENDPOINT", "http://127.0.0.1:9999");
        env::set_var("JSONSTORE_TIMEOUT", "2s");

        let client_config = Config::from_env().unwrap().client_config();
        assert_eq!(client_config.endpoint, "http://127.0.0.1:9999");
        assert_eq!(client_config.store_id, "store-token");
        assert_eq!(client_config.timeout_ms, 2000);

        clear_optional();
    }
}
