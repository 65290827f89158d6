//! Gateway configuration types.
//!
//! Values come from the process environment, falling back to defaults for
//! anything unset.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {var}")]
pub struct ConfigError {
    /// The offending variable.
    pub var: &'static str,
    /// The value it held.
    pub value: String,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Redis URL shared by the broker and the session store.
    #[serde(default = "GatewayConfig::default_redis_url")]
    pub redis_url: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Lifetime of issued session tokens in seconds.
    #[serde(default = "GatewayConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,

    /// How long to wait for a backend reply in seconds.
    #[serde(default = "GatewayConfig::default_rpc_timeout")]
    pub rpc_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_redis_url() -> String {
        "redis://127.0.0.1:6379".to_string()
    }

    const fn default_session_ttl() -> u64 {
        300 // 5 minutes
    }

    const fn default_rpc_timeout() -> u64 {
        30
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        // Outlives the RPC timeout so backend timeouts surface as API errors.
        35
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(url) = lookup("REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        parse_into(&lookup, "SESSION_TTL_SECONDS", &mut config.session_ttl_seconds)?;
        parse_into(&lookup, "RPC_TIMEOUT_SECONDS", &mut config.rpc_timeout_seconds)?;
        parse_into(&lookup, "MAX_BODY_BYTES", &mut config.max_body_bytes)?;
        parse_into(
            &lookup,
            "REQUEST_TIMEOUT_SECONDS",
            &mut config.request_timeout_seconds,
        )?;

        if config.session_ttl_seconds == 0 {
            return Err(ConfigError {
                var: "SESSION_TTL_SECONDS",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// Get the session lifetime as a `Duration`.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    /// Get the RPC timeout as a `Duration`.
    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_into<F, T>(lookup: &F, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var) {
        *slot = value.trim().parse().map_err(|_| ConfigError { var, value })?;
    }
    Ok(())
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            redis_url: Self::default_redis_url(),
            cors_origins: vec!["*".to_string()],
            session_ttl_seconds: Self::default_session_ttl(),
            rpc_timeout_seconds: Self::default_rpc_timeout(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.session_ttl(), Duration::from_secs(300));
        assert_eq!(config.rpc_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert!(config.request_timeout() > config.rpc_timeout());
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn environment_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("REDIS_URL", "redis://cache:6379"),
            ("SESSION_TTL_SECONDS", "60"),
            ("RPC_TIMEOUT_SECONDS", " 5 "),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.redis_url, "redis://cache:6379");
        assert_eq!(config.session_ttl(), Duration::from_secs(60));
        assert_eq!(config.rpc_timeout(), Duration::from_secs(5));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn unparsable_number_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert_eq!(err.var, "MAX_BODY_BYTES");
        assert_eq!(err.value, "lots");
    }

    #[test]
    fn zero_session_ttl_is_rejected() {
        assert!(GatewayConfig::from_lookup(lookup(&[("SESSION_TTL_SECONDS", "0")])).is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"listen_addr": "0.0.0.0:1"}"#).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:1");
        assert_eq!(config.session_ttl_seconds, 300);
        assert!(config.cors_origins.is_empty());
    }
}
