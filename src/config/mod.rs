//! Client configuration
//!
//! Settings are resolved in this order:
//! 1. Explicit arguments / builder values
//! 2. Environment variables (YAVIQ_API_KEY, YAVIQ_ENDPOINT)
//! 3. Built-in defaults (endpoint only)

use crate::api::{Result, YaviqClient, YaviqError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const API_KEY_ENV: &str = "YAVIQ_API_KEY";
pub const ENDPOINT_ENV: &str = "YAVIQ_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "https://api.yaviq.local";

const MISSING_API_KEY: &str =
    "API key is required. Set YAVIQ_API_KEY environment variable or pass api_key to the client.";

/// Resolve one setting: explicit value, then `lookup(var)`, then `default`.
///
/// Empty strings count as unset at every step.
pub fn resolve_setting<F>(
    explicit: Option<&str>,
    lookup: &F,
    var: &str,
    default: Option<&str>,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| lookup(var).filter(|v| !v.is_empty()))
        .or_else(|| default.map(str::to_string))
}

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Resolved configuration held by a [`YaviqClient`](crate::YaviqClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bearer token; never serialized
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Base URL of the service
    pub endpoint: String,

    /// Emit a telemetry line after optimize calls
    #[serde(default)]
    pub telemetry: bool,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Resolve against the process environment
    pub fn resolve(api_key: Option<&str>, endpoint: Option<&str>) -> Result<Self> {
        Self::resolve_with(api_key, endpoint, &process_env)
    }

    /// Resolve against a caller-supplied environment lookup
    pub fn resolve_with<F>(api_key: Option<&str>, endpoint: Option<&str>, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_setting(api_key, lookup, API_KEY_ENV, None)
            .ok_or_else(|| YaviqError::validation(MISSING_API_KEY))?;
        let endpoint = resolve_setting(endpoint, lookup, ENDPOINT_ENV, Some(DEFAULT_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            endpoint,
            telemetry: false,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(YaviqError::validation(MISSING_API_KEY));
        }
        if self.endpoint.is_empty() {
            return Err(YaviqError::validation("Endpoint must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

/// Builder for creating ClientConfig programmatically
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    endpoint: Option<String>,
    telemetry: bool,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn telemetry(mut self, enabled: bool) -> Self {
        self.telemetry = enabled;
        self
    }

    /// Fill unset values from the process environment
    pub fn build(self) -> Result<ClientConfig> {
        self.build_with(&process_env)
    }

    pub fn build_with<F>(self, lookup: &F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config =
            ClientConfig::resolve_with(self.api_key.as_deref(), self.endpoint.as_deref(), lookup)?;
        config.telemetry = self.telemetry;
        Ok(config)
    }

    /// Resolve the configuration and create a client from it
    pub fn build_client(self) -> Result<YaviqClient> {
        YaviqClient::from_config(self.build()?)
    }

    pub fn build_client_with<F>(self, lookup: &F) -> Result<YaviqClient>
    where
        F: Fn(&str) -> Option<String>,
    {
        YaviqClient::from_config(self.build_with(lookup)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_resolve_setting_precedence() {
        let lookup = env(&[("VAR", "from-env")]);
        assert_eq!(
            resolve_setting(Some("explicit"), &lookup, "VAR", Some("default")),
            Some("explicit".to_string())
        );
        assert_eq!(
            resolve_setting(None, &lookup, "VAR", Some("default")),
            Some("from-env".to_string())
        );
        assert_eq!(
            resolve_setting(Some(""), &lookup, "VAR", None),
            Some("from-env".to_string())
        );
        assert_eq!(
            resolve_setting(None, &env(&[]), "VAR", Some("default")),
            Some("default".to_string())
        );
        assert_eq!(resolve_setting(None, &env(&[("VAR", "")]), "VAR", None), None);
    }

    #[test]
    fn test_missing_api_key_is_validation_error() {
        let err = ClientConfig::resolve_with(None, None, &env(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status_code(), Some(400));
        assert!(err.message().contains("YAVIQ_API_KEY"));
    }

    #[test]
    fn test_env_fallbacks() {
        let lookup = env(&[(API_KEY_ENV, "env-key"), (ENDPOINT_ENV, "https://proxy.internal")]);
        let config = ClientConfig::resolve_with(None, None, &lookup).unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.endpoint, "https://proxy.internal");
        assert!(!config.telemetry);

        let config = ClientConfig::resolve_with(Some("arg-key"), Some("http://localhost:9"), &lookup)
            .unwrap();
        assert_eq!(config.api_key, "arg-key");
        assert_eq!(config.endpoint, "http://localhost:9");
    }

    #[test]
    fn test_default_endpoint() {
        let config = ClientConfig::resolve_with(Some("k"), None, &env(&[])).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfigBuilder::new()
            .api_key("test-key")
            .endpoint("http://127.0.0.1:8080")
            .telemetry(true)
            .build_with(&env(&[]))
            .unwrap();

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
        assert!(config.telemetry);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_is_not_leaked() {
        let config = ClientConfig::resolve_with(Some("sk-secret"), None, &env(&[])).unwrap();
        assert!(!format!("{:?}", config).contains("sk-secret"));
        let dumped = serde_json::to_string(&config).unwrap();
        assert!(!dumped.contains("sk-secret"));
        assert!(dumped.contains(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = ClientConfig {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telemetry: false,
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Validation);
    }
}
