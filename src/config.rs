//! Configuration management for the ADS-B tracker
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AdsbError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdsbConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for handling a single request, provider calls included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Flight-tracking provider (OpenSky Network) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Optional credentials; anonymous access has tighter rate limits
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_provider_max_retries")]
    pub max_retries: u32,
}

/// Language-model agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_agent_base_url")]
    pub base_url: String,
    #[serde(default = "default_agent_model")]
    pub model: String,
    /// Where the agent reaches the tracking API
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    #[serde(default = "default_agent_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_request_timeout() -> u32 {
    30
}

fn default_provider_base_url() -> String {
    "https://opensky-network.org/api".to_string()
}

fn default_provider_timeout() -> u32 {
    30
}

fn default_provider_max_retries() -> u32 {
    2
}

fn default_agent_base_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_agent_model() -> String {
    "mistral-large-latest".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_max_tool_rounds() -> u32 {
    4
}

fn default_agent_timeout() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            username: None,
            password: None,
            timeout_seconds: default_provider_timeout(),
            max_retries: default_provider_max_retries(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_agent_base_url(),
            model: default_agent_model(),
            backend_url: default_backend_url(),
            max_tool_rounds: default_max_tool_rounds(),
            timeout_seconds: default_agent_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AdsbConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(Self::get_config_path);

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ADSB_PROVIDER__USERNAME overrides provider.username
        builder = builder.add_source(
            Environment::with_prefix("ADSB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AdsbConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// `ADSB_CONFIG` if set, otherwise `config.toml` in the working directory
    #[must_use]
    pub fn get_config_path() -> PathBuf {
        std::env::var_os("ADSB_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.provider.base_url.is_empty() {
            self.provider.base_url = default_provider_base_url();
        }
        if self.provider.timeout_seconds == 0 {
            self.provider.timeout_seconds = default_provider_timeout();
        }
        if self.agent.base_url.is_empty() {
            self.agent.base_url = default_agent_base_url();
        }
        if self.agent.model.is_empty() {
            self.agent.model = default_agent_model();
        }
        if self.agent.backend_url.is_empty() {
            self.agent.backend_url = default_backend_url();
        }
        if self.agent.max_tool_rounds == 0 {
            self.agent.max_tool_rounds = default_max_tool_rounds();
        }
        if self.agent.timeout_seconds == 0 {
            self.agent.timeout_seconds = default_agent_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // blank credentials in env files mean "anonymous"
        if self.provider.username.as_deref().is_some_and(str::is_empty) {
            self.provider.username = None;
        }
        if self.provider.password.as_deref().is_some_and(str::is_empty) {
            self.provider.password = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Provider credentials come as a pair
    pub fn validate_credentials(&self) -> Result<()> {
        match (&self.provider.username, &self.provider.password) {
            (Some(_), None) | (None, Some(_)) => Err(AdsbError::config(
                "Provider username and password must be set together",
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AdsbError::config("Server port cannot be 0").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(AdsbError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.provider.timeout_seconds > 300 {
            return Err(AdsbError::config("Provider timeout cannot exceed 300 seconds").into());
        }

        if self.provider.max_retries > 10 {
            return Err(AdsbError::config("Provider max retries cannot exceed 10").into());
        }

        if self.agent.timeout_seconds > 300 {
            return Err(AdsbError::config("Agent timeout cannot exceed 300 seconds").into());
        }

        if !(1..=10).contains(&self.agent.max_tool_rounds) {
            return Err(AdsbError::config("Agent max tool rounds must be between 1 and 10").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AdsbError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AdsbError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Provider base URL", &self.provider.base_url),
            ("Agent base URL", &self.agent.base_url),
            ("Agent backend URL", &self.agent.backend_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    AdsbError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AdsbConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.provider.base_url, "https://opensky-network.org/api");
        assert_eq!(config.provider.timeout_seconds, 30);
        assert_eq!(config.agent.model, "mistral-large-latest");
        assert_eq!(config.logging.level, "info");
        assert!(config.provider.username.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials_must_be_paired() {
        let mut config = AdsbConfig::default();
        config.provider.username = Some("pilot".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("together"));

        config.provider.password = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_credentials_become_anonymous() {
        let mut config = AdsbConfig::default();
        config.provider.username = Some(String::new());
        config.provider.password = Some(String::new());
        config.apply_defaults();
        assert!(config.provider.username.is_none());
        assert!(config.provider.password.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AdsbConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AdsbConfig::default();
        config.provider.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = AdsbConfig::default();
        config.agent.max_tool_rounds = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_urls() {
        let mut config = AdsbConfig::default();
        config.agent.backend_url = "localhost:5000".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("backend URL"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("adsb-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 5001\n\n[agent]\nmodel = \"mistral-small-latest\"\nmax_tool_rounds = 2\n"
        )
        .unwrap();

        let config = AdsbConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.agent.model, "mistral-small-latest");
        assert_eq!(config.agent.max_tool_rounds, 2);
        assert_eq!(config.provider.max_retries, 2);
    }

    #[test]
    fn test_bind_address() {
        let config = AdsbConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }
}
