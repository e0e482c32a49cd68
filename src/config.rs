//! # Configuration Management
//!
//! Loads relay configuration from multiple sources:
//! - TOML configuration file (config.toml, optional)
//! - Environment variables (with APP_ prefix, plus bare HOST/PORT used by
//!   deployment platforms)
//! - Default values built into the code
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Environment variables (APP_SERVER_HOST, APP_MODEL_PATH, ...)
//! 2. Configuration file (config.toml)
//! 3. Defaults (listen on all interfaces, port 8000, model directory "model",
//!    16 kHz audio)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

/// Network listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Recognition model settings.
///
/// ## Fields:
/// - `path`: directory holding the Vosk model; missing or unreadable is
///   startup-fatal
/// - `sample_rate`: the fixed rate every connection streams at; clients do
///   not negotiate a format, so this must match the loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    pub sample_rate: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),  // Accept connections from any interface
                port: 8000,
            },
            model: ModelConfig {
                path: "model".to_string(),
                sample_rate: 16000,  // Vosk models typically expect 16 kHz audio
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config.toml, and the environment.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Deployment platforms commonly inject these without the APP_ prefix
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.model.path.is_empty() {
            return Err(anyhow::anyhow!("Model path cannot be empty"));
        }

        if self.model.sample_rate == 0 {
            return Err(anyhow::anyhow!("Sample rate must be greater than 0"));
        }

        Ok(())
    }

    /// The address string the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The defaults mirror the reference deployment: all interfaces, port
    /// 8000, model directory "model", 16 kHz audio.
    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.path, "model");
        assert_eq!(config.model.sample_rate, 16000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.model.path = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.model.sample_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }
}
