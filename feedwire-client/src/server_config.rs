use crate::config::{ConfigManager, ServerConfig};
use anyhow::Result;

pub const SERVER_URL_ENV: &str = "FEEDWIRE_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Resolves which server the gateway talks to
pub struct ServerConfigManager {
    config_manager: ConfigManager,
}

impl ServerConfigManager {
    pub fn new(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Determine the server URL to use based on priority:
    /// 1. CLI argument (highest priority)
    /// 2. Environment variable FEEDWIRE_SERVER_URL
    /// 3. Saved configuration file
    /// 4. Default local development server (lowest priority)
    pub fn determine_server_url(&self, cli_override: Option<String>) -> Result<String> {
        if let Some(url) = cli_override {
            return Ok(url);
        }

        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            return Ok(url);
        }

        if let Some(config) = self.config_manager.load_server_config()? {
            return Ok(config.server_url);
        }

        Ok(DEFAULT_SERVER_URL.to_string())
    }

    /// Save server URL to configuration file
    pub fn save_server_url(&self, server_url: String) -> Result<()> {
        let config = ServerConfig {
            server_url,
            last_updated: chrono::Utc::now(),
        };
        self.config_manager.save_server_config(&config)
    }
}
