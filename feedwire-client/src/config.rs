use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timings of the interaction layer, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// How long a notification stays before it starts fading
    pub notification_ttl_ms: u64,
    /// Fade-out duration before a notification is removed
    pub notification_fade_ms: u64,
    /// Delay between the page transition and the actual navigation
    pub navigation_delay_ms: u64,
    pub like_bounce_ms: u64,
    pub pulse_ms: u64,
    pub comment_fade_in_ms: u64,
    /// Delay before nav badges are seeded after startup
    pub badge_delay_ms: u64,
    /// Entrance animation offset between consecutive post cards
    pub stagger_ms: u64,
    /// When server-rendered flash messages are hidden after startup
    pub flash_autohide_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            notification_ttl_ms: 5000,
            notification_fade_ms: 500,
            navigation_delay_ms: 300,
            like_bounce_ms: 600,
            pulse_ms: 300,
            comment_fade_in_ms: 500,
            badge_delay_ms: 2000,
            stagger_ms: 100,
            flash_autohide_ms: 5000,
        }
    }
}

impl InteractionConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn notification_fade(&self) -> Duration {
        Duration::from_millis(self.notification_fade_ms)
    }

    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    pub fn like_bounce(&self) -> Duration {
        Duration::from_millis(self.like_bounce_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn comment_fade_in(&self) -> Duration {
        Duration::from_millis(self.comment_fade_in_ms)
    }

    pub fn badge_delay(&self) -> Duration {
        Duration::from_millis(self.badge_delay_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn flash_autohide(&self) -> Duration {
        Duration::from_millis(self.flash_autohide_ms)
    }
}

/// Server configuration stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_url: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            last_updated: chrono::Utc::now(),
        }
    }
}

/// Configuration manager for the .feedwire directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at `~/.feedwire`
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Self::with_dir(config_dir)
    }

    /// Create a config manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .feedwire directory")?;
        }
        Ok(Self { config_dir })
    }

    fn get_config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home_dir.join(".feedwire"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn get_interaction_file(&self) -> PathBuf {
        self.config_dir.join("interaction.json")
    }

    fn get_server_config_file(&self) -> PathBuf {
        self.config_dir.join("server_config.json")
    }

    /// Save interaction timings
    pub fn save_interaction_config(&self, config: &InteractionConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .context("Failed to serialize interaction config")?;
        fs::write(self.get_interaction_file(), json)
            .context("Failed to write interaction config file")?;
        Ok(())
    }

    /// Load interaction timings, falling back to defaults when no file exists
    pub fn load_interaction_config(&self) -> Result<InteractionConfig> {
        let file = self.get_interaction_file();
        if !file.exists() {
            return Ok(InteractionConfig::default());
        }

        let json = fs::read_to_string(&file).context("Failed to read interaction config file")?;
        let config: InteractionConfig =
            serde_json::from_str(&json).context("Failed to parse interaction config")?;
        Ok(config)
    }

    /// Save server configuration
    pub fn save_server_config(&self, config: &ServerConfig) -> Result<()> {
        let json =
            serde_json::to_string_pretty(config).context("Failed to serialize server config")?;
        fs::write(self.get_server_config_file(), json)
            .context("Failed to write server config file")?;
        Ok(())
    }

    /// Load server configuration
    pub fn load_server_config(&self) -> Result<Option<ServerConfig>> {
        let file = self.get_server_config_file();
        if !file.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file).context("Failed to read server config file")?;
        let config: ServerConfig =
            serde_json::from_str(&json).context("Failed to parse server config")?;
        Ok(Some(config))
    }
}
