use super::{AudioConfig, InvitationsConfig, ObservabilityConfig};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SUPPORTED_LOCALES: [&str; 2] = ["en", "pt-BR"];

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub invitations: InvitationsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let knowyou_dir = home.join(".knowyou");

        Self {
            config_path: knowyou_dir.join("config.toml"),
            log_level: default_log_level(),
            audio: AudioConfig::default(),
            invitations: InvitationsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".knowyou"))
    }

    /// Load `config.toml` from `dir`, writing defaults on first run.
    pub fn load_or_init_in(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");

        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create .knowyou directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(locale) = std::env::var("KNOWYOU_LOCALE") {
            if !locale.is_empty() {
                self.invitations.locale = locale;
            }
        }

        if let Ok(level) = std::env::var("KNOWYOU_LOG_LEVEL") {
            if !level.is_empty() {
                self.log_level = level;
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Validation(format!(
                "log_level '{}' is not one of trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err(ConfigError::Validation(format!(
                "audio.default_volume must be within 0.0..=1.0, got {}",
                self.audio.default_volume
            )));
        }

        if self.audio.frequency_bins > 1024 {
            return Err(ConfigError::Validation(format!(
                "audio.frequency_bins must be at most 1024, got {}",
                self.audio.frequency_bins
            )));
        }

        if !SUPPORTED_LOCALES.contains(&self.invitations.locale.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invitations.locale '{}' is not supported (expected one of {})",
                self.invitations.locale,
                SUPPORTED_LOCALES.join(", ")
            )));
        }

        Ok(())
    }

    /// Parsed `log_level`, falling back to INFO.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
