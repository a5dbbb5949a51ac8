//! Configuration file management for holdrec.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory. Missing files fall back to defaults so the recorder
//! works out of the box; malformed files are reported as errors.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `holdrec list-devices`
    /// - device name from `holdrec list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested recording sample rate in Hz (actual rate follows the device)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Directory for sent voice clips. The -o/--output flag takes precedence;
    /// unset means the current directory.
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    48000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            output_dir: None,
        }
    }
}

/// Recording bar UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether show/hide, lock and level animations play. When false every
    /// animated value jumps straight to its target.
    #[serde(default = "default_true")]
    pub animations_enabled: bool,
    /// Frame interval in milliseconds for the recording loop
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_tick_ms() -> u64 {
    30
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            animations_enabled: default_true(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldrecConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl HoldrecConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing config file yields the default configuration.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file exists but cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        let config: HoldrecConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the config directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("holdrec");

    fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("holdrec.toml"))
}
