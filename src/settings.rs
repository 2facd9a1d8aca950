//! Runner settings with persistence
//!
//! Settings are read from the path given on the command line, or from
//! `~/.config/lausanne/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lausanne_core::TickConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All runner settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub logging: LogSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lausanne"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from an explicit `path`, failing if it cannot be read or
    /// parsed. Without a path the config directory is tried and defaults are
    /// used when that file is missing or broken.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings file {:?}", path))?;
                let settings = Self::parse(&content)
                    .with_context(|| format!("Failed to parse settings file {:?}", path))?;
                info!("Loaded settings from {:?}", path);
                Ok(settings)
            }
            None => Ok(Self::load_default()),
        }
    }

    fn load_default() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Headless simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Scene file to run
    pub scene: PathBuf,
    /// Seed for every NPC's random source; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Frames simulated after the player script has finished
    pub ticks: u32,
    /// Where the world snapshot is written; the save directory when absent
    pub save_path: Option<PathBuf>,
    pub tick: TickConfig,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            scene: PathBuf::from("demos/lausanne.toml"),
            seed: None,
            ticks: 600, // 10 seconds
            save_path: None,
            tick: TickConfig::default(),
        }
    }
}

impl SimulationSettings {
    /// Simulated length of the trailing idle phase, in seconds
    pub fn idle_seconds(&self) -> f32 {
        self.ticks as f32 * self.tick.fixed_timestep
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}
