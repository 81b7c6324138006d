//! Configuration structs with defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk streaming settings.
    pub streaming: StreamingConfig,
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Half-extent, in chunks, of the cubic window kept resident around the viewer.
    pub render_distance: u32,
    /// Chunks within this radius of the viewer are always traversed by the
    /// occlusion pass, whatever their connectivity.
    pub near_field_radius: u32,
    /// Chunks within this radius skip the frustum test during occlusion.
    pub frustum_bypass_radius: u32,
    /// Maximum pending chunks meshed per tick.
    pub pending_promotions_per_tick: u32,
    /// Maximum chunks generated per tick.
    pub generations_per_tick: u32,
}

/// Terrain generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Noise seed.
    pub seed: u32,
    /// World units per noise unit on every axis.
    pub horizontal_scale: f64,
    /// Peak surface height above and below y = 0, in voxels.
    pub height_amplitude: f64,
    /// Depth, in voxels, over which density ramps from 0 to 1 below the surface.
    pub surface_thickness: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log a summary line after every streamer tick.
    pub log_tick_stats: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 5,
            near_field_radius: 3,
            frustum_bypass_radius: 2,
            pending_promotions_per_tick: 1,
            generations_per_tick: 1,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            horizontal_scale: 50.0,
            height_amplitude: 25.0,
            surface_thickness: 3.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_tick_stats: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads `config.ron`: `Some(new_config)` if it differs from `self`,
    /// `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects settings the streamer or generator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::InvalidValue { field, reason });
        if self.streaming.render_distance == 0 {
            return invalid("streaming.render_distance", "must be at least 1");
        }
        if self.streaming.generations_per_tick == 0 {
            return invalid("streaming.generations_per_tick", "must be at least 1");
        }
        if self.streaming.pending_promotions_per_tick == 0 {
            return invalid("streaming.pending_promotions_per_tick", "must be at least 1");
        }
        if !(self.terrain.horizontal_scale > 0.0) {
            return invalid("terrain.horizontal_scale", "must be positive");
        }
        if !(self.terrain.surface_thickness > 0.0) {
            return invalid("terrain.surface_thickness", "must be positive");
        }
        Ok(())
    }
}
