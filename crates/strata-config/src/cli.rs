//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Streaming voxel terrain demo")]
pub struct CliArgs {
    /// Half-extent of the resident chunk window.
    #[arg(long)]
    pub render_distance: Option<u32>,

    /// Radius within which occlusion always expands.
    #[arg(long)]
    pub near_field_radius: Option<u32>,

    /// Radius within which the frustum test is skipped.
    #[arg(long)]
    pub frustum_bypass_radius: Option<u32>,

    /// Terrain noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of streamer ticks to run before exiting.
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rd) = args.render_distance {
            self.streaming.render_distance = rd;
        }
        if let Some(r) = args.near_field_radius {
            self.streaming.near_field_radius = r;
        }
        if let Some(r) = args.frustum_bypass_radius {
            self.streaming.frustum_bypass_radius = r;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            render_distance: Some(8),
            seed: Some(99),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.streaming.render_distance, 8);
        assert_eq!(config.terrain.seed, 99);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.streaming.near_field_radius, 3);
        assert_eq!(config.streaming.frustum_bypass_radius, 2);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "strata",
            "--near-field-radius",
            "4",
            "--frustum-bypass-radius",
            "1",
            "--ticks",
            "30",
        ]);
        assert_eq!(args.near_field_radius, Some(4));
        assert_eq!(args.frustum_bypass_radius, Some(1));
        assert_eq!(args.ticks, 30);
        assert!(args.config.is_none());
    }
}
