//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, SceneVariant};

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "orrery", about = "Animated solar system and star field viewer")]
pub struct CliArgs {
    /// Scene to build.
    #[arg(long, value_enum)]
    pub scene: Option<SceneVariant>,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Seed for star placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of stars to scatter.
    #[arg(long)]
    pub star_count: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory containing `textures/` and `models/`.
    #[arg(long)]
    pub asset_root: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(variant) = args.scene {
            self.scene.variant = variant;
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.stars.seed = Some(seed);
        }
        if let Some(count) = args.star_count {
            self.stars.count = count;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref root) = args.asset_root {
            self.scene.asset_root = root.clone();
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
            width: Some(1920),
            scene: Some(SceneVariant::BunnyStars),
            seed: Some(42),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.scene.variant, SceneVariant::BunnyStars);
        assert_eq!(config.stars.seed, Some(42));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.stars.count, 50);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_kebab_case_scene() {
        let args = CliArgs::try_parse_from([
            "orrery",
            "--scene",
            "bunny-stars-planet",
            "--star-count",
            "10",
            "--asset-root",
            "static",
        ])
        .unwrap();
        assert_eq!(args.scene, Some(SceneVariant::BunnyStarsPlanet));
        assert_eq!(args.star_count, Some(10));
        assert_eq!(args.asset_root, Some(PathBuf::from("static")));
    }

    #[test]
    fn test_parse_rejects_unknown_scene() {
        assert!(CliArgs::try_parse_from(["orrery", "--scene", "galaxy"]).is_err());
    }
}
