//! The orrery viewer binary.

use clap::Parser;
use orrery_app::{AppError, ConfigSource, PlatformDirs, run};
use orrery_config::{CliArgs, Config};
use tracing::info;

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = start(args) {
        eprintln!("orrery: {e}");
        std::process::exit(1);
    }
}

fn start(args: CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve()?.with_config_dir(args.config.clone());
    dirs.create_dirs()?;

    let on_disk = Config::load_or_create(&dirs.config_dir)?;
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(
        scene = config.scene.variant.name(),
        config_dir = %dirs.config_dir.display(),
        asset_root = %config.scene.asset_root.display(),
        "Starting orrery"
    );

    config.validate()?;

    let source = ConfigSource {
        dir: dirs.config_dir,
        on_disk,
        overrides: args,
    };
    run(config, Some(source))
}
