use anyhow::{Context, Result};
use dexle_game::GameConfig;

use crate::Args;

/// Build the effective configuration: defaults, then `--config`, then flags.
pub fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(path) = &args.catalog {
        config.catalog_path.clone_from(path);
    }
    if let Some(path) = &args.state {
        config.state_path.clone_from(path);
    }
    if let Some(dir) = &args.guess_dir {
        config.guess_dir.clone_from(dir);
    }
    if let Some(offset) = args.utc_offset {
        config.utc_offset_seconds = offset;
    }
    config.validate().context("invalid configuration")?;
    log::debug!("effective config: {config:?}");
    Ok(config)
}
