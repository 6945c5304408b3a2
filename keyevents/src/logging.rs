use anyhow::{Context, anyhow};
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use log::{LevelFilter, info};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::config::APP_NAME;

pub const DEFAULT_LOG_LEVEL: &str = "error";

pub fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(s).map_err(|_| format!("Invalid log level: {s}"))
}

pub fn cache_dir() -> anyhow::Result<PathBuf> {
    let strategy = choose_base_strategy().context("Error when finding cache directory")?;
    let mut path = strategy.cache_dir();
    path.push(APP_NAME);
    Ok(path)
}

pub fn default_log_file() -> anyhow::Result<PathBuf> {
    Ok(cache_dir()?.join(format!("{APP_NAME}.log")))
}

fn make_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn setup_logging(level: LevelFilter) -> anyhow::Result<()> {
    let log_path = default_log_file()?;
    make_parent_dir(&log_path)?;

    let path = log_path
        .to_str()
        .ok_or_else(|| anyhow!("Log path {} is not valid UTF-8", log_path.display()))?;
    let _ = simple_log::file(path, level.as_str(), 100, 10);

    info!("Logging initialized at {}", log_path.display());
    Ok(())
}
