use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use jobrunner_engine::SchedulerConfig;

/// Load the scheduler config from `path`, then apply environment overrides.
///
/// A missing file is not an error: defaults are used instead.
pub fn load(path: &str) -> Result<SchedulerConfig> {
    let config_path = Path::new(path);

    let mut config = if config_path.exists() {
        debug!(?config_path, "loading config");
        SchedulerConfig::from_file(config_path)
            .with_context(|| format!("failed to load config: {}", config_path.display()))?
    } else {
        warn!(?config_path, "config file not found, using defaults");
        SchedulerConfig::default()
    };

    config
        .apply_env_overrides()
        .context("invalid scheduler environment override")?;
    Ok(config)
}
