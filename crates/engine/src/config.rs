use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;
use crate::strategy::StrategyKind;

/// Env var enabling per-worker start/end log lines.
pub const ENV_DEBUG: &str = "JOBRUNNER_DEBUG";
/// Env var selecting the built-in strategy (`sequential` | `priority`).
pub const ENV_STRATEGY: &str = "JOBRUNNER_STRATEGY";

/// Scheduler configuration, typically parsed from TOML.
///
/// ```toml
/// debug = true
/// strategy = "priority"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Log worker start/end at `info` instead of `debug`.
    #[serde(default)]
    pub debug: bool,
    /// Built-in strategy used to order workers before launch.
    #[serde(default)]
    pub strategy: StrategyKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            strategy: StrategyKind::Sequential,
        }
    }
}

impl SchedulerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, SchedulerError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Apply `JOBRUNNER_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), SchedulerError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SchedulerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_DEBUG) {
            self.debug = parse_bool(&v)
                .ok_or_else(|| SchedulerError::Config(format!("{}: expected a boolean, got '{}'", ENV_DEBUG, v)))?;
        }
        if let Some(v) = get(ENV_STRATEGY) {
            self.strategy = v
                .parse()
                .map_err(|e| SchedulerError::Config(format!("{}: {}", ENV_STRATEGY, e)))?;
        }
        Ok(())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SchedulerConfig::default();
        assert!(!config.debug);
        assert_eq!(config.strategy, StrategyKind::Sequential);
    }

    #[test]
    fn parse_toml() {
        let config = SchedulerConfig::from_toml_str("debug = true\nstrategy = \"priority\"\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.strategy, StrategyKind::Priority);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = SchedulerConfig::from_toml_str("strategy = \"random\"").unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SchedulerConfig::from_file("/nonexistent/jobrunner.toml").unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigIo(_)));
    }

    #[test]
    fn overrides_apply() {
        let mut config = SchedulerConfig::default();
        config
            .apply_overrides(lookup(&[(ENV_DEBUG, "yes"), (ENV_STRATEGY, "PRIORITY")]))
            .unwrap();
        assert!(config.debug);
        assert_eq!(config.strategy, StrategyKind::Priority);
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut config = SchedulerConfig {
            debug: true,
            strategy: StrategyKind::Priority,
        };
        config.apply_overrides(lookup(&[(ENV_DEBUG, ""), (ENV_STRATEGY, "  ")])).unwrap();
        assert!(config.debug);
        assert_eq!(config.strategy, StrategyKind::Priority);
    }

    #[test]
    fn bad_override_is_config_error() {
        let mut config = SchedulerConfig::default();
        let err = config.apply_overrides(lookup(&[(ENV_DEBUG, "maybe")])).unwrap_err();
        assert!(matches!(err, SchedulerError::Config(_)));
        assert!(err.to_string().contains(ENV_DEBUG));
    }
}
