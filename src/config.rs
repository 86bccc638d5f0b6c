//! Engine configuration.
//!
//! Loaded from a JSON file named by `CODEADVENTURE_CONFIG_PATH`, with individual
//! environment overrides applied on top. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, io};
use thiserror::Error;
use tracing::warn;

pub const CONFIG_PATH_ENV: &str = "CODEADVENTURE_CONFIG_PATH";
pub const UNLOCK_ALL_LEVELS_ENV: &str = "CODEADVENTURE_UNLOCK_ALL_LEVELS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Step budget for levels that do not set `goal.stepLimit`
    pub default_step_limit: u32,
    /// Deepest allowed nesting of repeat/conditional bodies
    pub max_depth: usize,
    /// Report every level as unlocked (classroom demos and testing)
    pub unlock_all_levels: bool,
    /// Outfit every new or reset profile starts with
    pub starter_outfit: String,
    pub default_settings: crate::progress::StudentSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_step_limit: 200,
            max_depth: 10,
            unlock_all_levels: false,
            starter_outfit: "starter-cape".to_string(),
            default_settings: crate::progress::StudentSettings::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read engine config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        EngineConfig::from_json_str(&contents)
    }

    /// Apply `CODEADVENTURE_UNLOCK_ALL_LEVELS` if it is set to a boolean-ish value
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(UNLOCK_ALL_LEVELS_ENV) {
            match parse_flag(&value) {
                Some(flag) => self.unlock_all_levels = flag,
                None => warn!(
                    variable = UNLOCK_ALL_LEVELS_ENV,
                    value = %value,
                    "ignoring unrecognised boolean override"
                ),
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Load the config named by the environment, falling back to defaults on any failure
pub fn load_config_from_env() -> (EngineConfig, Option<PathBuf>) {
    let path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let mut config = match &path {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "falling back to default engine config");
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };
    config.apply_env_overrides();
    (config, path)
}
