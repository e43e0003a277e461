// supportbot-cli/src/settings.rs
//! Finds and loads `Support.toml`, then layers environment and flag overrides on top.

use crate::models::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use supportbot_core::config::{AgentConfig, EnvOverrides};
use tracing::info;

pub const CONFIG_FILENAME: &str = "Support.toml";

/// Nearest `Support.toml` in `start` or one of its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

pub fn load_config_file(path: &Path) -> Result<AgentConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    AgentConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse or validate {:?}", path))
}

/// Config from `--config`, else the nearest file up from `cwd`, else defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<AgentConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(cwd),
    };
    match path {
        Some(path) => {
            info!("Found configuration file at: {:?}", path);
            load_config_file(&path)
        }
        None => {
            info!("No {} found; using built-in defaults.", CONFIG_FILENAME);
            Ok(AgentConfig::default())
        }
    }
}

/// Environment values with command-line flags taking precedence.
pub fn merge_overrides(cli: &Cli, env: EnvOverrides) -> EnvOverrides {
    EnvOverrides {
        model: cli.model.clone().or(env.model),
        temperature: cli.temperature.or(env.temperature),
        debug: cli.debug || env.debug,
    }
}
