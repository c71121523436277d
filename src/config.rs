//! User configuration for the Canvas connection
//!
//! Settings resolve in priority order: CLI flag, then environment variable,
//! then `~/.coursesed/config.toml`. The API token deliberately has no CLI
//! flag (process listings leak it).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const BASE_URL_ENV: &str = "CANVAS_BASE_URL";
pub const TOKEN_ENV: &str = "CANVAS_API_TOKEN";

/// User configuration structure for ~/.coursesed/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub canvas: Option<CanvasConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Default course to operate on when `--course` is not given.
    #[serde(default)]
    pub course: Option<u64>,
}

/// Parse the config file contents. Split out from [`load_user_config`] so
/// tests can feed strings directly.
pub fn parse_user_config(contents: &str) -> Result<UserConfig> {
    toml::from_str(contents).context("Failed to parse ~/.coursesed/config.toml")
}

/// Load user configuration from ~/.coursesed/config.toml
pub fn load_user_config() -> Result<Option<UserConfig>> {
    let Some(path) = config_path() else {
        log::debug!("Could not determine home directory");
        return Ok(None);
    };

    if !path.exists() {
        log::debug!("No user config found at ~/.coursesed/config.toml");
        return Ok(None);
    }

    let contents =
        std::fs::read_to_string(&path).context("Failed to read ~/.coursesed/config.toml")?;
    Ok(Some(parse_user_config(&contents)?))
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".coursesed").join("config.toml"))
}

fn file_config() -> CanvasConfig {
    match load_user_config() {
        Ok(Some(config)) => config.canvas.unwrap_or_default(),
        Ok(None) => CanvasConfig::default(),
        Err(e) => {
            log::warn!("Ignoring unreadable config file: {:#}", e);
            CanvasConfig::default()
        }
    }
}

/// Resolve the Canvas instance base URL.
pub fn resolve_base_url(flag: Option<String>) -> Result<String> {
    pick(flag, env::var(BASE_URL_ENV).ok(), file_config().base_url).with_context(|| {
        format!(
            "Canvas base URL not configured.\n\
             \n\
             Either:\n\
             1. Pass --base-url https://canvas.example.edu\n\
             2. Set the {} environment variable\n\
             3. Add base_url under [canvas] in ~/.coursesed/config.toml",
            BASE_URL_ENV
        )
    })
}

/// Resolve the Canvas API token.
pub fn resolve_token() -> Result<String> {
    pick(None, env::var(TOKEN_ENV).ok(), file_config().api_token).with_context(|| {
        format!(
            "Canvas API token not found.\n\
             \n\
             Either:\n\
             1. Set the {} environment variable\n\
             2. Add api_token under [canvas] in ~/.coursesed/config.toml\n\
             \n\
             Tokens are issued under Canvas Account > Settings > New Access Token.",
            TOKEN_ENV
        )
    })
}

/// Resolve the course to operate on.
pub fn resolve_course(flag: Option<u64>) -> Result<u64> {
    flag.or(file_config().course).context(
        "No course selected.\n\
         \n\
         Either:\n\
         1. Pass --course <ID>\n\
         2. Add course under [canvas] in ~/.coursesed/config.toml",
    )
}

/// First-wins resolution across the three configuration sources.
fn pick(flag: Option<String>, env: Option<String>, file: Option<String>) -> Option<String> {
    flag.or(env).or(file)
}
