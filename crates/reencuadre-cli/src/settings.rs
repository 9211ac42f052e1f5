use anyhow::{Context, Result};
use log::debug;
use reencuadre_core::history::DEFAULT_APP_ID;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const DEFAULT_SETTINGS_FILE: &str = "reencuadre.toml";
pub const DEFAULT_ENGINE: &str = "openai";

/// Contents of `reencuadre.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub app_id: String,
    /// Directory of the persistent history; history is kept in memory
    /// for the current process when unset.
    pub store_path: Option<PathBuf>,
    pub owner_id: Option<String>,
    /// Sign-in token exchanged for an owner id when `owner_id` is unset.
    pub auth_token: Option<String>,
    pub engine: String,
    /// Engine configuration JSON used by `generate --remote`.
    pub engine_config: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            store_path: None,
            owner_id: None,
            auth_token: None,
            engine: DEFAULT_ENGINE.to_string(),
            engine_config: None,
        }
    }
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(e.to_string()).into())
    }

    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
        };
        if !required && !path.exists() {
            debug!("No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read settings file '{}'", path.display()))?;
        let settings = Self::parse(&content)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
