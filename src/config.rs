use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "appsettings.json";
pub const TOKEN_ENV_VAR: &str = "KAMARADA_TELEGRAM_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(rename = "Token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Mirrors the layout of `appsettings.json`: `{"Telegram": {"Token": "..."}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(rename = "Telegram", default)]
    pub telegram: TelegramSettings,
}

impl BotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// An explicit path must exist. Without one, the first existing default
    /// location is used, and having none is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        match Self::default_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::new()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BotConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn apply_env(self) -> Self {
        self.with_token_override(env::var(TOKEN_ENV_VAR).ok())
    }

    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.telegram.token = Some(token);
        }
        self
    }

    pub fn token(&self) -> Result<&str> {
        match self.telegram.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!(
                "No bot token configured: set Telegram.Token in {} or {}",
                CONFIG_FILE_NAME,
                TOKEN_ENV_VAR
            ),
        }
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("kamarada").join(CONFIG_FILE_NAME));
        }
        paths
    }
}
