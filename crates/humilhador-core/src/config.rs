use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::card::CardCapability;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub github_api_url: String,
    /// Public address of the deployed app, appended to share text
    pub public_base_url: Option<String>,
    pub bind_addr: String,
    /// Where the TUI sends `POST /api/roast`
    pub server_url: String,
    pub card_variant: CardCapability,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            public_base_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            card_variant: CardCapability::Export,
            export_dir: None,
        }
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Environment variables win over the file. `lookup` is injected so tests
    /// don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Some(model) = non_empty("HUMILHADOR_MODEL") {
            self.model = model;
        }
        if let Some(url) = non_empty("GITHUB_API_URL") {
            self.github_api_url = url;
        }
        if let Some(url) = non_empty("HUMILHADOR_PUBLIC_URL") {
            self.public_base_url = Some(url);
        }
        if let Some(addr) = non_empty("HUMILHADOR_BIND") {
            self.bind_addr = addr;
        }
        if let Some(url) = non_empty("HUMILHADOR_SERVER_URL") {
            self.server_url = url;
        }
        if let Some(variant) = non_empty("HUMILHADOR_CARD") {
            match CardCapability::from_str(&variant) {
                Some(capability) => self.card_variant = capability,
                None => tracing::warn!("Ignoring unknown HUMILHADOR_CARD value: {}", variant),
            }
        }
        if let Some(dir) = non_empty("HUMILHADOR_EXPORT_DIR") {
            self.export_dir = Some(PathBuf::from(dir));
        }
    }

    /// Export directory, falling back to the user's download folder and then
    /// the working directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("humilhador").join("config.json"))
    }
}
