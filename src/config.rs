use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::params::Difficulty;
use crate::source::opentdb::DEFAULT_BASE_URL;

pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub default_difficulty: Option<Difficulty>,
}

fn default_theme() -> String {
    "light".to_string()
}
fn default_batch_size() -> usize {
    5
}
fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            batch_size: default_batch_size(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_difficulty: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizr")
            .join("config.toml")
    }

    /// Clamp numeric fields into usable ranges and fall back to the default
    /// theme when the stored one is unknown.
    pub fn validate(&mut self, valid_themes: &[String]) {
        self.batch_size = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        self.request_timeout_secs = self.request_timeout_secs.max(1);
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        if !valid_themes.iter().any(|t| *t == self.theme) {
            self.theme = default_theme();
        }
    }
}

/// Process-wide display preferences, read at startup and written on toggle.
pub trait PreferenceStore {
    fn load_theme(&self) -> Option<String>;
    fn save_theme(&mut self, theme: &str) -> Result<()>;
}

/// Stores the theme inside the TOML config file, leaving other keys intact.
pub struct ConfigPreferences {
    path: PathBuf,
}

impl ConfigPreferences {
    pub fn new() -> Self {
        Self::with_path(Config::config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PreferenceStore for ConfigPreferences {
    fn load_theme(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        Config::load_from(&self.path).ok().map(|c| c.theme)
    }

    fn save_theme(&mut self, theme: &str) -> Result<()> {
        let mut config = Config::load_from(&self.path).unwrap_or_default();
        config.theme = theme.to_string();
        config.save_to(&self.path)
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    theme: Option<String>,
}

impl PreferenceStore for MemoryPreferences {
    fn load_theme(&self) -> Option<String> {
        self.theme.clone()
    }

    fn save_theme(&mut self, theme: &str) -> Result<()> {
        self.theme = Some(theme.to_string());
        Ok(())
    }
}
