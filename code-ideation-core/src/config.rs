// configuration module - defaults, toml file and environment overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::excerpt::DEFAULT_CONTEXT_LINES;
use crate::ignore::DEFAULT_IGNORE_PATTERNS;
use crate::source::DEFAULT_MAX_FILE_SIZE;

/// env var naming a config file to load
pub const CONFIG_ENV: &str = "CODE_IDEATION_CONFIG";
/// env var replacing the ignore pattern list (newline or comma separated)
pub const IGNORE_ENV: &str = "CODE_IDEATION_IGNORE";
/// config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "code-ideation.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ignore: IgnoreConfig,
    pub source: SourceConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// files larger than this are skipped when loading a tree
    pub max_file_size_kb: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE / 1024,
        }
    }
}

impl SourceConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// lines shown around a suggestion's excerpt
    pub context_lines: usize,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            color: true,
        }
    }
}

impl Config {
    /// load `.env`, then the config file (if any), then env overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_ignore_override(env::var(IGNORE_ENV).ok().as_deref());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// replace the ignore list with patterns from an env-style value
    pub fn apply_ignore_override(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        self.ignore.patterns = value
            .split(['\n', ','])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    local.exists().then_some(local)
}
