use crate::pattern::DEFAULT_EXTENSIONS;
use crate::report::ReportFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = ".pagefix.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,

    /// Look inside .cbz/.zip archives
    #[serde(default = "default_true")]
    pub archives: bool,

    /// Image extensions considered for renaming
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Change list format: "text" or "json"
    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            archives: true,
            extensions: default_extensions(),
            format: ReportFormat::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect()
}

impl Config {
    /// Load the first config found: `./.pagefix.toml`, then `global`.
    ///
    /// Missing files fall back to defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(global: Option<&Path>) -> Result<Self> {
        let local = std::env::current_dir()
            .ok()
            .map(|cwd| cwd.join(CONFIG_FILE_NAME));

        let candidates: Vec<PathBuf> = local
            .into_iter()
            .chain(global.map(Path::to_path_buf))
            .collect();

        for path in candidates {
            if path.is_file() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}
