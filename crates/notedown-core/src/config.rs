//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/notedown/config.toml)
//! 3. Environment variables (NOTEDOWN_* prefix)
//!
//! Environment variables take precedence over config file values.
//! Missing credentials or target identifiers are configuration errors and
//! abort the run before any I/O.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "NOTEDOWN";

/// Default Notion API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.notion.com/v1";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Notion integration token
    #[serde(default)]
    pub token: Option<String>,

    /// Database to export (collection mode)
    #[serde(default)]
    pub database_id: Option<String>,

    /// Page IDs to export (parent page, or explicit list)
    #[serde(default)]
    pub page_ids: Vec<String>,

    /// Directory for exported Markdown files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for downloaded images
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Path of the JSON metadata index
    #[serde(default = "default_metadata_file")]
    pub metadata_file: PathBuf,

    /// Notion API base URL (overridable for testing)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            page_ids: Vec::new(),
            output_dir: default_output_dir(),
            images_dir: default_images_dir(),
            metadata_file: default_metadata_file(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (NOTEDOWN_TOKEN, NOTEDOWN_DATABASE_ID, ...)
    /// 2. Config file (~/.config/notedown/config.toml or NOTEDOWN_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_TOKEN", ENV_PREFIX)) {
            self.token = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_DATABASE_ID", ENV_PREFIX)) {
            self.database_id = if val.trim().is_empty() {
                None
            } else {
                Some(val.trim().to_string())
            };
        }

        if let Ok(val) = std::env::var(format!("{}_PAGE_IDS", ENV_PREFIX)) {
            self.page_ids = parse_id_list(&val);
        }

        if let Ok(val) = std::env::var(format!("{}_OUTPUT_DIR", ENV_PREFIX)) {
            self.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_IMAGES_DIR", ENV_PREFIX)) {
            self.images_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_METADATA_FILE", ENV_PREFIX)) {
            self.metadata_file = PathBuf::from(val);
        }
    }

    /// Validate that the configuration is sufficient to run an export
    ///
    /// A missing token or a missing target (neither database_id nor
    /// page_ids) is fatal, before any network or filesystem I/O.
    pub fn validate(&self) -> Result<()> {
        if self.token.as_deref().unwrap_or("").is_empty() {
            bail!("A Notion token is required (set NOTEDOWN_TOKEN or `token` in the config file)");
        }
        if self.database_id.is_none() && self.page_ids.is_empty() {
            bail!("Either a database ID or page IDs are required (set NOTEDOWN_DATABASE_ID or NOTEDOWN_PAGE_IDS)");
        }
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with the NOTEDOWN_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notedown")
            .join("config.toml")
    }
}

/// Parse a comma-separated list of IDs, dropping empty entries
pub fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("articles")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_metadata_file() -> PathBuf {
    PathBuf::from("data").join("articles_metadata.json")
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
