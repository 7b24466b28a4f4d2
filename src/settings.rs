use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

pub const SETTINGS_FILE: &str = "settings.toml";

const DEFAULT_BASE_URL: &str = "https://slack.com/api";
const DEFAULT_PAGE_SIZE: u32 = 200;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url", rename = "base-url")]
    pub base_url: String,
    #[serde(default = "default_page_size", rename = "page-size")]
    pub page_size: u32,
    /// Upper bound on pages fetched per paginated call. Unbounded when absent.
    #[serde(
        default,
        rename = "max-pages",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_pages: Option<usize>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            max_pages: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AppError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Self =
            toml::from_str(&content).map_err(|e| AppError::TomlParse(e.to_string()))?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }
}
