use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::client::http::DEFAULT_BASE_URL;
use crate::client::HttpClientFactory;
use crate::loader::{LoaderConfig, TranscriptMode};

const LOCAL_CONFIG_FILE: &str = "supadata-loader.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Supadata API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Defaults applied to transcript requests
    #[serde(default)]
    pub defaults: RequestDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key; `SUPADATA_API_KEY` is used when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    /// Preferred transcript language
    #[serde(default)]
    pub lang: Option<String>,

    /// Transcript mode
    #[serde(default)]
    pub mode: Option<TranscriptMode>,

    /// Request plain text transcripts
    #[serde(default = "default_text")]
    pub text: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_text() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            lang: None,
            mode: None,
            text: default_text(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, the working directory or the user config dir.
    ///
    /// An explicit path must exist; otherwise a missing file yields defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = fs_err::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path` or the default location
    pub async fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("supadata-loader").join("config.yaml"))
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;

        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Loader settings, preferring an explicit key over the configured one
    pub fn loader_config(&self, api_key: Option<String>) -> LoaderConfig {
        LoaderConfig {
            api_key: api_key.or_else(|| self.api.api_key.clone()),
        }
    }

    pub fn client_factory(&self) -> HttpClientFactory {
        HttpClientFactory::new(
            self.api.base_url.clone(),
            Duration::from_secs(self.api.timeout_secs),
        )
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API Key: {}", mask_key(self.api.api_key.as_deref()));
        println!("  Base URL: {}", self.api.base_url);
        println!("  Timeout: {}s", self.api.timeout_secs);
        if let Some(lang) = &self.defaults.lang {
            println!("  Default Language: {}", lang);
        }
        if let Some(mode) = &self.defaults.mode {
            println!("  Default Mode: {}", mode.as_str());
        }
        println!("  Plain Text: {}", self.defaults.text);
    }
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None | Some("") => "(from SUPADATA_API_KEY)".to_string(),
        Some(key) if key.chars().count() <= 4 => "****".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}
