use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";
pub const DEFAULT_WINDOW_MINUTES: u32 = 50;
pub const AUTH_TOKEN_ENV: &str = "TICKCORR_AUTH_TOKEN";

#[derive(Deserialize, Serialize, Clone)]
pub struct StockApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}

// Config is dumped at debug level, keep the token out of it
impl fmt::Debug for StockApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StockApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub stock_api: Option<StockApiConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            stock_api: Some(StockApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                auth_token: None,
            }),
        }
    }
}

fn default_window_minutes() -> u32 {
    DEFAULT_WINDOW_MINUTES
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    /// Symbols to correlate when none are given on the command line.
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            symbols: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults
    /// when it does not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "tickcorr", "tickcorr")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.providers
            .stock_api
            .as_ref()
            .map_or(DEFAULT_BASE_URL, |p| &p.base_url)
    }

    /// Bearer token for the stock API; the environment wins over the file.
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(AUTH_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.providers
                    .stock_api
                    .as_ref()
                    .and_then(|p| p.auth_token.clone())
            })
    }
}
