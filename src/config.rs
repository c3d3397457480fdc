use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::gemini::{DEFAULT_ANSWERING_MODEL, DEFAULT_GEMINI_BASE_URL, DEFAULT_MATCHING_MODEL};
use crate::services::sheets::DEFAULT_SHEETS_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub sheets: SheetsSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

/// Remote row-store; the in-memory store is used when `url` is unset
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsSettings {
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            base_url: default_sheets_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SheetsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_matching_model")]
    pub matching_model: String,
    #[serde(default = "default_answering_model")]
    pub answering_model: String,
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            api_key: None,
            matching_model: default_matching_model(),
            answering_model: default_answering_model(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_path")]
    pub path: String,
    #[serde(default = "default_l1_capacity")]
    pub l1_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            l1_capacity: default_l1_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout_secs() -> u64 { 30 }
fn default_gemini_timeout_secs() -> u64 { 120 }
fn default_sheets_base_url() -> String { DEFAULT_SHEETS_BASE_URL.to_string() }
fn default_gemini_base_url() -> String { DEFAULT_GEMINI_BASE_URL.to_string() }
fn default_matching_model() -> String { DEFAULT_MATCHING_MODEL.to_string() }
fn default_answering_model() -> String { DEFAULT_ANSWERING_MODEL.to_string() }
fn default_cache_path() -> String { ".estateflow/cache.toml".to_string() }
fn default_l1_capacity() -> u64 { 64 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

fn environment() -> Environment {
    Environment::with_prefix("ESTATEFLOW")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with ESTATEFLOW__)
    /// 4. Well-known provider variables (SUPABASE_URL, GEMINI_API_KEY, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ESTATEFLOW__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings = substitute_env_vars(settings, |key| std::env::var(key).ok())?;
        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

/// Map provider variables onto their settings
fn substitute_env_vars(
    settings: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = non_empty("SUPABASE_URL") {
        builder = builder.set_override("store.url", url)?;
    }
    if let Some(key) = non_empty("SUPABASE_ANON_KEY") {
        builder = builder.set_override("store.api_key", key)?;
    }
    if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
        builder = builder.set_override("gemini.api_key", key)?;
    }

    builder.build()
}
