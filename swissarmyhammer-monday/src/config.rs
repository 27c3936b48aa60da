//! Client configuration loaded with figment.
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. `monday.toml`, `monday.yaml` or `monday.json` in the working directory
//! 3. Environment variables prefixed with `MONDAY_` (e.g. `MONDAY_TOKEN`)

use crate::error::{MondayError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Default GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.monday.com/v2";

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for transient HTTP failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between retries in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default number of creation mutations in flight at once
pub const DEFAULT_CREATE_CONCURRENCY: usize = 4;

const ENV_PREFIX: &str = "MONDAY_";
const CONFIG_FILE_STEM: &str = "monday";

/// Connection and paging settings for [`MondayClient`](crate::MondayClient).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MondayConfig {
    pub endpoint: String,
    pub token: String,
    pub api_version: Option<String>,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub create_concurrency: usize,
}

impl Default for MondayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: String::new(),
            api_version: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            create_concurrency: DEFAULT_CREATE_CONCURRENCY,
        }
    }
}

// The token never appears in logs.
impl fmt::Debug for MondayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MondayConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("api_version", &self.api_version)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("create_concurrency", &self.create_concurrency)
            .finish()
    }
}

impl MondayConfig {
    pub fn builder() -> MondayConfigBuilder {
        MondayConfigBuilder::default()
    }

    /// Load from defaults, the working directory's config file and `MONDAY_*` variables.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        for file in Self::discover_files() {
            trace!("Loading config file: {}", file.display());
            figment = figment.merge(Self::file_provider(&file)?);
        }
        Self::finish(figment.merge(Self::env_provider()))
    }

    /// Like [`load`](Self::load), with an explicit file layered over any discovered one.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MondayError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        for file in Self::discover_files() {
            figment = figment.merge(Self::file_provider(&file)?);
        }
        figment = figment.merge(Self::file_provider(path)?);
        Self::finish(figment.merge(Self::env_provider()))
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(MondayError::config("token is required"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(MondayError::config("endpoint cannot be empty"));
        }
        if self.page_size == 0 {
            return Err(MondayError::config("page_size must be greater than zero"));
        }
        if self.create_concurrency == 0 {
            return Err(MondayError::config(
                "create_concurrency must be greater than zero",
            ));
        }
        Ok(())
    }

    fn finish(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(?config, "Loaded monday configuration");
        Ok(config)
    }

    fn discover_files() -> Vec<PathBuf> {
        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| PathBuf::from(format!("{CONFIG_FILE_STEM}.{ext}")))
            .filter(|path| path.is_file())
            .collect()
    }

    fn file_provider(path: &Path) -> Result<Figment> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        match extension {
            "toml" => Ok(Figment::from(Toml::file(path))),
            "yaml" | "yml" => Ok(Figment::from(Yaml::file(path))),
            "json" => Ok(Figment::from(Json::file(path))),
            other => Err(MondayError::config(format!(
                "unsupported config format '{other}': {}",
                path.display()
            ))),
        }
    }

    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into())
    }
}

/// Builder for [`MondayConfig`], starting from the defaults.
#[derive(Debug, Default)]
pub struct MondayConfigBuilder {
    config: MondayConfig,
}

impl MondayConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = Some(version.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry_delay_ms = millis;
        self
    }

    pub fn create_concurrency(mut self, concurrency: usize) -> Self {
        self.config.create_concurrency = concurrency;
        self
    }

    pub fn build(self) -> MondayConfig {
        self.config
    }
}
