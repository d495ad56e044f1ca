//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FLYBERRY_SW_*)
//! 2. TOML config file (if FLYBERRY_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FLYBERRY_SW_*)
/// 2. TOML config file (if FLYBERRY_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Site origin that relative request paths resolve against.
    ///
    /// Set via FLYBERRY_SW_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite partition store.
    ///
    /// Set via FLYBERRY_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Product prefix shared by every partition this worker owns.
    ///
    /// Activation only prunes partitions carrying this prefix.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag appended to partition names.
    ///
    /// Bumping it is the only way to invalidate previously cached assets.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Paths seeded into the static partition during install.
    #[serde(default = "default_critical_resources")]
    pub critical_resources: Vec<String>,

    /// Pages prefetched when the background sync tag fires.
    #[serde(default = "default_prefetch_urls")]
    pub prefetch_urls: Vec<String>,

    /// Tag the host must send to trigger the prefetch routine.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via FLYBERRY_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via FLYBERRY_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via FLYBERRY_SW_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./flyberry-sw-cache.sqlite")
}

fn default_cache_prefix() -> String {
    "flyberry-".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_critical_resources() -> Vec<String> {
    ["/", "/index.html", "/selection.html", "/logo.webp", "/css/critical.css", "/js/optimized.js"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_prefetch_urls() -> Vec<String> {
    ["/selection.html", "/byob.html", "/premade.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_user_agent() -> String {
    "flyberry-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            critical_resources: default_critical_resources(),
            prefetch_urls: default_prefetch_urls(),
            sync_tag: default_sync_tag(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

/// Names of the three partitions owned by the current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartitionNames {
    /// General partition for navigable pages and the `other` fallback.
    pub pages: String,
    /// Critical shell assets (HTML, CSS, JS, fonts).
    pub statics: String,
    /// Binary image assets.
    pub images: String,
}

impl PartitionNames {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            pages: format!("{prefix}ultra-{version}"),
            statics: format!("{prefix}static-{version}"),
            images: format!("{prefix}images-{version}"),
        }
    }

    /// All current names, in the order activation re-opens them.
    pub fn all(&self) -> [&str; 3] {
        [self.pages.as_str(), self.statics.as_str(), self.images.as_str()]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all().contains(&name)
    }
}

impl WorkerConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Partition names for the configured prefix and version.
    pub fn partitions(&self) -> PartitionNames {
        PartitionNames::new(&self.cache_prefix, &self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FLYBERRY_SW_`
    /// 2. TOML file from `FLYBERRY_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FLYBERRY_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FLYBERRY_SW_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
