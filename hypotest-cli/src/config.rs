//! Configuration loading from hypotest.toml
//!
//! Hypotest configuration can be specified in a `hypotest.toml` file in the
//! project root. The file is discovered by walking up from the current
//! directory; every field has a default, so partial files are fine.

use hypotest_core::{JsonFileStore, MemoryStore, ResultStore, StoreError};
use hypotest_engine::EngineOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name looked up by [`HypotestConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "hypotest.toml";

/// Hypotest configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HypotestConfig {
    /// HTTP service configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Result store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Analysis defaults
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload file, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Largest accepted number of data rows per upload
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            max_rows: default_max_rows(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_max_rows() -> usize {
    100_000
}

/// Where analyses are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// Process memory; lost on exit
    Memory,
    /// A JSON file rewritten on every change (default)
    #[default]
    Json,
}

/// Result store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "memory" or "json"
    #[serde(default)]
    pub backend: StoreBackend,
    /// File used by the JSON backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".hypotest/results.json")
}

impl StoreConfig {
    /// Open the configured store
    pub fn open(&self) -> Result<Arc<dyn ResultStore>, StoreError> {
        Ok(match self.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Json => Arc::new(JsonFileStore::open(self.path.clone())?),
        })
    }
}

/// Analysis defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Confidence level used when a request does not give one
    #[serde(default = "default_confidence_level")]
    pub default_confidence_level: f64,
    /// Apply Yates' continuity correction to 2x2 chi-square tables
    #[serde(default)]
    pub yates_correction: bool,
    /// Worker threads for batch analysis (None = all cores)
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_confidence_level: default_confidence_level(),
            yates_correction: false,
            threads: None,
        }
    }
}

fn default_confidence_level() -> f64 {
    0.95
}

impl AnalysisConfig {
    /// Engine options derived from this section
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            yates_correction: self.yates_correction,
        }
    }
}

impl HypotestConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `hypotest.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Hypotest Configuration

[server]
# Interface and port for `hypotest serve`
host = "127.0.0.1"
port = 8000
# Largest accepted upload, in bytes
max_upload_bytes = 10485760
# Largest accepted number of data rows per upload
max_rows = 100000

[store]
# Backend: "memory" (lost on exit) or "json"
backend = "json"
# File used by the json backend
path = ".hypotest/results.json"

[analysis]
# Confidence level used when a request does not give one (0.0 to 1.0)
default_confidence_level = 0.95
# Yates' continuity correction for 2x2 chi-square tables
yates_correction = false
# Worker threads for batch analysis (uncomment to pin; default is all cores)
# threads = 4
"#
        .to_string()
    }
}
