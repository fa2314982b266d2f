use config::{self, Environment, File, FileFormat};
use log::{debug, error, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::buffer::BufferConfig;
use crate::collector::OrderingPolicy;
use crate::error::{CollectorError, Result};
use crate::retry::RetryConfig;

/// Collector section of the settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CollectorSettings {
    /// Maximum points per collector, 0 for no limit
    pub capacity: usize,
    /// Timestamp ordering rule
    pub ordering: OrderingPolicy,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            capacity: 0,
            ordering: OrderingPolicy::Strict,
        }
    }
}

/// Output buffer section of the settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BufferSettings {
    pub max_per_series: usize,
    pub max_total: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        let defaults = BufferConfig::default();
        Self {
            max_per_series: defaults.max_per_series,
            max_total: defaults.max_total,
        }
    }
}

impl From<&BufferSettings> for BufferConfig {
    fn from(settings: &BufferSettings) -> Self {
        BufferConfig {
            max_per_series: settings.max_per_series,
            max_total: settings.max_total,
        }
    }
}

/// Sink retry section of the settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: usize,
    pub initial_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay_ms,
            backoff_factor: defaults.backoff_factor,
            max_delay_ms: defaults.max_delay_ms,
            jitter: defaults.jitter,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig {
            max_attempts: settings.max_attempts,
            initial_delay_ms: settings.initial_delay_ms,
            backoff_factor: settings.backoff_factor,
            max_delay_ms: settings.max_delay_ms,
            jitter: settings.jitter,
        }
    }
}

/// Logging level
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

/// Runtime settings
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub collector: CollectorSettings,
    pub buffer: BufferSettings,
    pub retry: RetrySettings,
    pub log_level: LogLevel,
}

/// Source of configuration
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// File path, format chosen by extension
    File(PathBuf),
    /// Environment variables with a prefix
    Environment(String),
    /// TOML string
    Toml(String),
}

/// Map a file extension to a configuration format
fn file_format(path: &Path) -> Result<FileFormat> {
    let extension = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase(),
        None => {
            return Err(CollectorError::Config(format!(
                "Configuration file has no extension: {}",
                path.display()
            )));
        }
    };

    match extension.as_str() {
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        format => Err(CollectorError::Config(format!(
            "Unsupported config format: {}",
            format
        ))),
    }
}

/// Build settings from sources in order; later sources override earlier ones
pub fn load_from_sources(sources: Vec<ConfigSource>) -> Result<Settings> {
    let mut builder = config::Config::builder();

    for source in sources {
        match source {
            ConfigSource::File(path) => {
                if !path.exists() {
                    warn!("Configuration file not found: {}", path.display());
                    continue;
                }
                let format = file_format(&path)?;
                debug!("Loading configuration from file: {}", path.display());
                builder = builder.add_source(File::from(path.as_path()).format(format));
            }
            ConfigSource::Environment(prefix) => {
                debug!("Loading configuration from environment with prefix: {}", prefix);
                builder = builder.add_source(
                    Environment::with_prefix(&prefix)
                        .separator("__")
                        .try_parsing(true),
                );
            }
            ConfigSource::Toml(toml_str) => {
                debug!("Loading configuration from TOML string");
                builder = builder.add_source(File::from_str(&toml_str, FileFormat::Toml));
            }
        }
    }

    let config = builder
        .build()
        .map_err(|e| CollectorError::Config(format!("Failed to build configuration: {}", e)))?;

    let settings = config
        .try_deserialize()
        .map_err(|e| CollectorError::Config(format!("Failed to deserialize configuration: {}", e)))?;

    debug!("Configuration loaded: {:?}", settings);
    Ok(settings)
}

/// Load settings from a single file, which must exist
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());

    if !path.exists() {
        error!("Configuration file {} does not exist", path.display());
        return Err(CollectorError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    file_format(path)?;
    load_from_sources(vec![ConfigSource::File(path.to_path_buf())])
}

/// Settings builder
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    sources: Vec<ConfigSource>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file source; missing files are skipped
    pub fn add_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources.push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add environment variables, e.g. `UDTF__COLLECTOR__CAPACITY`
    pub fn add_env(mut self, prefix: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Environment(prefix.into()));
        self
    }

    /// Add TOML string
    pub fn add_toml(mut self, toml: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Toml(toml.into()));
        self
    }

    pub fn build(self) -> Result<Settings> {
        load_from_sources(self.sources)
    }
}
