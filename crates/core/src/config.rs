//! Configuration management
//!
//! Loads the bucket-sync configuration file. The file is TOML and lives at
//! ~/.config/bucket-sync/config.toml unless an explicit path is given.
//! Every value has a default, so a missing file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content_type::ContentTypePolicy;
use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Default maximum wait for a delete confirmation, in seconds
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 60;

/// Default key prefix for `upload_content`
const DEFAULT_CONTENT_PREFIX: &str = "/content/post/";

/// Default key suffix for `upload_content`
const DEFAULT_CONTENT_SUFFIX: &str = ".md";

/// Default local directory for downloads
const DEFAULT_STAGING_DIR: &str = "/tmp/site/";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Object store connection settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upload and download behavior
    #[serde(default)]
    pub sync: SyncOptions,
}

/// Object store connection settings
///
/// Credentials are not part of the configuration; the SDK default
/// provider chain resolves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region, resolved from the environment when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,

    /// Maximum wait for a delete to be confirmed
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

impl StorageConfig {
    /// Parse and validate the configured endpoint
    pub fn endpoint_url(&self) -> Result<Option<Url>> {
        self.endpoint
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(Error::from)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: None,
            force_path_style: false,
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

/// Upload and download behavior of a [`Bucket`](crate::Bucket)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Keep the uploaded directory's own name as the first key segment
    #[serde(default = "default_true")]
    pub include_root_dir: bool,

    /// Content type policy for uploaded files
    #[serde(default)]
    pub content_types: ContentTypePolicy,

    /// Mode for the download destination and its extra directories
    #[serde(default = "default_dest_dir_mode")]
    pub dest_dir_mode: u32,

    /// Mode for directories implied by object keys
    #[serde(default = "default_subdir_mode")]
    pub subdir_mode: u32,

    /// Key prefix used by `upload_content`
    #[serde(default = "default_content_prefix")]
    pub content_prefix: String,

    /// Key suffix used by `upload_content`
    #[serde(default = "default_content_suffix")]
    pub content_suffix: String,

    /// Default local directory for downloads
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Directories to create under the destination on every download
    #[serde(default)]
    pub extra_dirs: Vec<String>,
}

impl SyncOptions {
    /// Object key for a named piece of content
    pub fn content_key(&self, name: &str) -> String {
        format!("{}{}{}", self.content_prefix, name, self.content_suffix)
    }
}

fn default_true() -> bool {
    true
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

fn default_dest_dir_mode() -> u32 {
    0o777
}

fn default_subdir_mode() -> u32 {
    0o775
}

fn default_content_prefix() -> String {
    DEFAULT_CONTENT_PREFIX.to_string()
}

fn default_content_suffix() -> String {
    DEFAULT_CONTENT_SUFFIX.to_string()
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            include_root_dir: true,
            content_types: ContentTypePolicy::default(),
            dest_dir_mode: default_dest_dir_mode(),
            subdir_mode: default_subdir_mode(),
            content_prefix: default_content_prefix(),
            content_suffix: default_content_suffix(),
            staging_dir: default_staging_dir(),
            extra_dirs: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            storage: StorageConfig::default(),
            sync: SyncOptions::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("bucket-sync").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}",
                config.schema_version, SCHEMA_VERSION
            )));
        }
        config.schema_version = SCHEMA_VERSION;

        config.storage.endpoint_url()?;

        Ok(config)
    }

    /// Save configuration to disk, creating parent directories
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        Ok(())
    }
}
