//! Layered configuration: defaults, then a config file, then environment.

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

pub use crate::error::{Error, ErrorKind, Result};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "QUIRE_";
/// Separator between nested keys in environment variable names
/// (`QUIRE_SEARCH__CACHE_TTL` sets `search.cache_ttl`).
pub const ENV_SEPARATOR: &str = "__";
/// Name of the configuration file looked up in the platform config directory.
pub const DEFAULT_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the Calibre library (the directory containing `metadata.db`).
    pub library: PathBuf,
    pub search: SearchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Seconds a computed search result list is served from the cache.
    pub cache_ttl: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { library: PathBuf::from("."), search: SearchConfig::default(), log: LogConfig::default() }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { cache_ttl: 60 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl SearchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

impl Config {
    /// Loads configuration from every layer.
    ///
    /// An explicit `file` must exist. Without one, `config.toml` in the
    /// platform config directory is used if present.
    #[instrument(level = "debug")]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_file().filter(|path| path.is_file()),
        };
        tracing::debug!(file = ?file, "Loading configuration");
        Self::figment(file.as_deref())?.extract().or_raise(|| ErrorKind::Invalid)
    }

    /// Assembles the provider stack without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_ascii_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(extension)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)))
    }
}

/// `config.toml` inside the platform configuration directory, if one can be
/// determined for the current user.
pub fn default_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quire").map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
}
