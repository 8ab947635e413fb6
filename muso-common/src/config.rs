//! Configuration loading and path resolution
//!
//! Settings live in an optional TOML file under the platform config
//! directory. Paths resolve with priority: command-line argument →
//! environment variable → TOML config → compiled default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable naming the library root
pub const LIBRARY_ROOT_ENV: &str = "MUSO_LIBRARY_ROOT";

/// Environment variable naming the staging (download) directory
pub const STAGING_DIR_ENV: &str = "MUSO_STAGING_DIR";

/// One genre-mapping entry from the `[genres]` config table
#[derive(Debug, Clone, Deserialize)]
pub struct GenreEntry {
    /// Canonical label the raw catalog tag maps to
    pub label: String,
    /// Whether this tag selects the main (directory-level) genre
    #[serde(default)]
    pub main: bool,
}

/// TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root of the organized library
    pub library_root: Option<PathBuf>,
    /// Where freshly downloaded files wait for identification
    pub staging_dir: Option<PathBuf>,
    /// Override for the catalog User-Agent string
    pub user_agent: Option<String>,
    /// Extra raw-tag → canonical-genre mappings, merged over the builtins
    #[serde(default)]
    pub genres: HashMap<String, GenreEntry>,
}

impl TomlConfig {
    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Load configuration from the default location, or built-in defaults
    /// when no config file exists.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::load_from(&path)
            }
            _ => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Default configuration file path for the platform (`<config dir>/muso/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("muso").join("config.toml"))
}

/// Resolve the library root with CLI → env → TOML → default priority.
pub fn resolve_library_root(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    resolve_path(
        cli_arg,
        LIBRARY_ROOT_ENV,
        config.library_root.as_deref(),
        default_library_root,
    )
}

/// Resolve the staging directory with CLI → env → TOML → default priority.
pub fn resolve_staging_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    resolve_path(
        cli_arg,
        STAGING_DIR_ENV,
        config.staging_dir.as_deref(),
        default_staging_dir,
    )
}

fn resolve_path(
    cli_arg: Option<&Path>,
    env_var: &str,
    config_value: Option<&Path>,
    default: fn() -> PathBuf,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(env_var) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = config_value {
        return path.to_path_buf();
    }
    default()
}

/// OS-dependent default library root
fn default_library_root() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("muso")
}

/// OS-dependent default staging directory
fn default_staging_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("muso-staging")
}

/// User-Agent string for catalog requests.
///
/// MusicBrainz requires a contactable User-Agent; the configured override
/// wins when present.
pub fn user_agent(config: &TomlConfig) -> String {
    config.user_agent.clone().unwrap_or_else(|| {
        format!(
            "muso/{} ( https://github.com/muso-tools/muso )",
            env!("CARGO_PKG_VERSION")
        )
    })
}
