//! Viewer settings.
//!
//! Settings come from an optional JSON file named by `ESPBOARD_CONFIG`:
//!
//! ```json
//! {
//!   "bindAddr": "127.0.0.1:4200",
//!   "dataDir": "./data",
//!   "staticDir": "./web-app/dist",
//!   "logFilter": "info,espboard_web=debug"
//! }
//! ```
//!
//! Every field is optional. `ESPBOARD_BIND` and `ESPBOARD_DATA_DIR` override
//! the file; unset values fall back to the defaults below.

use std::fs;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "ESPBOARD_CONFIG";
pub const BIND_ENV: &str = "ESPBOARD_BIND";
pub const DATA_DIR_ENV: &str = "ESPBOARD_DATA_DIR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4200";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_FILTER: &str = "info,espboard_web=debug";

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid bind address {addr}: {source}")]
    InvalidBindAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },
}

/// Settings of the viewer binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSettings {
    /// HTTP listen address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<String>,

    /// Directory holding the dataset files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Directory of the built web UI, served at `/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl ViewerSettings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        let lookup = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let settings = match lookup(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(settings.with_overrides(lookup))
    }

    /// Apply `ESPBOARD_BIND` / `ESPBOARD_DATA_DIR` style overrides.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(BIND_ENV) {
            self.bind_addr = Some(addr);
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let addr = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        addr.parse().map_err(|source| SettingsError::InvalidBindAddr {
            addr: addr.to_string(),
            source,
        })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn static_dir(&self) -> Option<&Path> {
        self.static_dir.as_deref()
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
