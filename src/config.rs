use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::SeriesColors;
use crate::data::loader::LoadOptions;
use crate::data::schema::ColumnSchema;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "steam-monitor.json";
pub const CONFIG_ENV: &str = "STEAM_MONITOR_CONFIG";
pub const SOURCE_ENV: &str = "STEAM_MONITOR_SOURCE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so a partial file is fine.
///
/// ```json
/// {
///   "source": "https://example.org/data/df_clean.csv",
///   "fetch_timeout_secs": 15,
///   "schema": { "air_flow": ["Air flow %", "Channel2 Position"] },
///   "colors": { "stack_o2": "#7c3aed" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local path or URL of the readings file.
    pub source: String,
    pub fetch_timeout_secs: u64,
    pub schema: ColumnSchema,
    pub colors: SeriesColors,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: "data/df_clean.csv".into(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            schema: ColumnSchema::default(),
            colors: SeriesColors::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `explicit` if given (it must exist), otherwise the default file
    /// if present, otherwise built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// The command line wins over the environment, which wins over the file.
    pub fn with_source_overrides(mut self, env: Option<String>, cli: Option<String>) -> Self {
        if let Some(src) = cli.or(env).filter(|s| !s.trim().is_empty()) {
            self.source = src;
        }
        self
    }

    /// A zero timeout would fail every remote fetch; it falls back to the
    /// default.
    pub fn load_options(&self) -> LoadOptions {
        let secs = if self.fetch_timeout_secs == 0 {
            log::warn!(
                "fetch_timeout_secs = 0 is not usable, using {DEFAULT_FETCH_TIMEOUT_SECS}s"
            );
            DEFAULT_FETCH_TIMEOUT_SECS
        } else {
            self.fetch_timeout_secs
        };
        LoadOptions {
            schema: self.schema.clone(),
            fetch_timeout: Duration::from_secs(secs),
        }
    }
}
