use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Settings file picked up from the working directory when `--config` is absent.
pub const SETTINGS_FILE: &str = "shapecheck.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("toml decode error in {}: {source}", path.display())]
    TomlDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    pub output: OutputFormat,
    pub log: LogSettings,
}

/// Load settings from `explicit`, else from [`SETTINGS_FILE`] if it exists,
/// else fall back to defaults.
pub fn load_settings(explicit: Option<&Path>) -> SettingsResult<CliSettings> {
    if let Some(path) = explicit {
        return read_settings(path);
    }

    let path = Path::new(SETTINGS_FILE);
    if path.exists() {
        return read_settings(path);
    }
    Ok(CliSettings::default())
}

fn read_settings(path: &Path) -> SettingsResult<CliSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: CliSettings =
        toml::from_str(&content).map_err(|source| SettingsError::TomlDecode {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}
