//! Initial board configuration from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use vcb_core::{ActionsConfig, ConfigSnapshot, SnapshotError, UiConfig};
use vcb_settings::BoardFileSettings;

/// Failure to load the initial configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A configuration document does not exist.
    #[error("configuration file not found: {}", path.display())]
    Missing {
        /// Expected location.
        path: PathBuf,
    },

    /// A configuration document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A configuration document is not valid JSON for its schema.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration document is blank or `null`.
    #[error("configuration file is empty: {}", path.display())]
    Empty {
        /// Offending file.
        path: PathBuf,
    },

    /// The documents parsed but do not form a valid board.
    #[error("invalid board configuration: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Reads the UI and actions documents and validates them into a snapshot.
#[derive(Clone, Debug)]
pub struct BoardConfigLoader {
    ui_path: PathBuf,
    actions_path: PathBuf,
}

impl BoardConfigLoader {
    /// Loader for explicit document paths.
    pub fn new(ui_path: impl Into<PathBuf>, actions_path: impl Into<PathBuf>) -> Self {
        Self {
            ui_path: ui_path.into(),
            actions_path: actions_path.into(),
        }
    }

    /// Loader for the locations named in settings.
    pub fn from_settings(settings: &BoardFileSettings) -> Self {
        Self::new(settings.ui_config_path(), settings.actions_config_path())
    }

    /// UI document path.
    pub fn ui_path(&self) -> &Path {
        &self.ui_path
    }

    /// Actions document path.
    pub fn actions_path(&self) -> &Path {
        &self.actions_path
    }

    /// Read both documents and build a validated snapshot.
    pub fn load(&self) -> Result<ConfigSnapshot, LoadError> {
        let ui: UiConfig = read_document(&self.ui_path)?;
        let actions: ActionsConfig = read_document(&self.actions_path)?;
        let snapshot = ConfigSnapshot::new(ui, actions)?;
        info!(
            ui = %self.ui_path.display(),
            actions = %self.actions_path.display(),
            pages = snapshot.pages().len(),
            buttons = snapshot.ui().buttons().count(),
            action_count = snapshot.actions().len(),
            "board configuration loaded"
        );
        Ok(snapshot)
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let json_err = |source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    };
    if content.trim().is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    let value: serde_json::Value = serde_json::from_str(&content).map_err(json_err)?;
    if value.is_null() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), "configuration document parsed");
    serde_json::from_value(value).map_err(json_err)
}
