//! Board configuration file locations and action execution settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the board's configuration documents live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardFileSettings {
    /// Directory holding the configuration documents. A leading `~/` is
    /// expanded to the home directory.
    pub config_dir: String,
    /// UI document file name, relative to `config_dir`.
    pub ui_config_file: String,
    /// Actions document file name, relative to `config_dir`.
    pub actions_config_file: String,
}

impl Default for BoardFileSettings {
    fn default() -> Self {
        Self {
            config_dir: "~/.vcb/board".to_string(),
            ui_config_file: "ui_config.json".to_string(),
            actions_config_file: "actions_config.json".to_string(),
        }
    }
}

impl BoardFileSettings {
    /// The configuration directory with `~` expanded.
    pub fn resolved_config_dir(&self) -> PathBuf {
        expand_home(&self.config_dir)
    }

    /// Full path of the UI document.
    pub fn ui_config_path(&self) -> PathBuf {
        self.resolved_config_dir().join(&self.ui_config_file)
    }

    /// Full path of the actions document.
    pub fn actions_config_path(&self) -> PathBuf {
        self.resolved_config_dir().join(&self.actions_config_file)
    }
}

/// Action execution settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSettings {
    /// Upper bound on a single handler invocation, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self { timeout_ms: 60_000 }
    }
}

impl ActionSettings {
    /// Execution timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => crate::loader::home_dir().join(rest),
        None if path == "~" => crate::loader::home_dir(),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_dir_unchanged() {
        let s = BoardFileSettings {
            config_dir: "/etc/vcb".into(),
            ..Default::default()
        };
        assert_eq!(s.ui_config_path(), PathBuf::from("/etc/vcb/ui_config.json"));
        assert_eq!(
            s.actions_config_path(),
            PathBuf::from("/etc/vcb/actions_config.json")
        );
    }

    #[test]
    fn tilde_is_expanded() {
        let s = BoardFileSettings::default();
        let dir = s.resolved_config_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with(".vcb/board"));
    }

    #[test]
    fn relative_dir_kept_relative() {
        let s = BoardFileSettings {
            config_dir: "config_examples".into(),
            ..Default::default()
        };
        assert_eq!(s.resolved_config_dir(), PathBuf::from("config_examples"));
    }

    #[test]
    fn action_timeout_default() {
        assert_eq!(ActionSettings::default().timeout(), Duration::from_secs(60));
    }
}
