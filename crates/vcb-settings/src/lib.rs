//! # vcb-settings
//!
//! Layered settings for the control board server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`BoardSettings::default()`]
//! 2. **User file**: `~/.vcb/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `VCB_*` overrides (highest priority)
//!
//! Command-line flags, applied by the binary, override all three.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings_from_path, settings_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_under_home() {
        let path = settings_path();
        assert!(path.ends_with(".vcb/settings.json"));
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = BoardSettings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.actions.timeout_ms, 60_000);
        assert_eq!(settings.logging.level, LogLevel::Info);
        settings.validate().unwrap();
    }
}
