//! Settings merge system
//!
//! Implements the 3-layer settings merge:
//! 1. Built-in defaults
//! 2. Settings file (./sshush.toml, then ~/.ssh/sshush.toml; `sshush.yml` is
//!    read when no TOML file is present)
//! 3. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinDefaults;
pub use effective::{
    CliOverrides, EffectiveSettings, SettingsError, SettingsFile, SettingsOrigin, SettingsSource,
    LEGACY_SETTINGS_FILE_NAMES, SETTINGS_FILE_NAME,
};
