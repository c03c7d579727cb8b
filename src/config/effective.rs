//! Effective settings with provenance
//!
//! The effective settings are the merged result of the built-in defaults, an
//! optional settings file and the command-line flags, plus a record of which
//! layers contributed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::BuiltinDefaults;
use crate::source::sha256_hex;

/// Settings file name looked up in the working directory and `~/.ssh/`
pub const SETTINGS_FILE_NAME: &str = "sshush.toml";

/// YAML settings names from earlier releases, used when no TOML file is found
pub const LEGACY_SETTINGS_FILE_NAMES: &[&str] = &["sshush.yml", "sshush.yaml"];

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Contents of a settings file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Source patterns (globs, `~` and `$VARS` allowed)
    #[serde(alias = "source")]
    pub sources: Option<Vec<String>>,

    /// Destination ssh_config path
    pub dest: Option<String>,

    pub verbose: Option<bool>,
}

impl SettingsFile {
    /// Load a settings file, returning it with the digest of its bytes.
    ///
    /// `.yml`/`.yaml` files are read as YAML, anything else as TOML.
    pub fn from_file(path: &Path) -> Result<(Self, String), SettingsError> {
        let bytes = fs::read(path)?;
        let digest = sha256_hex(&bytes);
        let contents = String::from_utf8(bytes).map_err(|e| {
            SettingsError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        let file = if is_yaml(path) {
            Self::from_yaml_str(&contents)?
        } else {
            Self::from_str(&contents)?
        };
        Ok((file, digest))
    }

    /// Parse settings from a TOML string
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse settings from a YAML string; the legacy `source` key is accepted
    pub fn from_yaml_str(s: &str) -> Result<Self, SettingsError> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// First settings file found in `./` or `~/.ssh/`
    pub fn discover() -> Option<PathBuf> {
        let mut search = vec![PathBuf::from(".")];
        if let Some(home) = dirs::home_dir() {
            search.push(home.join(".ssh"));
        }
        Self::discover_in(&search)
    }

    /// First settings file in `search`, in order. Within a directory the TOML
    /// name wins over the legacy YAML names.
    pub fn discover_in(search: &[PathBuf]) -> Option<PathBuf> {
        search
            .iter()
            .flat_map(|dir| {
                std::iter::once(SETTINGS_FILE_NAME)
                    .chain(LEGACY_SETTINGS_FILE_NAMES.iter().copied())
                    .map(move |name| dir.join(name))
            })
            .find(|p| p.is_file())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Values given on the command line; empty/None means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sources: Vec<String>,
    pub dest: Option<String>,
    pub verbose: bool,
}

impl CliOverrides {
    fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.dest.is_none() && !self.verbose
    }
}

/// Merged settings with the layers that produced them
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    /// Source patterns, not yet expanded
    pub sources: Vec<String>,

    /// Destination path, not yet expanded
    pub dest: String,

    pub verbose: bool,

    /// Contributing layers in precedence order
    pub origins: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Build effective settings.
    ///
    /// An explicit `settings_path` must exist. Without one, the default
    /// locations are searched and a missing file is not an error.
    pub fn build(settings_path: Option<&Path>, cli: CliOverrides) -> Result<Self, SettingsError> {
        let path = match settings_path {
            Some(path) if !path.is_file() => {
                return Err(SettingsError::NotFound(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => SettingsFile::discover(),
        };

        let file = match path {
            Some(path) => {
                let (file, digest) = SettingsFile::from_file(&path)?;
                debug!(path = %path.display(), "loaded settings file");
                Some((
                    file,
                    SettingsSource {
                        origin: SettingsOrigin::File,
                        path: Some(path.to_string_lossy().to_string()),
                        digest: Some(digest),
                    },
                ))
            }
            None => None,
        };

        Ok(Self::from_layers(file, cli))
    }

    /// Merge already loaded layers (first is base, last has highest precedence)
    pub fn from_layers(file: Option<(SettingsFile, SettingsSource)>, cli: CliOverrides) -> Self {
        let defaults = BuiltinDefaults::default();
        let mut settings = Self {
            sources: defaults.sources,
            dest: defaults.dest,
            verbose: defaults.verbose,
            origins: vec![SettingsSource {
                origin: SettingsOrigin::Builtin,
                path: None,
                digest: None,
            }],
        };

        if let Some((file, source)) = file {
            if let Some(sources) = file.sources {
                settings.sources = sources;
            }
            if let Some(dest) = file.dest {
                settings.dest = dest;
            }
            if let Some(verbose) = file.verbose {
                settings.verbose = verbose;
            }
            settings.origins.push(source);
        }

        if !cli.is_empty() {
            // Sources given on the command line replace the file's list
            if !cli.sources.is_empty() {
                settings.sources = cli.sources;
            }
            if let Some(dest) = cli.dest {
                settings.dest = dest;
            }
            settings.verbose |= cli.verbose;
            settings.origins.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        settings
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),
}
