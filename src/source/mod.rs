//! Definition sources
//!
//! Loads YAML definition files into ordered mappings, recording the path and
//! a SHA-256 digest of the raw bytes of each.

mod expand;
mod yaml;

pub use expand::{expand_path, expand_sources};
pub use yaml::{yaml_to_mapping, yaml_to_value};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use sshush_resolve::{Document, Mapping, ResolveError};
use tracing::{debug, info};

/// Errors that can occur while loading sources
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no source files given")]
    NoSources,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("top level of {} is not a mapping", path.display())]
    NotAMapping { path: PathBuf },

    #[error("unsupported mapping key in {}: {key}", path.display())]
    UnsupportedKey { path: PathBuf, key: String },

    #[error("invalid source pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("home directory could not be determined")]
    NoHome,
}

/// One loaded definition file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,

    /// SHA-256 of the raw file bytes, hex encoded
    pub digest: String,

    /// Top-level entries in file order
    #[serde(skip)]
    pub content: Mapping,
}

impl SourceFile {
    /// Read and parse a YAML definition file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = sha256_hex(&bytes);

        let content = Self::parse(path, &bytes)?;
        debug!(path = %path.display(), entries = content.len(), digest = %digest, "loaded source");

        Ok(Self {
            path: path.to_path_buf(),
            digest,
            content,
        })
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Mapping, LoadError> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_slice(bytes).map_err(|source| LoadError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;

        match yaml {
            // An empty file declares nothing.
            serde_yaml::Value::Null => Ok(Mapping::new()),
            serde_yaml::Value::Mapping(map) => {
                yaml_to_mapping(map).map_err(|key| LoadError::UnsupportedKey {
                    path: path.to_path_buf(),
                    key,
                })
            }
            _ => Err(LoadError::NotAMapping {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load every source in order.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, LoadError> {
    if paths.is_empty() {
        return Err(LoadError::NoSources);
    }
    let sources = paths
        .iter()
        .map(|p| SourceFile::load(p))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = sources.len(), "loaded sources");
    Ok(sources)
}

/// Layer loaded sources into one document, first source lowest.
pub fn build_document(sources: &[SourceFile]) -> Result<Document, ResolveError> {
    let mut document = Document::new();
    for source in sources {
        document.push_source(source.content.clone())?;
    }
    Ok(document)
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
