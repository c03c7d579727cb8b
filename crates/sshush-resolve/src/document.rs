//! Layered definition documents
//!
//! A run may read several documents. Their top-level entries are merged into a
//! single insertion-ordered [`Document`], with the reserved `global` and
//! `default` blocks pulled out so that only groups remain.

use tracing::debug;

use crate::error::ResolveError;
use crate::value::{Mapping, Value};

/// Reserved identifier for the trailing `Host *` block.
pub const GLOBAL_KEY: &str = "global";

/// Reserved identifier for the base layer of every group.
pub const DEFAULT_KEY: &str = "default";

/// Groups in input order plus the extracted global and default blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Group identifier to group definition, in first-seen order
    pub groups: Mapping,

    /// Options for the trailing `Host *` block
    pub global: Mapping,

    /// Options merged beneath every group's configuration
    pub default: Mapping,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a single source mapping.
    pub fn from_source(source: Mapping) -> Result<Self, ResolveError> {
        let mut document = Self::new();
        document.push_source(source)?;
        Ok(document)
    }

    /// Layer another source on top of this document.
    ///
    /// A group seen before keeps its position and takes the later definition.
    /// A `global` or `default` block in the source replaces the current one.
    pub fn push_source(&mut self, mut source: Mapping) -> Result<(), ResolveError> {
        if let Some(global) = source.shift_remove(GLOBAL_KEY) {
            self.global = reserved_block(GLOBAL_KEY, global)?;
        }
        if let Some(default) = source.shift_remove(DEFAULT_KEY) {
            self.default = reserved_block(DEFAULT_KEY, default)?;
        }

        for (identifier, definition) in source {
            if self.groups.contains_key(&identifier) {
                debug!(group = %identifier, "group redefined by later source");
            }
            self.groups.insert(identifier, definition);
        }

        Ok(())
    }
}

fn reserved_block(name: &str, value: Value) -> Result<Mapping, ResolveError> {
    match value {
        Value::Mapping(m) => Ok(m),
        // An empty YAML block (`global:`) carries no options.
        Value::Null => Ok(Mapping::new()),
        _ => Err(ResolveError::ConfigNotMap(name.to_string())),
    }
}
