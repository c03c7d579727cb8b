//! `Extends` resolution
//!
//! Every group that declares a `Config` mapping gets an [`ExtensionEntry`]
//! holding its configuration with the whole `Extends` chain merged beneath it.
//! Chains are walked depth-first with memoization, so the declaration order of
//! the groups in the source does not matter.

use indexmap::IndexMap;
use tracing::trace;

use crate::error::ResolveError;
use crate::group::{CONFIG_KEY, EXTENDS_KEY};
use crate::merge::merge;
use crate::value::{Mapping, Value};

/// A group's configuration with its inherited chain resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionEntry {
    pub identifier: String,

    /// Own `Config` merged over everything reachable through `extends`
    pub config: Mapping,

    pub extends: Option<String>,
}

/// Resolved extension entries keyed by group identifier, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionTable {
    entries: IndexMap<String, ExtensionEntry>,
}

impl ExtensionTable {
    pub fn get(&self, identifier: &str) -> Option<&ExtensionEntry> {
        self.entries.get(identifier)
    }

    /// Fully resolved configuration of `identifier`, if it declares a `Config` block.
    pub fn resolved_config(&self, identifier: &str) -> Option<&Mapping> {
        self.entries.get(identifier).map(|e| &e.config)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionEntry> {
        self.entries.values()
    }
}

/// An extension candidate before its chain is resolved.
struct Candidate<'a> {
    config: &'a Mapping,
    extends: Option<&'a str>,
}

/// Build the extension table for the given groups.
///
/// Groups without a mapping `Config` block are left out. A reference to such a
/// group, or to an unknown one, contributes nothing. Fails only on a cycle.
pub fn resolve_extensions(groups: &Mapping) -> Result<ExtensionTable, ResolveError> {
    let candidates: IndexMap<&str, Candidate<'_>> = groups
        .iter()
        .filter_map(|(identifier, definition)| {
            let definition = definition.as_mapping()?;
            let config = definition.get(CONFIG_KEY)?.as_mapping()?;
            let extends = match definition.get(EXTENDS_KEY) {
                Some(Value::Text(target)) => Some(target.as_str()),
                Some(other) => {
                    trace!(group = %identifier, kind = other.kind(), "non-string extends");
                    None
                }
                None => None,
            };
            Some((identifier.as_str(), Candidate { config, extends }))
        })
        .collect();

    let mut resolver = ChainResolver {
        candidates: &candidates,
        resolved: IndexMap::new(),
        visiting: Vec::new(),
    };

    let mut entries = IndexMap::with_capacity(candidates.len());
    for (&identifier, candidate) in &candidates {
        let config = resolver.resolve(identifier)?;
        entries.insert(
            identifier.to_string(),
            ExtensionEntry {
                identifier: identifier.to_string(),
                config,
                extends: candidate.extends.map(str::to_string),
            },
        );
    }

    Ok(ExtensionTable { entries })
}

struct ChainResolver<'c, 'a> {
    candidates: &'c IndexMap<&'a str, Candidate<'a>>,

    /// Finished identifiers and their resolved configuration
    resolved: IndexMap<&'a str, Mapping>,

    /// Identifiers on the current path, outermost first
    visiting: Vec<&'a str>,
}

impl<'c, 'a> ChainResolver<'c, 'a> {
    fn resolve(&mut self, identifier: &'a str) -> Result<Mapping, ResolveError> {
        if let Some(done) = self.resolved.get(identifier) {
            return Ok(done.clone());
        }

        if let Some(start) = self.visiting.iter().position(|v| *v == identifier) {
            let mut cycle: Vec<String> = self.visiting[start..]
                .iter()
                .map(|v| v.to_string())
                .collect();
            cycle.push(identifier.to_string());
            return Err(ResolveError::CyclicExtends { cycle });
        }

        let candidates = self.candidates;
        let Some(candidate) = candidates.get(identifier) else {
            return Ok(Mapping::new());
        };

        self.visiting.push(identifier);
        let base = match candidate.extends {
            Some(target) if candidates.contains_key(target) => {
                trace!(group = identifier, extends = target, "following extends");
                self.resolve(target)?
            }
            _ => Mapping::new(),
        };
        self.visiting.pop();

        let config = merge(base, candidate.config);
        self.resolved.insert(identifier, config.clone());
        Ok(config)
    }
}
