//! Group definitions and group-wide configuration
//!
//! A group's baseline configuration is built from four layers, lowest first:
//! 1. Empty
//! 2. The document's `default` block
//! 3. The resolved configuration of the group named by `Extends`
//! 4. The group's own `Config` block

use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::extends::ExtensionTable;
use crate::merge::merge_layers;
use crate::value::{Mapping, Value};

pub const CONFIG_KEY: &str = "Config";
pub const EXTENDS_KEY: &str = "Extends";
pub const PREFIX_KEY: &str = "Prefix";
pub const HOSTS_KEY: &str = "Hosts";

const KNOWN_KEYS: &[&str] = &[CONFIG_KEY, EXTENDS_KEY, PREFIX_KEY, HOSTS_KEY];

/// A validated view of one group in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefinition<'a> {
    pub identifier: &'a str,
    pub config: Option<&'a Mapping>,
    pub extends: Option<&'a str>,

    /// Literal text placed before every alias; empty when unset
    pub prefix: &'a str,

    pub hosts: Option<&'a Value>,
}

impl<'a> GroupDefinition<'a> {
    /// Check the shape of a group value and borrow its fields.
    pub fn parse(identifier: &'a str, value: &'a Value) -> Result<Self, ResolveError> {
        let definition = value
            .as_mapping()
            .ok_or_else(|| ResolveError::ConfigNotMap(identifier.to_string()))?;

        let config = match definition.get(CONFIG_KEY) {
            None => None,
            Some(Value::Mapping(m)) => Some(m),
            Some(_) => {
                return Err(ResolveError::ConfigNotMap(format!(
                    "{}.{}",
                    identifier, CONFIG_KEY
                )))
            }
        };

        let extends = match definition.get(EXTENDS_KEY) {
            None => None,
            Some(Value::Text(target)) => Some(target.as_str()),
            Some(other) => {
                warn!(group = identifier, kind = other.kind(), "extends is not a string, ignoring");
                None
            }
        };

        let prefix = match definition.get(PREFIX_KEY) {
            None => "",
            Some(Value::Text(prefix)) => prefix.as_str(),
            Some(_) => {
                return Err(ResolveError::PrefixNotAString {
                    group: identifier.to_string(),
                })
            }
        };

        for key in definition.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!(group = identifier, key = %key, "unknown group key, ignoring");
            }
        }

        Ok(Self {
            identifier,
            config,
            extends,
            prefix,
            hosts: definition.get(HOSTS_KEY),
        })
    }
}

/// The configuration every host in `group` inherits before its own overrides.
pub fn compute_group_config(
    group: &GroupDefinition<'_>,
    default: &Mapping,
    extensions: &ExtensionTable,
) -> Mapping {
    let empty = Mapping::new();

    let extended = match group.extends {
        Some(target) => match extensions.resolved_config(target) {
            Some(config) => config,
            None => {
                warn!(
                    group = group.identifier,
                    extends = target,
                    "extends target has no Config block, inheriting nothing"
                );
                &empty
            }
        },
        None => &empty,
    };

    let config = merge_layers([default, extended, group.config.unwrap_or(&empty)]);
    debug!(group = group.identifier, keys = config.len(), "computed group config");
    config
}
