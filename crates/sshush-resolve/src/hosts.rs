//! Host list normalization and per-host merging
//!
//! `Hosts` may be written as a plain list of hostnames or as a mapping from
//! alias to entry. Both forms normalize to a sorted alias -> [`HostEntry`] map.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::ResolveError;
use crate::merge::merge;
use crate::value::{Mapping, Value};

/// Option key that is hoisted to the top of every host block.
pub const HOST_NAME_KEY: &str = "HostName";

/// Character marking a host entry as a pattern rather than a literal host.
const WILDCARD: char = '*';

/// A single host's definition inside a group.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEntry {
    /// Literal hostname, or a pattern when it contains `*`
    Literal(String),

    /// Options overriding the group configuration for this host
    Overrides(Mapping),
}

impl HostEntry {
    pub fn is_pattern(&self) -> bool {
        matches!(self, HostEntry::Literal(s) if s.contains(WILDCARD))
    }
}

/// Normalize a group's `Hosts` value into a map sorted by alias.
///
/// A list of strings maps every entry to itself; duplicates collapse. A
/// mapping keeps its aliases and classifies each value.
pub fn normalize_hosts(
    group: &str,
    hosts: &Value,
) -> Result<BTreeMap<String, HostEntry>, ResolveError> {
    match hosts {
        Value::List(items) => items
            .iter()
            .map(|item| match item {
                Value::Text(host) => Ok((host.clone(), HostEntry::Literal(host.clone()))),
                _ => Err(ResolveError::HostsNotListOfStrings {
                    group: group.to_string(),
                }),
            })
            .collect(),
        Value::Mapping(entries) => entries
            .iter()
            .map(|(alias, entry)| {
                let entry = match entry {
                    Value::Text(host) => HostEntry::Literal(host.clone()),
                    Value::Mapping(overrides) => HostEntry::Overrides(overrides.clone()),
                    _ => {
                        return Err(ResolveError::UnsupportedHostEntry {
                            group: group.to_string(),
                            alias: alias.clone(),
                        })
                    }
                };
                Ok((alias.clone(), entry))
            })
            .collect(),
        _ => Err(ResolveError::HostsNotListOfStrings {
            group: group.to_string(),
        }),
    }
}

/// Configuration for one host: the group configuration with the entry applied.
///
/// A literal sets `HostName`; a pattern (containing `*`) carries no `HostName`
/// at all. Overrides are merged over the group configuration.
///
/// The group configuration is shared by every host in the group and is never
/// modified; each call starts from its own copy.
pub fn resolve_host(entry: &HostEntry, group_config: &Mapping) -> Mapping {
    match entry {
        HostEntry::Literal(host) => {
            let mut config = group_config.clone();
            if entry.is_pattern() {
                // A pattern block matches many hosts; an inherited HostName would
                // redirect all of them to one.
                if config.shift_remove(HOST_NAME_KEY).is_some() {
                    trace!(host = %host, "dropped inherited HostName from pattern entry");
                }
            } else {
                config.insert(HOST_NAME_KEY.to_string(), Value::Text(host.clone()));
            }
            config
        }
        HostEntry::Overrides(overrides) => merge(group_config.clone(), overrides),
    }
}

/// Configuration for the host block named `block_name` (prefix included).
///
/// Like [`resolve_host`], except that a literal entry equal to the block name
/// adds no `HostName` line: ssh already connects to the block name. The line is
/// kept when it has to displace a `HostName` inherited from the group, and
/// whenever a prefix makes the block name differ from the literal.
pub fn resolve_aliased_host(
    block_name: &str,
    entry: &HostEntry,
    group_config: &Mapping,
) -> Mapping {
    let mut config = resolve_host(entry, group_config);
    if let HostEntry::Literal(host) = entry {
        if host == block_name && !group_config.contains_key(HOST_NAME_KEY) {
            config.shift_remove(HOST_NAME_KEY);
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_list_normalized_to_identity_map() {
        let hosts = Value::from(vec!["web2", "web1", "web1"]);
        let normalized = normalize_hosts("servers", &hosts).unwrap();

        let aliases: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(aliases, vec!["web1", "web2"]);
        assert_eq!(normalized["web1"], HostEntry::Literal("web1".to_string()));
    }

    #[test]
    fn test_mapping_passes_through_sorted() {
        let hosts = Value::Mapping(mapping(&[
            ("zulu", Value::from("10.0.0.2")),
            ("alpha", Value::Mapping(mapping(&[("User", Value::from("bob"))]))),
        ]));
        let normalized = normalize_hosts("servers", &hosts).unwrap();

        let aliases: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(aliases, vec!["alpha", "zulu"]);
        assert_eq!(normalized["zulu"], HostEntry::Literal("10.0.0.2".to_string()));
        assert!(matches!(normalized["alpha"], HostEntry::Overrides(_)));
    }

    #[test]
    fn test_aliases_sort_by_bytes() {
        let hosts = Value::from(vec!["b", "B", "a10", "a2"]);
        let normalized = normalize_hosts("g", &hosts).unwrap();

        let aliases: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(aliases, vec!["B", "a10", "a2", "b"]);
    }

    #[test]
    fn test_list_with_non_string_rejected() {
        let hosts = Value::List(vec![Value::from("web1"), Value::from(7i64)]);
        let err = normalize_hosts("servers", &hosts).unwrap_err();
        assert_eq!(
            err,
            ResolveError::HostsNotListOfStrings {
                group: "servers".to_string()
            }
        );
    }

    #[test]
    fn test_scalar_hosts_rejected() {
        let err = normalize_hosts("servers", &Value::from("web1")).unwrap_err();
        assert!(matches!(err, ResolveError::HostsNotListOfStrings { .. }));
    }

    #[test]
    fn test_unsupported_entry_shape_rejected() {
        let hosts = Value::Mapping(mapping(&[("web1", Value::from(vec!["x"]))]));
        let err = normalize_hosts("servers", &hosts).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedHostEntry {
                group: "servers".to_string(),
                alias: "web1".to_string()
            }
        );
    }

    #[test]
    fn test_literal_overrides_host_name() {
        let group = mapping(&[("HostName", Value::from("inherited")), ("User", Value::from("root"))]);
        let config = resolve_host(&HostEntry::Literal("web1.example.com".to_string()), &group);

        assert_eq!(config["HostName"], Value::from("web1.example.com"));
        assert_eq!(config["User"], Value::from("root"));
    }

    #[test]
    fn test_pattern_sets_no_host_name() {
        let group = mapping(&[("User", Value::from("root"))]);
        let config = resolve_host(&HostEntry::Literal("*.example.com".to_string()), &group);

        assert!(!config.contains_key("HostName"));
        assert_eq!(config, group);
    }

    #[test]
    fn test_pattern_drops_inherited_host_name() {
        let group = mapping(&[("HostName", Value::from("bastion")), ("User", Value::from("root"))]);
        let config = resolve_host(&HostEntry::Literal("10.0.*".to_string()), &group);

        assert!(!config.contains_key("HostName"));
        assert_eq!(config["User"], Value::from("root"));
        assert!(group.contains_key("HostName"));
    }

    #[test]
    fn test_overrides_win() {
        let group = mapping(&[("User", Value::from("root")), ("Port", Value::from(22i64))]);
        let entry = HostEntry::Overrides(mapping(&[
            ("HostName", Value::from("10.0.0.1")),
            ("User", Value::from("bob")),
        ]));
        let config = resolve_host(&entry, &group);

        assert_eq!(config["User"], Value::from("bob"));
        assert_eq!(config["Port"], Value::from(22i64));
        assert_eq!(config["HostName"], Value::from("10.0.0.1"));
    }

    #[test]
    fn test_alias_repeating_literal_adds_no_host_name() {
        let group = mapping(&[("User", Value::from("root"))]);
        let config = resolve_aliased_host("web1", &HostEntry::Literal("web1".to_string()), &group);

        assert_eq!(config, group);
    }

    #[test]
    fn test_alias_repeating_literal_displaces_inherited_host_name() {
        let group = mapping(&[("HostName", Value::from("bastion"))]);
        let config = resolve_aliased_host("web1", &HostEntry::Literal("web1".to_string()), &group);

        assert_eq!(config["HostName"], Value::from("web1"));
    }

    #[test]
    fn test_aliased_literal_differing_from_alias_sets_host_name() {
        let config = resolve_aliased_host(
            "web1",
            &HostEntry::Literal("10.0.0.1".to_string()),
            &Mapping::new(),
        );

        assert_eq!(config["HostName"], Value::from("10.0.0.1"));
    }

    #[test]
    fn test_prefixed_block_keeps_host_name() {
        let group = mapping(&[("User", Value::from("deploy"))]);
        let config = resolve_aliased_host(
            "web-a.example.com",
            &HostEntry::Literal("a.example.com".to_string()),
            &group,
        );

        assert_eq!(config["HostName"], Value::from("a.example.com"));
        assert_eq!(config["User"], Value::from("deploy"));
    }

    #[test]
    fn test_group_config_not_shared_between_hosts() {
        let group = mapping(&[("User", Value::from("root"))]);

        let first = resolve_host(&HostEntry::Literal("web1".to_string()), &group);
        let second = resolve_host(&HostEntry::Literal("*.internal".to_string()), &group);

        assert_eq!(first["HostName"], Value::from("web1"));
        assert!(!second.contains_key("HostName"));
        assert!(!group.contains_key("HostName"));
    }
}
