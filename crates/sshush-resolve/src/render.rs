//! ssh_config rendering
//!
//! [`resolve`] walks the groups in input order and produces the merged
//! configuration of every host. [`Resolution::to_lines`] turns that into the
//! exact line sequence written to the destination file:
//!
//! ```text
//! # <group>
//! Host <prefix><alias>
//!     HostName <value>
//!     <Key> <value>
//!
//! # Global config
//! Host *
//!     <Key> <value>
//! ```

use serde::Serialize;
use tracing::debug;

use crate::document::Document;
use crate::error::ResolveError;
use crate::extends::resolve_extensions;
use crate::group::{compute_group_config, GroupDefinition};
use crate::hosts::{normalize_hosts, resolve_aliased_host, HOST_NAME_KEY};
use crate::value::{Mapping, Value};

/// Indentation of option lines inside a `Host` block.
const INDENT: &str = "    ";

/// Header comment of the trailing wildcard block.
const GLOBAL_HEADER: &str = "# Global config";

/// One host block, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedHost {
    /// Alias as written in the group
    pub alias: String,

    /// Block name: the group prefix followed by the alias
    pub name: String,

    pub config: Mapping,
}

/// A group with its hosts sorted by alias.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub identifier: String,
    pub hosts: Vec<ResolvedHost>,
}

/// Everything needed to render a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub groups: Vec<ResolvedGroup>,
    pub global: Mapping,
}

impl Resolution {
    /// Total number of host blocks, excluding the global block.
    pub fn host_count(&self) -> usize {
        self.groups.iter().map(|g| g.hosts.len()).sum()
    }

    /// Render the resolution as ssh_config lines.
    ///
    /// Fails only when an option value has no single-line form.
    pub fn to_lines(&self) -> Result<Vec<String>, ResolveError> {
        let mut lines = Vec::new();

        for group in &self.groups {
            lines.push(format!("# {}", group.identifier));
            for host in &group.hosts {
                lines.push(format!("Host {}", host.name));
                push_host_options(&mut lines, &host.config)?;
                lines.push(String::new());
            }
        }

        if !self.global.is_empty() {
            lines.push(GLOBAL_HEADER.to_string());
            lines.push("Host *".to_string());
            for key in sorted_keys(&self.global) {
                push_option(&mut lines, key, &self.global[key])?;
            }
        }

        Ok(lines)
    }
}

/// Resolve every group and host of `document`.
pub fn resolve(document: &Document) -> Result<Resolution, ResolveError> {
    let extensions = resolve_extensions(&document.groups)?;
    debug!(entries = extensions.len(), "resolved extends table");

    let mut groups = Vec::with_capacity(document.groups.len());
    for (identifier, value) in &document.groups {
        let group = GroupDefinition::parse(identifier, value)?;
        let group_config = compute_group_config(&group, &document.default, &extensions);

        let hosts = match group.hosts {
            Some(hosts) => normalize_hosts(identifier, hosts)?
                .into_iter()
                .map(|(alias, entry)| {
                    let name = format!("{}{}", group.prefix, alias);
                    let config = resolve_aliased_host(&name, &entry, &group_config);
                    ResolvedHost { alias, name, config }
                })
                .collect(),
            None => {
                debug!(group = %identifier, "group declares no hosts");
                Vec::new()
            }
        };

        groups.push(ResolvedGroup {
            identifier: identifier.clone(),
            hosts,
        });
    }

    Ok(Resolution {
        groups,
        global: document.global.clone(),
    })
}

/// Resolve and render `document` in one step.
pub fn render(document: &Document) -> Result<Vec<String>, ResolveError> {
    resolve(document)?.to_lines()
}

/// Option lines of one host: `HostName` first, the rest sorted by key.
fn push_host_options(lines: &mut Vec<String>, config: &Mapping) -> Result<(), ResolveError> {
    if let Some(host_name) = config.get(HOST_NAME_KEY) {
        push_option(lines, HOST_NAME_KEY, host_name)?;
    }
    for key in sorted_keys(config) {
        if key != HOST_NAME_KEY {
            push_option(lines, key, &config[key])?;
        }
    }
    Ok(())
}

/// Append `key value` lines; a list repeats the key once per element.
fn push_option(lines: &mut Vec<String>, key: &str, value: &Value) -> Result<(), ResolveError> {
    match value {
        Value::List(items) => {
            for item in items {
                push_option(lines, key, item)?;
            }
        }
        Value::Null => lines.push(format!("{}{}", INDENT, key)),
        _ => {
            let text = value
                .scalar_text()
                .ok_or_else(|| ResolveError::UnsupportedValue {
                    key: key.to_string(),
                })?;
            lines.push(format!("{}{} {}", INDENT, key, text));
        }
    }
    Ok(())
}

fn sorted_keys(config: &Mapping) -> Vec<&str> {
    let mut keys: Vec<&str> = config.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
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

    fn lines(expected: &[&str]) -> Vec<String> {
        expected.iter().map(|s| s.to_string()).collect()
    }

    fn servers_document() -> Document {
        Document {
            groups: mapping(&[(
                "servers",
                Value::Mapping(mapping(&[
                    ("Config", Value::Mapping(mapping(&[("User", Value::from("root"))]))),
                    ("Hosts", Value::from(vec!["web1", "web2"])),
                ])),
            )]),
            global: Mapping::new(),
            default: mapping(&[("Port", Value::from(22i64))]),
        }
    }

    #[test]
    fn test_servers_scenario() {
        let output = render(&servers_document()).unwrap();

        assert_eq!(
            output,
            lines(&[
                "# servers",
                "Host web1",
                "    Port 22",
                "    User root",
                "",
                "Host web2",
                "    Port 22",
                "    User root",
                "",
            ])
        );
    }

    #[test]
    fn test_host_name_hoisted_above_sorted_keys() {
        let mut config = mapping(&[
            ("User", Value::from("root")),
            ("Compression", Value::from("yes")),
            ("HostName", Value::from("10.0.0.1")),
        ]);
        config.insert("AddKeysToAgent".to_string(), Value::from("yes"));

        let mut out = Vec::new();
        push_host_options(&mut out, &config).unwrap();

        assert_eq!(
            out,
            lines(&[
                "    HostName 10.0.0.1",
                "    AddKeysToAgent yes",
                "    Compression yes",
                "    User root",
            ])
        );
    }

    #[test]
    fn test_list_value_repeats_key() {
        let mut out = Vec::new();
        push_option(
            &mut out,
            "IdentityFile",
            &Value::from(vec!["~/.ssh/id_ed25519", "~/.ssh/id_rsa"]),
        )
        .unwrap();

        assert_eq!(
            out,
            lines(&["    IdentityFile ~/.ssh/id_ed25519", "    IdentityFile ~/.ssh/id_rsa"])
        );
    }

    #[test]
    fn test_non_text_scalars_stringified() {
        let mut out = Vec::new();
        push_option(&mut out, "Port", &Value::from(2222i64)).unwrap();
        push_option(&mut out, "ForwardAgent", &Value::from(true)).unwrap();
        push_option(&mut out, "RequestTTY", &Value::Null).unwrap();

        assert_eq!(
            out,
            lines(&["    Port 2222", "    ForwardAgent true", "    RequestTTY"])
        );
    }

    #[test]
    fn test_mapping_value_rejected() {
        let mut out = Vec::new();
        let err = push_option(&mut out, "LocalForward", &Value::Mapping(Mapping::new())).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedValue {
                key: "LocalForward".to_string()
            }
        );
    }

    #[test]
    fn test_global_block_last() {
        let mut document = servers_document();
        document.global = mapping(&[
            ("ServerAliveInterval", Value::from(60i64)),
            ("AddKeysToAgent", Value::from("yes")),
        ]);

        let output = render(&document).unwrap();
        let tail = &output[output.len() - 4..];

        assert_eq!(
            tail,
            lines(&[
                "# Global config",
                "Host *",
                "    AddKeysToAgent yes",
                "    ServerAliveInterval 60",
            ])
            .as_slice()
        );
    }

    #[test]
    fn test_prefix_applied_to_block_name() {
        let document = Document {
            groups: mapping(&[(
                "db",
                Value::Mapping(mapping(&[
                    ("Prefix", Value::from("prod-")),
                    ("Hosts", Value::Mapping(mapping(&[("pg1", Value::from("10.1.0.1"))]))),
                ])),
            )]),
            ..Document::default()
        };

        let resolution = resolve(&document).unwrap();
        let host = &resolution.groups[0].hosts[0];

        assert_eq!(host.alias, "pg1");
        assert_eq!(host.name, "prod-pg1");
        assert_eq!(
            resolution.to_lines().unwrap(),
            lines(&["# db", "Host prod-pg1", "    HostName 10.1.0.1", ""])
        );
    }

    #[test]
    fn test_prefixed_list_host_keeps_host_name() {
        let document = Document {
            groups: mapping(&[(
                "web",
                Value::Mapping(mapping(&[
                    ("Prefix", Value::from("web-")),
                    ("Hosts", Value::from(vec!["a.example.com"])),
                ])),
            )]),
            ..Document::default()
        };

        assert_eq!(
            render(&document).unwrap(),
            lines(&[
                "# web",
                "Host web-a.example.com",
                "    HostName a.example.com",
                "",
            ])
        );
    }

    #[test]
    fn test_group_without_hosts_emits_header_only() {
        let document = Document {
            groups: mapping(&[(
                "base",
                Value::Mapping(mapping(&[(
                    "Config",
                    Value::Mapping(mapping(&[("User", Value::from("root"))])),
                )])),
            )]),
            ..Document::default()
        };

        assert_eq!(render(&document).unwrap(), lines(&["# base"]));
    }

    #[test]
    fn test_group_not_a_map_aborts() {
        let mut document = servers_document();
        document
            .groups
            .insert("broken".to_string(), Value::from("oops"));

        let err = render(&document).unwrap_err();
        assert_eq!(err, ResolveError::ConfigNotMap("broken".to_string()));
    }

    #[test]
    fn test_wildcard_entry_suppresses_inherited_host_name() {
        let document = Document {
            groups: mapping(&[(
                "internal",
                Value::Mapping(mapping(&[
                    ("Config", Value::Mapping(mapping(&[("User", Value::from("ops"))]))),
                    ("Hosts", Value::from(vec!["*.internal"])),
                ])),
            )]),
            global: Mapping::new(),
            default: mapping(&[("HostName", Value::from("bastion"))]),
        };

        let output = render(&document).unwrap();
        assert_eq!(
            output,
            lines(&["# internal", "Host *.internal", "    User ops", ""])
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let document = servers_document();
        assert_eq!(render(&document).unwrap(), render(&document).unwrap());
    }
}
