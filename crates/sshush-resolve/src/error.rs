//! Error types for the resolution engine.

/// Reasons a definition document cannot be turned into ssh_config output.
///
/// Any of these aborts the whole pass; partial output is never produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A group, its `Config` block, or a `global`/`default` block is not a mapping.
    #[error("config is not a map: {0}")]
    ConfigNotMap(String),

    /// `Hosts` is a list with a non-string element, or neither a list nor a mapping.
    #[error("hosts is not list of strings: {group}")]
    HostsNotListOfStrings { group: String },

    #[error("prefix is not a string: {group}")]
    PrefixNotAString { group: String },

    /// An `Extends` chain revisits a group that is still being resolved.
    #[error("cyclic extends: {}", cycle.join(" -> "))]
    CyclicExtends { cycle: Vec<String> },

    /// A mapping-form host value that is neither a hostname nor a mapping of overrides.
    #[error("host entry is neither a string nor a map: {group}.{alias}")]
    UnsupportedHostEntry { group: String, alias: String },

    /// A mapping used as the value of an option, which has no ssh_config form.
    #[error("value of {key} cannot be rendered as an option")]
    UnsupportedValue { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_chain() {
        let err = ResolveError::CyclicExtends {
            cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic extends: a -> b -> a");
    }

    #[test]
    fn test_config_not_map_names_identifier() {
        let err = ResolveError::ConfigNotMap("servers".to_string());
        assert!(err.to_string().contains("servers"));
    }
}
