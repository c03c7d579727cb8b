//! YAML to engine value conversion
//!
//! Definition files are parsed with serde_yaml and converted into the
//! engine's closed [`Value`] type, keeping mapping order.

use sshush_resolve::{Mapping, Value};

/// Convert a parsed YAML value.
///
/// Returns the offending key text when a mapping key is not a scalar.
pub fn yaml_to_value(yaml: serde_yaml::Value) -> Result<Value, String> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                // u64 beyond i64::MAX lands here too
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        serde_yaml::Value::String(s) => Value::Text(s),
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(yaml_to_value)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(map) => Value::Mapping(yaml_to_mapping(map)?),
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value)?,
    })
}

/// Convert a YAML mapping, stringifying scalar keys.
pub fn yaml_to_mapping(map: serde_yaml::Mapping) -> Result<Mapping, String> {
    let mut out = Mapping::with_capacity(map.len());
    for (key, value) in map {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => return Err(format!("{:?}", other)),
        };
        out.insert(key, yaml_to_value(value)?);
    }
    Ok(out)
}
