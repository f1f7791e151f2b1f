use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Merge a YAML file into `values`. A missing file is not an error.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loading config file");
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten("", &yaml, values);
    Ok(())
}

/// `MONGO_URI` -> `mongo.uri`
pub(crate) fn env_to_key(name: &str) -> String {
    name.to_lowercase().replace('_', ".")
}

/// Flatten nested mappings into dot-separated keys. Sequences are kept whole
/// under their own key.
fn flatten(prefix: &str, node: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    match node {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => format!("{other:?}"),
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(&key, v, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_map_to_dotted_keys() {
        assert_eq!(env_to_key("MONGO_URI"), "mongo.uri");
        assert_eq!(env_to_key("MONGO_DATABASE"), "mongo.database");
        assert_eq!(env_to_key("APP_NAME"), "app.name");
    }

    #[test]
    fn nested_mappings_are_flattened() {
        let mut values = HashMap::new();
        load_yaml_str("mongo:\n  uri: mongodb://db\n  pool:\n    max: 5\n", &mut values).unwrap();
        assert!(matches!(values.get("mongo.uri"), Some(ConfigValue::String(s)) if s == "mongodb://db"));
        assert!(matches!(values.get("mongo.pool.max"), Some(ConfigValue::Integer(5))));
        assert!(!values.contains_key("mongo"));
    }

    #[test]
    fn invalid_yaml_is_a_load_error() {
        let mut values = HashMap::new();
        let err = load_yaml_str("mongo: [unclosed", &mut values).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
