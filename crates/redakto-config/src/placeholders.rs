//! `{NAME}` placeholder substitution for config and catalog strings.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// Named replacements. Unknown placeholders are left as written.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: HashMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_path(self, name: &str, path: &Path) -> Self {
        self.with(name, path.display().to_string())
    }

    pub fn apply(&self, input: &str) -> String {
        PLACEHOLDER
            .replace_all(input, |caps: &Captures<'_>| {
                self.values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Substitute in every string of a YAML document, keys excluded.
    pub fn apply_yaml(&self, value: serde_yaml::Value) -> serde_yaml::Value {
        use serde_yaml::Value;

        match value {
            Value::String(s) => Value::String(self.apply(&s)),
            Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(|v| self.apply_yaml(v)).collect())
            }
            Value::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, self.apply_yaml(v)))
                    .collect(),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_placeholders() {
        let p = Placeholders::new().with("PROJECT_ROOT", "/srv/redakto");
        assert_eq!(p.apply("{PROJECT_ROOT}/models"), "/srv/redakto/models");
        assert_eq!(p.apply("{UNKNOWN}/x"), "{UNKNOWN}/x");
        assert_eq!(p.apply("no placeholders"), "no placeholders");
    }

    #[test]
    fn test_yaml_substitution_is_recursive() {
        let p = Placeholders::new().with("CONFIG_DIR", "/etc/redakto");
        let doc: serde_yaml::Value =
            serde_yaml::from_str("root: ['{CONFIG_DIR}', models]\nnested: {path: '{CONFIG_DIR}/a'}\n")
                .unwrap();

        let out = p.apply_yaml(doc);
        assert_eq!(out["root"][0].as_str(), Some("/etc/redakto"));
        assert_eq!(out["nested"]["path"].as_str(), Some("/etc/redakto/a"));
    }
}
