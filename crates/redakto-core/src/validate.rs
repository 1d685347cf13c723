//! Request validation.

use serde::Serialize;

/// One validation failure, reported in the 422 error envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub loc: Vec<String>,
    pub msg: String,
    pub input: serde_json::Value,
}

impl FieldError {
    pub fn new(kind: &str, loc: &[&str], msg: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            kind: kind.to_string(),
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            input,
        }
    }
}

/// Validates and normalizes a request value.
pub trait Validate: Sized {
    /// `root` is the location prefix (`body` or `query`).
    fn validate(self, root: &str) -> Result<Self, Vec<FieldError>>;
}

/// Trim an id field, recording an error when it is blank.
pub fn non_blank(value: String, root: &str, field: &str, errors: &mut Vec<FieldError>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(
            "value_error",
            &[root, field],
            "Field cannot be empty or contain only whitespace",
            serde_json::Value::String(value.clone()),
        ));
        return value;
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims() {
        let mut errors = Vec::new();
        assert_eq!(non_blank("  grascco ".into(), "query", "entity_set_id", &mut errors), "grascco");
        assert!(errors.is_empty());

        non_blank("   ".into(), "query", "entity_set_id", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].loc, vec!["query", "entity_set_id"]);
    }
}
