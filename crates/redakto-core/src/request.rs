//! Prediction requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::EntityItem;
use crate::validate::{FieldError, Validate, non_blank};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectEntitiesRequest {
    #[schema(example = "grascco")]
    pub entity_set_id: String,
    #[schema(example = "patterns")]
    pub model_id: String,
    /// Keep fine-grained labels instead of merged coarse ones
    pub fine_grained: bool,
    #[schema(min_items = 1)]
    pub input_texts: Vec<String>,
}

impl Validate for DetectEntitiesRequest {
    fn validate(self, root: &str) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let entity_set_id = non_blank(self.entity_set_id, root, "entity_set_id", &mut errors);
        let model_id = non_blank(self.model_id, root, "model_id", &mut errors);

        if self.input_texts.is_empty() {
            errors.push(FieldError::new(
                "too_short",
                &[root, "input_texts"],
                "List should have at least 1 item after validation, not 0",
                serde_json::json!([]),
            ));
        } else {
            let empty: Vec<usize> = self
                .input_texts
                .iter()
                .enumerate()
                .filter(|(_, t)| t.trim().is_empty())
                .map(|(i, _)| i)
                .collect();
            if !empty.is_empty() {
                errors.push(FieldError::new(
                    "value_error",
                    &[root, "input_texts"],
                    format!(
                        "input_texts cannot contain empty strings or whitespace-only strings at indices: {:?}",
                        empty
                    ),
                    serde_json::json!(self.input_texts),
                ));
            }
        }

        if errors.is_empty() {
            Ok(Self {
                entity_set_id,
                model_id,
                fine_grained: self.fine_grained,
                input_texts: self.input_texts,
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectEntitiesResponse {
    pub output: Vec<Vec<EntityItem>>,
}

/// How detected spans are replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RedactionStyle {
    /// `[REDACTED:<LABEL>]`
    #[default]
    Label,
    /// `[REDACTED]`
    Mask,
    /// One `*` per char
    Asterisks,
    /// Drop the span
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedactTextsRequest {
    #[serde(flatten)]
    pub detect: DetectEntitiesRequest,
    #[serde(default)]
    pub style: RedactionStyle,
    /// Replacement template; `{label}` is substituted.
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl Validate for RedactTextsRequest {
    fn validate(self, root: &str) -> Result<Self, Vec<FieldError>> {
        let detect = self.detect.validate(root)?;
        Ok(Self { detect, ..self })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RedactionCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RedactedText {
    pub redacted_text: String,
    pub entities: Vec<EntityItem>,
    pub redactions: Vec<RedactionCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RedactTextsResponse {
    pub output: Vec<RedactedText>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(texts: &[&str]) -> DetectEntitiesRequest {
        DetectEntitiesRequest {
            entity_set_id: " grascco ".into(),
            model_id: "patterns".into(),
            fine_grained: false,
            input_texts: texts.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let req = request(&["Hallo"]).validate("body").unwrap();
        assert_eq!(req.entity_set_id, "grascco");
    }

    #[test]
    fn test_blank_texts_report_indices() {
        let errors = request(&["ok", " ", ""]).validate("body").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].msg.contains("[1, 2]"));
    }

    #[test]
    fn test_empty_texts_rejected() {
        let errors = request(&[]).validate("body").unwrap_err();
        assert_eq!(errors[0].kind, "too_short");
    }

    #[test]
    fn test_redact_request_defaults_to_label_style() {
        let req: RedactTextsRequest = serde_json::from_value(serde_json::json!({
            "entity_set_id": "grascco",
            "model_id": "patterns",
            "fine_grained": true,
            "input_texts": ["x"]
        }))
        .unwrap();
        assert_eq!(req.style, RedactionStyle::Label);
        assert!(req.placeholder.is_none());
    }
}
