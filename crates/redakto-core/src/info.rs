//! App-info queries and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::validate::{FieldError, Validate, non_blank};

/// `?entity_set_id=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntitySetQuery {
    #[serde(default)]
    #[param(required = true, example = "grascco")]
    pub entity_set_id: String,
}

impl Validate for EntitySetQuery {
    fn validate(self, root: &str) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let entity_set_id = non_blank(self.entity_set_id, root, "entity_set_id", &mut errors);
        if errors.is_empty() {
            Ok(Self { entity_set_id })
        } else {
            Err(errors)
        }
    }
}

/// `?entity_set_id=&model_id=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModelQuery {
    #[serde(default)]
    #[param(required = true, example = "grascco")]
    pub entity_set_id: String,
    #[serde(default)]
    #[param(required = true, example = "patterns")]
    pub model_id: String,
}

impl Validate for ModelQuery {
    fn validate(self, root: &str) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let entity_set_id = non_blank(self.entity_set_id, root, "entity_set_id", &mut errors);
        let model_id = non_blank(self.model_id, root, "model_id", &mut errors);
        if errors.is_empty() {
            Ok(Self {
                entity_set_id,
                model_id,
            })
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FineGrainedLabelInfo {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntitySetLabelInfo {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub fine_grained: Vec<FineGrainedLabelInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupportedModelSummary {
    pub model_id: String,
    pub model_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntitySetDetails {
    pub entity_set_id: String,
    pub corpus_name: Option<String>,
    #[serde(default)]
    pub corpus_doctypes: Vec<String>,
    pub corpus_description: Option<String>,
    pub corpus_version: Option<String>,
    #[serde(default)]
    pub corpus_languages: Vec<String>,
    #[serde(default)]
    pub corpus_links: Vec<String>,
    #[serde(default)]
    pub entity_set_labels: Vec<EntitySetLabelInfo>,
    #[serde(default)]
    pub supported_models: Vec<SupportedModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupportedModelDetails {
    pub model_id: String,
    pub model_name: String,
    pub model_description: String,
    pub model_type: Option<String>,
    pub model_type_description: Option<String>,
    #[serde(default)]
    pub model_links: Vec<String>,
    pub model_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_query_reports_both_fields() {
        let errors = ModelQuery::default().validate("query").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].loc, vec!["query", "model_id"]);
    }

    #[test]
    fn test_entity_set_query_trims() {
        let query = EntitySetQuery {
            entity_set_id: "\tcodealltag ".into(),
        };
        assert_eq!(query.validate("query").unwrap().entity_set_id, "codealltag");
    }
}
