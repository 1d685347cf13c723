use serde_json::json;
use thiserror::Error;

use crate::validate::FieldError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Entity set '{entity_set_id}' not found")]
    EntitySetNotFound { entity_set_id: String },

    #[error("Model '{model_id}' not found for entity set '{entity_set_id}'")]
    ModelNotFound {
        entity_set_id: String,
        model_id: String,
    },

    #[error(
        "Unsupported model loading strategy '{strategy}' for model '{model_id}' in entity set '{entity_set_id}'"
    )]
    UnsupportedModelLoadingStrategy {
        entity_set_id: String,
        model_id: String,
        strategy: String,
    },

    #[error(
        "Unsupported model impl type: '{model_impl}' for model '{model_id}' in entity set '{entity_set_id}'"
    )]
    UnsupportedModelImplType {
        entity_set_id: String,
        model_id: String,
        model_impl: String,
    },

    #[error("Failed to load model for '{model_name_or_path}': {reason}")]
    ModelLoad {
        model_name_or_path: String,
        reason: String,
    },

    #[error(
        "Unsupported operation requested, required model_type '{required_model_type}', but found model_type '{model_type}' for model '{model_id}' in entity set '{entity_set_id}'"
    )]
    UnsupportedOperationForModel {
        entity_set_id: String,
        model_id: String,
        model_type: String,
        required_model_type: String,
    },

    #[error("{0}")]
    Prediction(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn entity_set_not_found(entity_set_id: impl Into<String>) -> Self {
        Self::EntitySetNotFound {
            entity_set_id: entity_set_id.into(),
        }
    }

    pub fn model_not_found(entity_set_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self::ModelNotFound {
            entity_set_id: entity_set_id.into(),
            model_id: model_id.into(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EntitySetNotFound { .. } | Self::ModelNotFound { .. } => 404,
            Self::Validation(_) => 422,
            _ => 500,
        }
    }

    /// Stable error name used in API error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntitySetNotFound { .. } => "EntitySetNotFoundError",
            Self::ModelNotFound { .. } => "ModelNotFoundError",
            Self::UnsupportedModelLoadingStrategy { .. } => "UnsupportedModelLoadingStrategyError",
            Self::UnsupportedModelImplType { .. } => "UnsupportedModelImplTypeError",
            Self::ModelLoad { .. } => "ModelLoadError",
            Self::UnsupportedOperationForModel { .. } => "UnsupportedOperationForModel",
            Self::Prediction(_) => "PredictionError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Validation(_) => "RequestValidationError",
            Self::Io(_) | Self::Serialization(_) | Self::Other(_) => "internal_server_error",
        }
    }

    /// Whether the error is an expected domain failure rather than a bug or I/O fault.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Serialization(_) | Self::Other(_))
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::EntitySetNotFound { entity_set_id } => json!({ "entity_set_id": entity_set_id }),
            Self::ModelNotFound {
                entity_set_id,
                model_id,
            } => json!({ "entity_set_id": entity_set_id, "model_id": model_id }),
            Self::UnsupportedModelLoadingStrategy {
                entity_set_id,
                model_id,
                strategy,
            } => json!({
                "entity_set_id": entity_set_id,
                "model_id": model_id,
                "strategy": strategy,
            }),
            Self::UnsupportedModelImplType {
                entity_set_id,
                model_id,
                model_impl,
            } => json!({
                "entity_set_id": entity_set_id,
                "model_id": model_id,
                "model_impl": model_impl,
            }),
            Self::ModelLoad {
                model_name_or_path,
                reason,
            } => json!({ "model_name_or_path": model_name_or_path, "reason": reason }),
            Self::UnsupportedOperationForModel {
                entity_set_id,
                model_id,
                model_type,
                required_model_type,
            } => json!({
                "entity_set_id": entity_set_id,
                "model_id": model_id,
                "model_type": model_type,
                "required_model_type": required_model_type,
            }),
            Self::Validation(errors) => json!({ "validation_errors": errors }),
            _ => json!({}),
        }
    }
}
