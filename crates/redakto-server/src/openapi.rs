//! OpenAPI document served at `/api/openapi.json`.

use redakto_config::AppConfig;
use redakto_core::{
    DetectEntitiesRequest, DetectEntitiesResponse, EntityItem, EntitySetDetails,
    EntitySetLabelInfo, FineGrainedLabelInfo, RedactTextsRequest, RedactTextsResponse,
    RedactedText, RedactionCount, RedactionStyle, SupportedModelDetails, SupportedModelSummary,
};
use utoipa::OpenApi;

use crate::docs;
use crate::error::ErrorEnvelope;
use crate::server::{self, HealthStatus};

pub const API_TITLE: &str = "Redakto API";

#[derive(OpenApi)]
#[openapi(
    info(title = "Redakto API"),
    paths(
        server::health,
        server::openapi,
        docs::swagger_ui,
        docs::redoc,
        server::get_entity_set_ids,
        server::get_supported_model_ids,
        server::get_entity_set_details,
        server::get_supported_model_details,
        server::detect_entities,
        server::redact,
    ),
    components(schemas(
        HealthStatus,
        ErrorEnvelope,
        EntityItem,
        DetectEntitiesRequest,
        DetectEntitiesResponse,
        RedactionStyle,
        RedactTextsRequest,
        RedactionCount,
        RedactedText,
        RedactTextsResponse,
        FineGrainedLabelInfo,
        EntitySetLabelInfo,
        SupportedModelSummary,
        EntitySetDetails,
        SupportedModelDetails,
    )),
    tags(
        (name = "health", description = "Service status and API documentation"),
        (name = "app_info", description = "Entity sets and their models"),
        (name = "predict", description = "Entity detection and redaction"),
    )
)]
struct ApiDoc;

/// The generated document with name, version and description from the config.
pub fn openapi_document(app: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = API_TITLE.to_string();
    doc.info.version = app.version.clone();
    doc.info.description = Some(app.short_description.clone());
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::to_value(openapi_document(&AppConfig::default())).unwrap()
    }

    #[test]
    fn test_document_lists_routes() {
        let doc = document();
        assert_eq!(doc["info"]["title"], "Redakto API");
        assert!(doc["paths"]["/api/predict/detect_entities"]["post"].is_object());
        assert!(doc["paths"]["/api/docs"]["get"].is_object());
        assert!(doc["paths"]["/api/redoc"]["get"].is_object());
        assert_eq!(
            doc["paths"]["/api/app_info/get_supported_model_details"]["get"]["parameters"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn test_nested_schemas_are_typed() {
        let doc = document();
        let details = &doc["components"]["schemas"]["EntitySetDetails"]["properties"];
        assert_eq!(
            details["entity_set_labels"]["items"]["$ref"],
            "#/components/schemas/EntitySetLabelInfo"
        );
        assert_eq!(
            details["supported_models"]["items"]["$ref"],
            "#/components/schemas/SupportedModelSummary"
        );

        let item = &doc["components"]["schemas"]["EntityItem"]["properties"];
        assert!(item["Token_ID"].is_object());
        assert!(item["Start"].is_object());
    }
}
