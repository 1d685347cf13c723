use std::sync::Arc;

use futures_util::future::try_join_all;
use redakto_core::{
    DetectEntitiesRequest, DetectEntitiesResponse, EntityItem, Error, LabelMapping,
    RedactTextsRequest, RedactTextsResponse, RedactedText, Result, align_entities,
    map_to_coarse_labels,
};
use redakto_models::InferenceMaker;
use redakto_security::Redactor;

use crate::SharedRegistry;
use crate::mappings::label_mapping_for;

/// Model type able to serve entity detection.
pub const REQUIRED_MODEL_TYPE: &str = "NER";

pub struct PredictionService {
    registry: SharedRegistry,
}

impl PredictionService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Rebuild the registry from its catalog file.
    pub async fn reload(&self) -> Result<()> {
        self.registry.write().await.reload()
    }

    /// Resolve the model and the mapping used for coarse output.
    async fn resolve(&self, entity_set_id: &str, model_id: &str) -> Result<(Arc<InferenceMaker>, LabelMapping)> {
        let registry = self.registry.read().await;

        let config = registry.model_config(entity_set_id, model_id)?;
        let model_type = config.model_type.unwrap_or_default();
        if model_type != REQUIRED_MODEL_TYPE {
            return Err(Error::UnsupportedOperationForModel {
                entity_set_id: entity_set_id.to_string(),
                model_id: model_id.to_string(),
                model_type,
                required_model_type: REQUIRED_MODEL_TYPE.to_string(),
            });
        }

        let maker = registry.inference_maker(entity_set_id, model_id)?;
        let mapping = registry
            .catalog()
            .get(entity_set_id)
            .map(label_mapping_for)
            .unwrap_or_default();
        Ok((maker, mapping))
    }

    pub async fn detect_entities(&self, request: &DetectEntitiesRequest) -> Result<DetectEntitiesResponse> {
        let (maker, mapping) = self
            .resolve(&request.entity_set_id, &request.model_id)
            .await?;

        let output = try_join_all(
            request
                .input_texts
                .iter()
                .map(|text| detect_in_text(&maker, &mapping, text, request.fine_grained)),
        )
        .await?;

        Ok(DetectEntitiesResponse { output })
    }

    pub async fn redact_texts(&self, request: &RedactTextsRequest) -> Result<RedactTextsResponse> {
        let detected = self.detect_entities(&request.detect).await?;
        let redactor = Redactor::new(request.style).with_placeholder(request.placeholder.clone());

        let output = request
            .detect
            .input_texts
            .iter()
            .zip(detected.output)
            .map(|(text, entities)| {
                let (redacted_text, infos) = redactor.redact(text, &entities);
                RedactedText {
                    redacted_text,
                    entities,
                    redactions: infos.into_iter().map(Into::into).collect(),
                }
            })
            .collect();

        Ok(RedactTextsResponse { output })
    }
}

async fn detect_in_text(
    maker: &InferenceMaker,
    mapping: &LabelMapping,
    text: &str,
    fine_grained: bool,
) -> Result<Vec<EntityItem>> {
    let sentences = maker.infer(text).await?;
    for sentence in &sentences {
        tracing::debug!(
            start = sentence.start,
            end = sentence.end,
            spans = ?sentence.spans,
            "Tagged sentence"
        );
    }

    let entities = align_entities(text, &sentences);
    tracing::debug!(
        "Entities: {}",
        serde_json::to_string_pretty(&entities).unwrap_or_default()
    );

    if fine_grained {
        return Ok(entities);
    }
    let (coarse, tracking) = map_to_coarse_labels(&entities, text, mapping, true);
    tracing::debug!(merged = tracking.len(), "Mapped to coarse labels");
    Ok(coarse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redakto_config::{Catalog, Placeholders};
    use redakto_core::RedactionStyle;
    use redakto_models::{ModelRegistry, RegistrySettings};

    const CATALOG: &str = r#"
entity_set_models:
  - entity_set_id: grascco
    corpus_name: GraSCCo
    supported_models:
      - model_id: patterns
        model_name: Pattern tagger
        model_type: NER
        model_loading_strategy: builtin
        model_impl: PatternTagger
        model_generate_params:
          label_map:
            NAME: NAME_PATIENT
            TITLE: NAME_TITLE
            STREET: LOCATION_STREET
            ZIP: LOCATION_ZIP
            CITY: LOCATION_CITY
            EMAIL: CONTACT_EMAIL
      - model_id: generator
        model_name: Pseudonym generator
        model_type: NER-PG
        model_loading_strategy: builtin
        model_impl: PatternTagger
"#;

    const TEXT: &str = "Patientin Frau Anna Meier, wohnhaft Hauptstraße 5, 10115 Berlin.";

    fn service() -> PredictionService {
        let catalog = Catalog::from_yaml_str(CATALOG, &Placeholders::new()).unwrap();
        let registry = ModelRegistry::new(catalog, RegistrySettings::default()).unwrap();
        PredictionService::new(crate::shared(registry))
    }

    fn request(texts: &[&str], fine_grained: bool) -> DetectEntitiesRequest {
        DetectEntitiesRequest {
            entity_set_id: "grascco".into(),
            model_id: "patterns".into(),
            fine_grained,
            input_texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_fine_grained_entities() {
        let response = service().detect_entities(&request(&[TEXT], true)).await.unwrap();
        let entities = &response.output[0];

        let labels: Vec<&str> = entities.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["NAME_PATIENT", "LOCATION_STREET", "LOCATION_ZIP", "LOCATION_CITY"]
        );
        assert_eq!((entities[0].start, entities[0].end), (15, 25));
        assert_eq!(entities[3].token_id, "T4");
    }

    #[tokio::test]
    async fn test_coarse_entities_are_merged() {
        let response = service().detect_entities(&request(&[TEXT], false)).await.unwrap();
        let entities = &response.output[0];

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].label, "NAME");
        assert_eq!(entities[1].label, "LOCATION");
        assert_eq!(entities[1].token, "Hauptstraße 5, 10115 Berlin");
        assert_eq!(entities[1].token_id, "T2T3T4");
        assert_eq!((entities[1].start, entities[1].end), (36, 63));
    }

    #[tokio::test]
    async fn test_output_order_matches_input() {
        let texts = ["Mail an a@b.de", "Keine Daten hier.", TEXT];
        let response = service().detect_entities(&request(&texts, true)).await.unwrap();

        assert_eq!(response.output.len(), 3);
        assert_eq!(response.output[0][0].label, "CONTACT_EMAIL");
        assert!(response.output[1].is_empty());
        assert_eq!(response.output[2].len(), 4);
    }

    #[tokio::test]
    async fn test_non_ner_model_is_rejected() {
        let mut req = request(&[TEXT], true);
        req.model_id = "generator".into();

        let err = service().detect_entities(&req).await.unwrap_err();
        match err {
            Error::UnsupportedOperationForModel {
                model_type,
                required_model_type,
                ..
            } => {
                assert_eq!(model_type, "NER-PG");
                assert_eq!(required_model_type, "NER");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let mut req = request(&[TEXT], true);
        req.entity_set_id = "missing".into();
        let err = service().detect_entities(&req).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let mut req = request(&[TEXT], true);
        req.model_id = "missing".into();
        let err = service().detect_entities(&req).await.unwrap_err();
        assert!(matches!(err, Error::ModelNotFound { .. }));
    }

    #[tokio::test]
    async fn test_redact_texts() {
        let req = RedactTextsRequest {
            detect: request(&[TEXT], false),
            style: RedactionStyle::Label,
            placeholder: None,
        };
        let response = service().redact_texts(&req).await.unwrap();
        let out = &response.output[0];

        assert_eq!(
            out.redacted_text,
            "Patientin Frau [REDACTED:NAME], wohnhaft [REDACTED:LOCATION]."
        );
        assert_eq!(out.redactions.len(), 2);
        assert_eq!(out.entities.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_surface_form_keeps_match_position() {
        let text = "Kennung 10115, Anschrift 10115 Berlin";
        let response = service().detect_entities(&request(&[text], true)).await.unwrap();
        let entities = &response.output[0];

        assert_eq!(entities[0].label, "LOCATION_ZIP");
        assert_eq!((entities[0].start, entities[0].end), (25, 30));
        assert_eq!((entities[1].start, entities[1].end), (31, 37));

        let req = RedactTextsRequest {
            detect: request(&[text], true),
            style: RedactionStyle::Label,
            placeholder: None,
        };
        let response = service().redact_texts(&req).await.unwrap();
        assert_eq!(
            response.output[0].redacted_text,
            "Kennung 10115, Anschrift [REDACTED:LOCATION_ZIP] [REDACTED:LOCATION_CITY]"
        );
    }
}
