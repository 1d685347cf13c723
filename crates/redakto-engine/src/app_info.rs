use redakto_config::{EntitySet, SupportedModel};
use redakto_core::{
    EntitySetDetails, EntitySetLabelInfo, Error, FineGrainedLabelInfo, Result,
    SupportedModelDetails, SupportedModelSummary,
};

use crate::SharedRegistry;

/// Read-only views of the catalog for the app-info endpoints.
pub struct AppInfoService {
    registry: SharedRegistry,
}

impl AppInfoService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    pub async fn entity_set_ids(&self) -> Vec<String> {
        self.registry.read().await.catalog().entity_set_ids()
    }

    pub async fn supported_model_ids(&self, entity_set_id: &str) -> Result<Vec<String>> {
        let registry = self.registry.read().await;
        let entity_set = registry
            .catalog()
            .get(entity_set_id)
            .ok_or_else(|| Error::entity_set_not_found(entity_set_id))?;
        Ok(entity_set.model_ids())
    }

    pub async fn entity_set_details(&self, entity_set_id: &str) -> Result<EntitySetDetails> {
        let registry = self.registry.read().await;
        registry
            .catalog()
            .get(entity_set_id)
            .map(entity_set_details)
            .ok_or_else(|| Error::entity_set_not_found(entity_set_id))
    }

    pub async fn supported_model_details(
        &self,
        entity_set_id: &str,
        model_id: &str,
    ) -> Result<SupportedModelDetails> {
        let model = self.registry.read().await.model_config(entity_set_id, model_id)?;
        Ok(model_details(model))
    }
}

fn entity_set_details(entity_set: &EntitySet) -> EntitySetDetails {
    EntitySetDetails {
        entity_set_id: entity_set.entity_set_id.clone(),
        corpus_name: Some(entity_set.corpus_name.clone()),
        corpus_doctypes: entity_set.corpus_doctypes.clone(),
        corpus_description: entity_set.corpus_description.clone(),
        corpus_version: entity_set.corpus_version.clone(),
        corpus_languages: entity_set.corpus_languages.clone(),
        corpus_links: entity_set.corpus_links.clone(),
        entity_set_labels: entity_set
            .entity_set_labels
            .iter()
            .map(|label| EntitySetLabelInfo {
                id: label.id.clone(),
                description: label.description.clone(),
                fine_grained: label
                    .fine_grained
                    .iter()
                    .map(|fine| FineGrainedLabelInfo {
                        id: fine.id.clone(),
                        description: fine.description.clone(),
                    })
                    .collect(),
            })
            .collect(),
        supported_models: entity_set
            .supported_models
            .iter()
            .map(|m| SupportedModelSummary {
                model_id: m.model_id.clone(),
                model_name: m.model_name.clone(),
            })
            .collect(),
    }
}

fn model_details(model: SupportedModel) -> SupportedModelDetails {
    SupportedModelDetails {
        model_id: model.model_id,
        model_name: model.model_name,
        model_description: model.model_description,
        model_type: model.model_type,
        model_type_description: model.model_type_description,
        model_links: model.model_links,
        model_version: model.model_version,
    }
}
