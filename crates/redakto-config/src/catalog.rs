//! Entity set catalog (`entity_set_models` YAML).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use redakto_core::{Error, LabelMapping, Result};
use serde::{Deserialize, Serialize};

use crate::placeholders::Placeholders;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineGrainedLabel {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySetLabel {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub border_color: Option<String>,
    #[serde(default)]
    pub fine_grained: Vec<FineGrainedLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedModel {
    pub model_id: String,
    pub model_name: String,
    #[serde(default)]
    pub model_description: String,
    #[serde(default)]
    pub model_links: Vec<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub model_type_description: Option<String>,
    #[serde(default)]
    pub model_loading_strategy: Option<String>,
    #[serde(default)]
    pub model_directory_name: Vec<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub model_impl: Option<String>,
    #[serde(default)]
    pub model_system_requirements: Vec<String>,
    #[serde(default)]
    pub model_tokenizer_params: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub model_generate_params: HashMap<String, serde_json::Value>,
}

impl SupportedModel {
    /// `<root>/<model_directory_name...>/<model_version>`
    pub fn model_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.model_directory_name);
        if let Some(version) = &self.model_version {
            path.push(version);
        }
        path
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub entity_set_id: String,
    pub corpus_name: String,
    #[serde(default)]
    pub corpus_doctypes: Vec<String>,
    #[serde(default)]
    pub corpus_description: Option<String>,
    #[serde(default)]
    pub corpus_version: Option<String>,
    #[serde(default)]
    pub corpus_languages: Vec<String>,
    #[serde(default)]
    pub corpus_links: Vec<String>,
    #[serde(default)]
    pub entity_set_labels: Vec<EntitySetLabel>,
    #[serde(default)]
    pub sample_texts: Vec<String>,
    #[serde(default)]
    pub supported_models_root_dir: Vec<String>,
    #[serde(default)]
    pub supported_models: Vec<SupportedModel>,
    #[serde(default)]
    pub label_mapping: Option<LabelMapping>,
}

impl EntitySet {
    pub fn model(&self, model_id: &str) -> Option<&SupportedModel> {
        self.supported_models.iter().find(|m| m.model_id == model_id)
    }

    pub fn model_ids(&self) -> Vec<String> {
        self.supported_models
            .iter()
            .map(|m| m.model_id.clone())
            .collect()
    }

    pub fn models_root(&self) -> PathBuf {
        self.supported_models_root_dir.iter().collect()
    }

    /// Labels a tagger for this set emits: fine-grained ids, or the coarse
    /// id for labels without fine-grained children.
    pub fn tagger_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        for label in &self.entity_set_labels {
            if label.fine_grained.is_empty() {
                labels.push(label.id.clone());
            } else {
                labels.extend(label.fine_grained.iter().map(|f| f.id.clone()));
            }
        }
        labels
    }

    /// Mapping implied by the label hierarchy: fine label -> parent label.
    pub fn hierarchy_mapping(&self) -> LabelMapping {
        let fine_to_coarse = self
            .entity_set_labels
            .iter()
            .flat_map(|label| {
                label
                    .fine_grained
                    .iter()
                    .map(move |fine| (fine.id.clone(), label.id.clone()))
            })
            .collect();
        LabelMapping::new(fine_to_coarse, HashSet::new())
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    entity_set_models: Vec<serde_yaml::Value>,
}

/// All configured entity sets, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entity_sets: Vec<EntitySet>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(entity_sets: Vec<EntitySet>) -> Result<Self> {
        let mut by_id = HashMap::new();
        for (idx, set) in entity_sets.iter().enumerate() {
            if by_id.insert(set.entity_set_id.clone(), idx).is_some() {
                return Err(Error::Configuration(format!(
                    "Duplicate entity set id '{}' at index {}",
                    set.entity_set_id, idx
                )));
            }
        }
        Ok(Self { entity_sets, by_id })
    }

    pub fn load_from_file(path: &Path, placeholders: &Placeholders) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, placeholders)
    }

    /// Parse a catalog document. Every invalid entity set is reported in a
    /// single configuration error.
    pub fn from_yaml_str(yaml: &str, placeholders: &Placeholders) -> Result<Self> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Configuration(format!("Invalid catalog YAML: {}", e)))?;
        if doc.is_null() {
            return Self::new(Vec::new());
        }

        let raw: RawCatalog = serde_yaml::from_value(placeholders.apply_yaml(doc))
            .map_err(|e| Error::Configuration(format!("Invalid catalog structure: {}", e)))?;

        let mut entity_sets = Vec::with_capacity(raw.entity_set_models.len());
        let mut errors = Vec::new();
        for (idx, value) in raw.entity_set_models.into_iter().enumerate() {
            match serde_yaml::from_value::<EntitySet>(value) {
                Ok(set) => entity_sets.push(set),
                Err(e) => errors.push(format!("Entity set index {} validation error: {}", idx, e)),
            }
        }

        if !errors.is_empty() {
            return Err(Error::Configuration(errors.join("; ")));
        }
        Self::new(entity_sets)
    }

    pub fn entity_sets(&self) -> &[EntitySet] {
        &self.entity_sets
    }

    pub fn entity_set_ids(&self) -> Vec<String> {
        self.entity_sets
            .iter()
            .map(|s| s.entity_set_id.clone())
            .collect()
    }

    pub fn get(&self, entity_set_id: &str) -> Option<&EntitySet> {
        self.by_id.get(entity_set_id).map(|&idx| &self.entity_sets[idx])
    }

    pub fn model(&self, entity_set_id: &str, model_id: &str) -> Option<&SupportedModel> {
        self.get(entity_set_id).and_then(|s| s.model(model_id))
    }
}
