//! Model registry: builds one inference maker per usable catalog model.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use redakto_config::{Catalog, Config, EntitySet, Placeholders, SupportedModel};
use redakto_core::{Error, Result};
use redakto_tokens::Tokenizer;

use crate::inference::InferenceMaker;
use crate::loader::CachedModelLoader;
use crate::pattern::{PatternSource, PatternTaggerLoader};
use crate::remote::RemoteTaggerLoader;
use crate::requirements::check_requirements;

pub const STRATEGY_BUILTIN: &str = "builtin";
pub const STRATEGY_LOCAL_DISK: &str = "local_disk_storage";
pub const STRATEGY_REMOTE: &str = "remote_endpoint";
pub const STRATEGY_HUGGINGFACE: &str = "huggingface_hub";

pub const IMPL_PATTERN_TAGGER: &str = "PatternTagger";
pub const IMPL_SEQUENCE_TAGGER: &str = "SequenceTagger";

const SUPPORTED_STRATEGIES: &[&str] = &[
    STRATEGY_BUILTIN,
    STRATEGY_LOCAL_DISK,
    STRATEGY_REMOTE,
    STRATEGY_HUGGINGFACE,
];
const SUPPORTED_IMPLS: &[&str] = &[IMPL_PATTERN_TAGGER, IMPL_SEQUENCE_TAGGER];

#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Replaces every entity set's `supported_models_root_dir`
    pub models_root: Option<PathBuf>,
    pub remote_endpoint: String,
    pub timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        let frameworks = redakto_config::FrameworksConfig::default();
        Self {
            models_root: None,
            remote_endpoint: frameworks.remote_endpoint,
            timeout: Duration::from_secs(frameworks.request_timeout_secs),
        }
    }
}

impl RegistrySettings {
    pub fn from_config(config: &Config, placeholders: &Placeholders) -> Self {
        Self {
            models_root: config.models_root(placeholders),
            remote_endpoint: config.frameworks.remote_endpoint.clone(),
            timeout: Duration::from_secs(config.frameworks.request_timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogSource {
    path: PathBuf,
    placeholders: Placeholders,
}

pub struct ModelRegistry {
    catalog: Catalog,
    settings: RegistrySettings,
    source: Option<CatalogSource>,
    client: reqwest::Client,
    models: HashMap<String, HashMap<String, Arc<InferenceMaker>>>,
}

impl ModelRegistry {
    pub fn new(catalog: Catalog, settings: RegistrySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("redakto/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let mut registry = Self {
            catalog,
            settings,
            source: None,
            client,
            models: HashMap::new(),
        };
        registry.build_models()?;
        Ok(registry)
    }

    /// Registry over a catalog file; `reload` re-reads the file.
    pub fn from_file(path: &Path, placeholders: Placeholders, settings: RegistrySettings) -> Result<Self> {
        let catalog = Catalog::load_from_file(path, &placeholders)?;
        let mut registry = Self::new(catalog, settings)?;
        registry.source = Some(CatalogSource {
            path: path.to_path_buf(),
            placeholders,
        });
        Ok(registry)
    }

    /// Rebuild from the catalog file. On error the current registry is kept.
    pub fn reload(&mut self) -> Result<()> {
        let Some(source) = &self.source else {
            self.build_models()?;
            return Ok(());
        };
        let catalog = Catalog::load_from_file(&source.path, &source.placeholders)?;
        let models = self.collect_models(&catalog)?;
        self.catalog = catalog;
        self.models = models;
        tracing::info!("Reloaded model registry from {}", source.path.display());
        Ok(())
    }

    fn build_models(&mut self) -> Result<()> {
        self.models = self.collect_models(&self.catalog)?;
        Ok(())
    }

    fn collect_models(
        &self,
        catalog: &Catalog,
    ) -> Result<HashMap<String, HashMap<String, Arc<InferenceMaker>>>> {
        let mut models = HashMap::new();
        for entity_set in catalog.entity_sets() {
            let mut set_models = HashMap::new();
            for model in &entity_set.supported_models {
                if let Some(maker) = self.build_model(entity_set, model)? {
                    set_models.insert(model.model_id.clone(), Arc::new(maker));
                }
            }
            models.insert(entity_set.entity_set_id.clone(), set_models);
        }
        Ok(models)
    }

    fn build_model(&self, entity_set: &EntitySet, model: &SupportedModel) -> Result<Option<InferenceMaker>> {
        let entity_set_id = &entity_set.entity_set_id;
        let model_id = &model.model_id;

        if check_requirements(&model.model_system_requirements) {
            tracing::info!(
                "Requirements satisfied for model '{}' in entity set '{}'",
                model_id,
                entity_set_id
            );
        } else {
            tracing::warn!(
                "Requirements not satisfied, skipping model '{}' in entity set '{}'",
                model_id,
                entity_set_id
            );
            return Ok(None);
        }

        let strategy = model.model_loading_strategy.as_deref().unwrap_or_default();
        let unsupported_strategy = || {
            tracing::error!(
                "Unsupported model loading strategy '{}' for model '{}' in entity set '{}'",
                strategy,
                model_id,
                entity_set_id
            );
            Error::UnsupportedModelLoadingStrategy {
                entity_set_id: entity_set_id.clone(),
                model_id: model_id.clone(),
                strategy: strategy.to_string(),
            }
        };
        if !SUPPORTED_STRATEGIES.contains(&strategy) {
            return Err(unsupported_strategy());
        }

        let model_impl = model.model_impl.as_deref().unwrap_or_default();
        if !SUPPORTED_IMPLS.contains(&model_impl) {
            tracing::error!(
                "Unsupported model impl type '{}' for model '{}' in entity set '{}'",
                model_impl,
                model_id,
                entity_set_id
            );
            return Err(Error::UnsupportedModelImplType {
                entity_set_id: entity_set_id.clone(),
                model_id: model_id.clone(),
                model_impl: model_impl.to_string(),
            });
        }

        let params = &model.model_generate_params;
        let loader = match (model_impl, strategy) {
            (IMPL_PATTERN_TAGGER, STRATEGY_BUILTIN) => {
                self.pattern_loader(PatternSource::Builtin, model)
            }
            (IMPL_PATTERN_TAGGER, STRATEGY_LOCAL_DISK) => {
                let path = self.model_path(entity_set, model);
                self.pattern_loader(PatternSource::Directory(path), model)
            }
            (IMPL_SEQUENCE_TAGGER, STRATEGY_LOCAL_DISK) => {
                let path = self.model_path(entity_set, model);
                self.remote_loader(params, path.display().to_string(), strategy)
            }
            (IMPL_SEQUENCE_TAGGER, STRATEGY_REMOTE | STRATEGY_HUGGINGFACE) => {
                self.remote_loader(params, model.model_name.clone(), strategy)
            }
            _ => return Err(unsupported_strategy()),
        };

        let tokenizer = match model.model_tokenizer_params.get("abbreviations") {
            Some(serde_json::Value::Array(items)) => {
                Tokenizer::new().extend_abbreviations(items.iter().filter_map(|v| v.as_str()))
            }
            _ => Tokenizer::new(),
        };

        Ok(Some(InferenceMaker::new(Arc::new(loader), tokenizer)))
    }

    fn pattern_loader(&self, source: PatternSource, model: &SupportedModel) -> CachedModelLoader {
        let params = &model.model_generate_params;
        let label_map = params
            .get("label_map")
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let min_score = params
            .get("min_score")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;

        CachedModelLoader::new(
            PatternTaggerLoader::new(source)
                .with_label_map(label_map)
                .with_min_score(min_score),
        )
    }

    fn remote_loader(
        &self,
        params: &HashMap<String, serde_json::Value>,
        model: String,
        strategy: &str,
    ) -> CachedModelLoader {
        let endpoint = params
            .get("endpoint")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.settings.remote_endpoint.clone());
        CachedModelLoader::new(RemoteTaggerLoader::new(
            self.client.clone(),
            endpoint,
            model,
            strategy,
        ))
    }

    /// `<models root>/<model_directory_name...>/<model_version>`
    pub fn model_path(&self, entity_set: &EntitySet, model: &SupportedModel) -> PathBuf {
        let root = self
            .settings
            .models_root
            .clone()
            .unwrap_or_else(|| entity_set.models_root());
        model.model_path(&root)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn entity_set(&self, entity_set_id: &str) -> Result<&EntitySet> {
        self.catalog
            .get(entity_set_id)
            .ok_or_else(|| Error::entity_set_not_found(entity_set_id))
    }

    pub fn inference_maker(&self, entity_set_id: &str, model_id: &str) -> Result<Arc<InferenceMaker>> {
        let set_models = self
            .models
            .get(entity_set_id)
            .ok_or_else(|| Error::entity_set_not_found(entity_set_id))?;
        set_models
            .get(model_id)
            .cloned()
            .ok_or_else(|| Error::model_not_found(entity_set_id, model_id))
    }

    /// `model_id -> model_type` for every catalog model of the set.
    pub fn list_models(&self, entity_set_id: &str) -> Result<HashMap<String, Option<String>>> {
        Ok(self
            .entity_set(entity_set_id)?
            .supported_models
            .iter()
            .map(|m| (m.model_id.clone(), m.model_type.clone()))
            .collect())
    }

    pub fn entity_set_labels(&self, entity_set_id: &str) -> Result<Vec<String>> {
        Ok(self.entity_set(entity_set_id)?.tagger_labels())
    }

    pub fn model_config(&self, entity_set_id: &str, model_id: &str) -> Result<SupportedModel> {
        self.entity_set(entity_set_id)?
            .model(model_id)
            .cloned()
            .ok_or_else(|| Error::model_not_found(entity_set_id, model_id))
    }

    /// Number of models that passed their checks and can serve requests.
    pub fn available_models(&self) -> usize {
        self.models.values().map(HashMap::len).sum()
    }
}
