//! Prediction and app-info services shared by the HTTP API and the CLI

pub mod app_info;
pub mod mappings;
pub mod prediction;

use std::sync::Arc;

use redakto_models::ModelRegistry;
use tokio::sync::RwLock;

pub use app_info::AppInfoService;
pub use mappings::{builtin_label_mapping, label_mapping_for};
pub use prediction::{PredictionService, REQUIRED_MODEL_TYPE};

/// Registry shared between services; `reload` swaps it under the write lock.
pub type SharedRegistry = Arc<RwLock<ModelRegistry>>;

pub fn shared(registry: ModelRegistry) -> SharedRegistry {
    Arc::new(RwLock::new(registry))
}
