pub mod detect;
pub mod entity_sets;
pub mod init;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Result, bail};
use redakto_config::Config;
use redakto_engine::SharedRegistry;
use redakto_models::{ModelRegistry, RegistrySettings};

/// Loaded config plus the overrides given on the command line.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub catalog: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Config, config_path: PathBuf, catalog: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            catalog,
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        let placeholders = Config::placeholders(&self.config_path);
        self.catalog
            .clone()
            .unwrap_or_else(|| self.config.catalog_path(&placeholders))
    }

    /// Build the model registry from the catalog file.
    pub fn registry(&self) -> Result<SharedRegistry> {
        let path = self.catalog_path();
        if !path.exists() {
            bail!(
                "Entity set catalog not found at {}\n  Run 'redakto init' or pass --catalog",
                path.display()
            );
        }

        let placeholders = Config::placeholders(&self.config_path);
        let settings = RegistrySettings::from_config(&self.config, &placeholders);
        let registry = ModelRegistry::from_file(&path, placeholders, settings)?;
        tracing::info!(
            "Loaded {} entity sets with {} usable models from {}",
            registry.catalog().entity_sets().len(),
            registry.available_models(),
            path.display()
        );
        Ok(redakto_engine::shared(registry))
    }
}
