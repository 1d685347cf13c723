pub mod catalog;
pub mod placeholders;

pub use catalog::{Catalog, EntitySet, EntitySetLabel, FineGrainedLabel, SupportedModel};
pub use placeholders::Placeholders;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the service configuration.
pub const CONFIG_FILE_NAME: &str = "redakto.toml";

/// Service configuration (`redakto.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub frameworks: FrameworksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,

    #[serde(default = "default_short_description")]
    pub short_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,

    /// Also write daily rotated log files into this directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path of the entity set catalog; may contain placeholders
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworksConfig {
    /// Overrides `supported_models_root_dir` of every entity set
    #[serde(default)]
    pub models_root: Option<String>,

    /// Endpoint of the remote sequence tagger
    #[serde(default = "default_remote_endpoint")]
    pub remote_endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            short_description: default_short_description(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for FrameworksConfig {
    fn default() -> Self {
        Self {
            models_root: None,
            remote_endpoint: default_remote_endpoint(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_app_name() -> String {
    "Redakto".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_short_description() -> String {
    "API for the Redakto application".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_path() -> String {
    "{CONFIG_DIR}/entity_set_models.yml".to_string()
}

fn default_remote_endpoint() -> String {
    "http://127.0.0.1:8080/predict".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing a default file there if it is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            tracing::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "redakto", "redakto") {
            dirs.config_dir().join(CONFIG_FILE_NAME)
        } else {
            PathBuf::from("~/.redakto").join(CONFIG_FILE_NAME)
        }
    }

    /// Placeholders for a config loaded from `config_path`.
    ///
    /// `{CONFIG_DIR}` is the directory of the config file, `{PROJECT_ROOT}`
    /// the working directory the service was started from.
    pub fn placeholders(config_path: &Path) -> Placeholders {
        let config_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Placeholders::new()
            .with_path("CONFIG_DIR", &config_dir)
            .with_path("PROJECT_ROOT", &project_root)
    }

    /// Resolved catalog path.
    pub fn catalog_path(&self, placeholders: &Placeholders) -> PathBuf {
        PathBuf::from(placeholders.apply(&self.catalog.path))
    }

    /// Resolved models root override, if any.
    pub fn models_root(&self, placeholders: &Placeholders) -> Option<PathBuf> {
        self.frameworks
            .models_root
            .as_deref()
            .map(|root| PathBuf::from(placeholders.apply(root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert!(config.frameworks.models_root.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.frameworks.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.app.name, "Redakto");

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.catalog.path, config.catalog.path);
    }

    #[test]
    fn test_catalog_path_resolves_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let placeholders = Config::placeholders(&path);

        let catalog = Config::default().catalog_path(&placeholders);
        assert_eq!(catalog, dir.path().join("entity_set_models.yml"));
    }
}
