use crate::assembler::PagingConfig;
use crate::catalog::{CatalogConfig, FieldCatalog};
use crate::engine::EngineConfig;
use crate::error::{BibqError, Result};
use crate::profile::{ProfileMetadata, Profiles};
use crate::query::{CqlParser, KeywordConfig, Tokenizer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "bibq";
const CONFIG_FILE: &str = "config.json";

/// Application configuration, stored as JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Field catalog; the built-in bibliographic catalog when absent
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,

    #[serde(default)]
    pub profiles: Vec<ProfileMetadata>,

    #[serde(default)]
    pub keywords: KeywordConfig,

    #[serde(default)]
    pub paging: PagingConfig,
}

impl AppConfig {
    /// Load from `path` if given, else from the app data directory, else
    /// fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match get_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.base_url.trim().is_empty() {
            return Err(BibqError::Config("engine.base_url is empty".to_string()));
        }
        if self.paging.max_rows == 0 {
            return Err(BibqError::Config("paging.max_rows must be positive".to_string()));
        }
        self.field_catalog()?;
        self.tokenizer()?;
        Ok(())
    }

    pub fn field_catalog(&self) -> Result<FieldCatalog> {
        match &self.catalog {
            Some(catalog) => FieldCatalog::from_config(catalog),
            None => Ok(FieldCatalog::default()),
        }
    }

    pub fn profiles(&self, catalog: &FieldCatalog) -> Result<Profiles> {
        Profiles::from_metadata(&self.profiles, catalog)
    }

    pub fn tokenizer(&self) -> Result<Tokenizer> {
        let booleans = self.keywords.boolean_keywords().ok_or_else(|| {
            BibqError::Config(format!(
                "unknown keyword locale '{}' or synonym operator",
                self.keywords.locale
            ))
        })?;
        Ok(Tokenizer::new(booleans, self.keywords.relation_keywords()))
    }

    pub fn parser(&self) -> Result<CqlParser> {
        Ok(CqlParser::new(self.tokenizer()?))
    }
}

/// Path of the config file in the app data directory
pub fn get_config_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Application data directory
pub fn get_app_data_dir() -> Option<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: XDG_CONFIG_HOME or ~/.config
        dirs::config_dir()
    };
    base.map(|b| b.join(APP_NAME))
}
