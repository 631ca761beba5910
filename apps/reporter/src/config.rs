//! # Reporter Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --format csv --output ./reportes                                   │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     FISCO_DB_PATH, FISCO_OUTPUT_DIR, FISCO_STORE_NAME,                 │
//! │     FISCO_STORE_RNC, FISCO_EXPORT_FORMAT                               │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/fisco/reporter.toml (Linux), or --config <path>          │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Colmado La Esquina"
//! rnc = "101-00000-1"
//! address = "Calle El Conde 12, Santo Domingo"
//!
//! [database]
//! path = "/var/lib/fisco/fisco.db"
//! max_connections = 5
//!
//! [export]
//! output_dir = "./reportes"
//! format = "pdf"  # pdf | csv
//! ```

use std::path::PathBuf;

use fisco_core::validation::validate_rnc;
use fisco_db::DbConfig;
use fisco_export::{ExportFormat, StoreInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "reporter.toml";
const DATABASE_FILE: &str = "fisco.db";

// =============================================================================
// Sections
// =============================================================================

/// Business identity printed in document headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub name: String,
    pub rnc: String,
    pub address: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: "Mi Negocio".to_string(),
            rnc: "000-00000-0".to_string(),
            address: String::new(),
        }
    }
}

impl From<&StoreSettings> for StoreInfo {
    fn from(s: &StoreSettings) -> Self {
        StoreInfo {
            name: s.name.clone(),
            rnc: s.rnc.clone(),
            address: s.address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_dir: PathBuf::from("."),
            format: ExportFormat::Pdf,
        }
    }
}

// =============================================================================
// Reporter Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl ReporterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading reporter config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else if explicit {
                return Err(AppError::Config(format!("config file not found: {}", path.display())));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> AppResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::Config("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }
        validate_rnc(&self.store.rnc).map_err(|e| AppError::Config(format!("store.rnc: {e}")))?;
        Ok(())
    }

    /// Applies `FISCO_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FISCO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("FISCO_OUTPUT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }

        if let Some(name) = lookup("FISCO_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(rnc) = lookup("FISCO_STORE_RNC") {
            self.store.rnc = rnc;
        }

        if let Some(format) = lookup("FISCO_EXPORT_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.export.format = parsed,
                Err(_) => warn!(format = %format, "Unknown export format in environment"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("do", "fisco", "fisco")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    pub fn store_info(&self) -> StoreInfo {
        StoreInfo::from(&self.store)
    }
}

/// Platform data directory, or the working directory when there is none.
fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("do", "fisco", "fisco")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReporterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.format, ExportFormat::Pdf);
    }

    #[test]
    fn test_partial_toml() {
        let config = ReporterConfig::from_toml(
            r#"
            [store]
            name = "Colmado La Esquina"
            rnc = "101-00000-1"

            [export]
            format = "csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Colmado La Esquina");
        assert_eq!(config.store.address, "");
        assert_eq!(config.export.format, ExportFormat::Csv);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_bad_toml() {
        let err = ReporterConfig::from_toml("[export]\nformat = \"xlsx\"").unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FISCO_DB_PATH", "/tmp/tienda.db"),
            ("FISCO_STORE_RNC", "131-12345-6"),
            ("FISCO_EXPORT_FORMAT", "CSV"),
        ]);
        let mut config = ReporterConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/tienda.db"));
        assert_eq!(config.store.rnc, "131-12345-6");
        assert_eq!(config.export.format, ExportFormat::Csv);
    }

    #[test]
    fn test_unknown_env_format_is_ignored() {
        let mut config = ReporterConfig::default();
        config.apply_overrides(|key| (key == "FISCO_EXPORT_FORMAT").then(|| "docx".to_string()));
        assert_eq!(config.export.format, ExportFormat::Pdf);
    }

    #[test]
    fn test_validation() {
        let mut config = ReporterConfig::default();
        config.store.rnc = "12345".into();
        assert!(matches!(config.validate(), Err(AppError::Config(msg)) if msg.starts_with("store.rnc")));

        let mut config = ReporterConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ReporterConfig::default();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ReporterConfig::load(Some(PathBuf::from("/nonexistent/reporter.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
