//! Configuration loading for tf-core.
//!
//! Resolves the table config and translations files (CLI > env > config dir >
//! XDG > /etc > built-in defaults), parses and validates them, and records a
//! snapshot with content hashes.

pub use tf_config::validate::ValidationError;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tf_config::resolve::is_toml_path;
use tf_config::{
    resolve_config, validate_table_config, ConfigPaths, ConfigSnapshot, TableConfig, Translations,
};

use crate::logging::event_names;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid table config {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("invalid translations file {path}: {source}")]
    Translations {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("semantic validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::IoError { .. } => 60,
            ConfigError::Table { source, .. }
            | ConfigError::Translations { source, .. }
            | ConfigError::Validation(source) => source.code(),
        }
    }
}

impl From<ConfigError> for tf_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::IoError { source, .. } => tf_common::Error::Io(source),
            ConfigError::Translations { .. } => {
                tf_common::Error::InvalidTranslations(err.to_string())
            }
            other => tf_common::Error::InvalidTableConfig(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit table config path (highest priority).
    pub table_path: Option<PathBuf>,
    /// Explicit translations path.
    pub translations_path: Option<PathBuf>,
}

/// Loaded configuration with provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub table: TableConfig,
    pub translations: Translations,
    pub paths: ConfigPaths,
    pub snapshot: ConfigSnapshot,
}

/// Load and validate configuration with the standard resolution order.
pub fn load_config(options: &ConfigOptions) -> Result<LoadedConfig, ConfigError> {
    let paths = resolve_config(
        options.table_path.as_deref(),
        options.translations_path.as_deref(),
    );

    let (table, table_content) = match &paths.table {
        Some(path) => {
            let content = read(path)?;
            let table = TableConfig::parse(&content, is_toml_path(path)).map_err(|source| {
                ConfigError::Table {
                    path: path.clone(),
                    source,
                }
            })?;
            tracing::debug!(
                target: event_names::CONFIG_LOADED,
                path = %path.display(),
                source = %paths.table_source,
                "table config loaded"
            );
            (table, Some(content))
        }
        None => {
            tracing::debug!(
                target: event_names::CONFIG_DEFAULT_USED,
                "no table config found; using built-in roles table"
            );
            (TableConfig::default(), None)
        }
    };

    let (translations, translations_content) = match &paths.translations {
        Some(path) => {
            let content = read(path)?;
            let translations =
                Translations::from_json(&content).map_err(|source| ConfigError::Translations {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(
                target: event_names::CONFIG_LOADED,
                path = %path.display(),
                overrides = translations.override_count() as u64,
                "translations loaded"
            );
            (translations, Some(content))
        }
        None => (Translations::english(), None),
    };

    validate_table_config(&table)?;

    let snapshot = ConfigSnapshot::new(
        &table,
        &paths,
        table_content.as_deref(),
        translations_content.as_deref(),
    );

    Ok(LoadedConfig {
        table,
        translations,
        paths,
        snapshot,
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn explicit_json_config_is_loaded_and_hashed() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        let json = serde_json::to_string(&TableConfig::default()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = load_config(&ConfigOptions {
            table_path: Some(file.path().to_path_buf()),
            translations_path: None,
        })
        .unwrap();
        assert_eq!(loaded.table.table, "roles");
        assert!(loaded.snapshot.table_hash.is_some());
    }

    #[test]
    fn invalid_translations_carry_path() {
        let mut table = NamedTempFile::with_suffix(".json").unwrap();
        table
            .write_all(serde_json::to_string(&TableConfig::default()).unwrap().as_bytes())
            .unwrap();
        let mut tr = NamedTempFile::with_suffix(".json").unwrap();
        tr.write_all(b"[1, 2]").unwrap();

        let err = load_config(&ConfigOptions {
            table_path: Some(table.path().to_path_buf()),
            translations_path: Some(tr.path().to_path_buf()),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Translations { .. }));
        let common: tf_common::Error = err.into();
        assert_eq!(common.code(), 12);
    }

    #[test]
    fn semantic_errors_are_reported() {
        let mut config = TableConfig::default();
        config.search_columns.clear();
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();
        let err = load_config(&ConfigOptions {
            table_path: Some(file.path().to_path_buf()),
            translations_path: None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
