//! Configuration validation errors and semantic validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::table::{TableConfig, ValueSource};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Schema validation failed: {0}")]
    SchemaError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::ParseError(_) => 61,
            ValidationError::SchemaError(_) => 62,
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Placeholder every endpoint template must carry.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Validate a table configuration semantically.
pub fn validate_table_config(config: &TableConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.table.trim().is_empty() {
        return Err(ValidationError::MissingField("table".to_string()));
    }

    let elements = &config.elements;
    for (field, value) in [
        ("elements.search_input", &elements.search_input),
        ("elements.table_container", &elements.table_container),
        ("elements.no_results", &elements.no_results),
        ("elements.results_summary", &elements.results_summary),
    ] {
        require_non_empty(field, value)?;
    }

    if config.search_columns.is_empty() {
        return Err(ValidationError::MissingField("search_columns".to_string()));
    }
    let mut keys = HashSet::new();
    for (i, column) in config.search_columns.iter().enumerate() {
        require_non_empty(&format!("search_columns[{}].key", i), &column.key)?;
        require_non_empty(&format!("search_columns[{}].selector", i), &column.selector)?;
        if !keys.insert(column.key.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "duplicate search column key '{}'",
                column.key
            )));
        }
    }

    let mut names = HashSet::new();
    for dim in &config.filters {
        require_non_empty("filters[].name", &dim.name)?;
        if !names.insert(dim.name.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "duplicate filter dimension '{}'",
                dim.name
            )));
        }
        validate_source(&format!("filters.{}.source", dim.name), &dim.source)?;
        if let Some(display) = &dim.display {
            validate_source(&format!("filters.{}.display", dim.name), display)?;
        }
    }

    if let Some(bulk) = &config.bulk {
        require_non_empty("bulk.select_all", &bulk.select_all)?;
        require_non_empty("bulk.bulk_button", &bulk.bulk_button)?;
        require_non_empty("bulk.name_attribute", &bulk.name_attribute)?;
        require_placeholder("bulk.endpoint", &bulk.endpoint)?;
        if bulk.pause_ms > 60_000 {
            return Err(ValidationError::InvalidValue {
                field: "bulk.pause_ms".to_string(),
                message: format!("must be at most 60000, got {}", bulk.pause_ms),
            });
        }
        if bulk.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "bulk.timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
    }

    if let Some(modal) = &config.modal {
        require_non_empty("modal.modal", &modal.modal)?;
        require_non_empty("modal.id_attribute", &modal.id_attribute)?;
        require_non_empty("modal.name_attribute", &modal.name_attribute)?;
        require_placeholder("modal.action_template", &modal.action_template)?;
        for target in &modal.targets {
            require_non_empty("modal.targets[].element", &target.element)?;
        }
    }

    Ok(())
}

fn validate_source(field: &str, source: &ValueSource) -> ValidationResult<()> {
    match source {
        ValueSource::Badge => Ok(()),
        ValueSource::BadgeKeyword { keywords } => {
            if keywords.is_empty() || keywords.iter().any(|k| k.trim().is_empty()) {
                Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "keywords must be non-empty".to_string(),
                })
            } else {
                Ok(())
            }
        }
        ValueSource::Attribute { name } => require_non_empty(field, name),
        ValueSource::AttributeList { name, separator } => {
            require_non_empty(field, name)?;
            if separator.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "separator must be non-empty".to_string(),
                });
            }
            Ok(())
        }
        ValueSource::Cell { selector } => require_non_empty(field, selector),
    }
}

fn require_non_empty(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field.to_string()))
    } else {
        Ok(())
    }
}

fn require_placeholder(field: &str, template: &str) -> ValidationResult<()> {
    if template.contains(ID_PLACEHOLDER) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("template must contain {}, got '{}'", ID_PLACEHOLDER, template),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Combinator, DimensionConfig};

    #[test]
    fn default_config_is_valid() {
        validate_table_config(&TableConfig::default()).unwrap();
    }

    #[test]
    fn rejects_wrong_schema_version() {
        let mut config = TableConfig::default();
        config.schema_version = "0.9.0".into();
        let err = validate_table_config(&config).unwrap_err();
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn rejects_endpoint_without_placeholder() {
        let mut config = TableConfig::default();
        if let Some(bulk) = config.bulk.as_mut() {
            bulk.endpoint = "/role/delete".into();
        }
        let err = validate_table_config(&config).unwrap_err();
        assert!(err.to_string().contains("bulk.endpoint"));
    }

    #[test]
    fn rejects_duplicate_dimensions() {
        let mut config = TableConfig::default();
        config.filters.push(DimensionConfig {
            name: "type".into(),
            label: "Type again".into(),
            source: ValueSource::Badge,
            display: None,
            combinator: Combinator::All,
        });
        let err = validate_table_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::SemanticError(_)));
    }

    #[test]
    fn rejects_empty_separator() {
        let mut config = TableConfig::default();
        config.filters[0].source = ValueSource::AttributeList {
            name: "data-modules".into(),
            separator: String::new(),
        };
        let err = validate_table_config(&config).unwrap_err();
        assert_eq!(err.code(), 65);
    }

    #[test]
    fn rejects_missing_search_columns() {
        let mut config = TableConfig::default();
        config.search_columns.clear();
        let err = validate_table_config(&config).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(_)));
    }
}
