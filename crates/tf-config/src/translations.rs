//! Display-string lookup.
//!
//! Every word the engine renders goes through [`Translations`]. Built-in
//! English strings are always present; a translations file (a flat JSON
//! object of key → string) overrides individual keys.

use std::collections::BTreeMap;

use crate::validate::{ValidationError, ValidationResult};

/// Built-in English strings.
const DEFAULTS: &[(&str, &str)] = &[
    ("total", "Total"),
    ("showing", "Showing"),
    ("of", "of"),
    ("filtered", "filtered"),
    ("search_and_filters", "search + filters"),
    ("filters", "Filters"),
    ("search", "Search"),
    ("clear_search", "Clear search"),
    ("no_name", "No name"),
    ("no_description", "No description"),
    ("selected", "selected"),
    ("delete", "Delete"),
    ("deleting", "Deleting"),
    ("processing", "Processing"),
    ("deletion_complete", "Deletion complete"),
    ("deleted_successfully", "deleted successfully"),
    ("errors", "errors"),
    ("item", "item"),
    ("items", "items"),
    ("role", "role"),
    ("roles", "roles"),
    ("user", "user"),
    ("users", "users"),
];

/// Key → display string table with English fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    overrides: BTreeMap<String, String>,
}

impl Translations {
    /// English-only lookup.
    pub fn english() -> Self {
        Self::default()
    }

    /// Build from explicit overrides.
    pub fn from_map(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Parse a flat JSON object.
    pub fn from_json(content: &str) -> ValidationResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))?;
        let object = value.as_object().ok_or_else(|| {
            ValidationError::SchemaError("translations must be a JSON object".to_string())
        })?;

        let mut overrides = BTreeMap::new();
        for (key, value) in object {
            match value.as_str() {
                Some(text) => {
                    overrides.insert(key.clone(), text.to_string());
                }
                None => {
                    return Err(ValidationError::InvalidValue {
                        field: key.clone(),
                        message: "translation values must be strings".to_string(),
                    })
                }
            }
        }
        Ok(Self { overrides })
    }

    /// Look up a key. Unknown keys render as the key itself.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        if let Some(text) = self.overrides.get(key) {
            return text;
        }
        DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(key)
    }

    /// Whether the key resolves to something other than itself.
    pub fn contains(&self, key: &str) -> bool {
        self.overrides.contains_key(key) || DEFAULTS.iter().any(|(k, _)| *k == key)
    }

    /// Number of overridden keys.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}
