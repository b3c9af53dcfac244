//! Table configuration types.
//!
//! A table config enumerates the page element ids the engine drives, the
//! searchable columns, the filter dimensions and the optional bulk and modal
//! sections. The built-in default describes the roles table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Complete table configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableConfig {
    pub schema_version: String,

    /// Short table name used in logs and global bindings (e.g. "roles").
    pub table: String,

    pub elements: ElementIds,

    /// Translation keys for the row noun.
    #[serde(default)]
    pub noun: NounKeys,

    pub search_columns: Vec<SearchColumn>,

    #[serde(default)]
    pub filters: Vec<DimensionConfig>,

    #[serde(default)]
    pub bulk: Option<BulkConfig>,

    #[serde(default)]
    pub modal: Option<ModalConfig>,
}

/// Page element ids driven by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ElementIds {
    pub search_input: String,
    pub table_container: String,
    pub no_results: String,
    pub results_summary: String,

    /// Text node inside the no-results region that echoes the query.
    #[serde(default)]
    pub search_term: Option<String>,

    #[serde(default)]
    pub filter_button: Option<String>,

    #[serde(default)]
    pub search_icon: Option<String>,
}

/// Translation keys for the singular and plural row noun.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NounKeys {
    pub singular: String,
    pub plural: String,
}

impl Default for NounKeys {
    fn default() -> Self {
        Self {
            singular: "item".to_string(),
            plural: "items".to_string(),
        }
    }
}

/// A searchable column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchColumn {
    /// Stable key used in output.
    pub key: String,

    /// Cell selector in the rendered row (e.g. ".searchable-rolename").
    pub selector: String,

    /// Whether matches in this column are highlighted.
    #[serde(default = "default_true")]
    pub highlight: bool,

    /// Placeholder text rendered when the value is missing; never highlighted.
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_true() -> bool {
    true
}

/// How values selected within one dimension combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Row matches when it has any of the selected values (OR).
    #[default]
    Any,
    /// Row matches only when it has every selected value (AND).
    All,
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::Any => write!(f, "any"),
            Combinator::All => write!(f, "all"),
        }
    }
}

/// Where a dimension reads its categorical value(s) from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSource {
    /// Trimmed text of the row's first badge.
    Badge,
    /// Every keyword contained in the first badge's text.
    BadgeKeyword { keywords: Vec<String> },
    /// A single data attribute.
    Attribute { name: String },
    /// A data attribute holding several values joined by a separator.
    AttributeList { name: String, separator: String },
    /// Trimmed text of a cell.
    Cell { selector: String },
}

/// A filter dimension.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DimensionConfig {
    pub name: String,
    pub label: String,
    pub source: ValueSource,

    /// Optional source for the label shown in the filter menu.
    #[serde(default)]
    pub display: Option<ValueSource>,

    #[serde(default)]
    pub combinator: Combinator,
}

/// Bulk selection and bulk action section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BulkConfig {
    pub select_all: String,
    pub bulk_button: String,

    #[serde(default)]
    pub selected_count: Option<String>,

    #[serde(default)]
    pub progress: Option<String>,

    /// Action name reported in progress and logs.
    #[serde(default = "default_action")]
    pub action: String,

    /// Path template with an `{id}` placeholder.
    pub endpoint: String,

    /// Data attribute holding the display name of a row.
    pub name_attribute: String,

    /// Cell selector holding the description of a row.
    #[serde(default)]
    pub description_selector: Option<String>,

    /// Fixed pause between requests.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Per-request timeout; the transport default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_action() -> String {
    "delete".to_string()
}

fn default_pause_ms() -> u64 {
    200
}

/// Which trigger attribute a modal target displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrefillField {
    Id,
    Name,
    Description,
}

/// A text node inside the confirmation dialog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModalTarget {
    pub element: String,
    pub field: PrefillField,

    /// Translation key used when the trigger lacks the attribute.
    #[serde(default)]
    pub fallback_key: Option<String>,
}

/// Confirmation dialog prefill section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModalConfig {
    pub modal: String,
    pub id_attribute: String,
    pub name_attribute: String,

    #[serde(default)]
    pub description_attribute: Option<String>,

    #[serde(default)]
    pub targets: Vec<ModalTarget>,

    #[serde(default)]
    pub form: Option<String>,

    /// Form action template with an `{id}` placeholder.
    pub action_template: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            table: "roles".to_string(),
            elements: ElementIds {
                search_input: "searchInput".to_string(),
                table_container: "rolesTableContainer".to_string(),
                no_results: "noSearchResults".to_string(),
                results_summary: "searchResults".to_string(),
                search_term: Some("searchTerm".to_string()),
                filter_button: Some("filtersDropdown".to_string()),
                search_icon: Some("searchIcon".to_string()),
            },
            noun: NounKeys {
                singular: "role".to_string(),
                plural: "roles".to_string(),
            },
            search_columns: vec![
                SearchColumn {
                    key: "name".to_string(),
                    selector: ".searchable-rolename".to_string(),
                    highlight: true,
                    placeholder: None,
                },
                SearchColumn {
                    key: "description".to_string(),
                    selector: ".searchable-description".to_string(),
                    highlight: true,
                    placeholder: None,
                },
            ],
            filters: vec![DimensionConfig {
                name: "type".to_string(),
                label: "Type".to_string(),
                source: ValueSource::BadgeKeyword {
                    keywords: vec!["Composite".to_string(), "Simple".to_string()],
                },
                display: None,
                combinator: Combinator::Any,
            }],
            bulk: Some(BulkConfig {
                select_all: "selectAllCheckbox".to_string(),
                bulk_button: "bulkDeleteBtn".to_string(),
                selected_count: Some("selectedCount".to_string()),
                progress: Some("bulkDeleteProgress".to_string()),
                action: default_action(),
                endpoint: "/role/delete/{id}".to_string(),
                name_attribute: "data-rolename".to_string(),
                description_selector: Some(".searchable-description".to_string()),
                pause_ms: default_pause_ms(),
                timeout_secs: None,
            }),
            modal: Some(ModalConfig {
                modal: "deleteRoleModal".to_string(),
                id_attribute: "data-role-id".to_string(),
                name_attribute: "data-rolename".to_string(),
                description_attribute: Some("data-role-description".to_string()),
                targets: vec![
                    ModalTarget {
                        element: "deleteRoleName".to_string(),
                        field: PrefillField::Name,
                        fallback_key: None,
                    },
                    ModalTarget {
                        element: "deleteRoleDescription".to_string(),
                        field: PrefillField::Description,
                        fallback_key: Some("no_description".to_string()),
                    },
                ],
                form: Some("deleteRoleForm".to_string()),
                action_template: "/role/delete/{id}".to_string(),
            }),
        }
    }
}

impl TableConfig {
    /// Look up a dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&DimensionConfig> {
        self.filters.iter().find(|d| d.name == name)
    }

    /// Parse a config from TOML or JSON text, chosen by `is_toml`.
    pub fn parse(content: &str, is_toml: bool) -> ValidationResult<Self> {
        if is_toml {
            toml::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
        } else {
            serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_json() {
        let config = TableConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = TableConfig::parse(&json, false).unwrap();
        assert_eq!(back.table, "roles");
        assert_eq!(back.search_columns.len(), 2);
        assert_eq!(back.filters[0].combinator, Combinator::Any);
    }

    #[test]
    fn toml_defaults_fill_optional_fields() {
        let toml = r#"
schema_version = "1.0.0"
table = "users"
search_columns = [
  { key = "username", selector = ".searchable-username" },
  { key = "email", selector = ".searchable-email", placeholder = "No email" },
]

[elements]
search_input = "searchInput"
table_container = "usersTableContainer"
no_results = "noSearchResults"
results_summary = "searchResults"

[[filters]]
name = "modules"
label = "Module access"
combinator = "all"
source = { kind = "attribute_list", name = "data-modules", separator = "," }
"#;
        let config = TableConfig::parse(toml, true).unwrap();
        assert!(config.search_columns[0].highlight);
        assert_eq!(
            config.search_columns[1].placeholder.as_deref(),
            Some("No email")
        );
        assert_eq!(config.noun.plural, "items");
        let modules = config.dimension("modules").unwrap();
        assert_eq!(modules.combinator, Combinator::All);
        assert_eq!(
            modules.source,
            ValueSource::AttributeList {
                name: "data-modules".into(),
                separator: ",".into()
            }
        );
        assert!(config.bulk.is_none());
    }

    #[test]
    fn bulk_defaults_apply() {
        let json = r#"{
            "select_all": "selectAll",
            "bulk_button": "bulkBtn",
            "endpoint": "/user/delete/{id}",
            "name_attribute": "data-username"
        }"#;
        let bulk: BulkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(bulk.action, "delete");
        assert_eq!(bulk.pause_ms, 200);
        assert!(bulk.timeout_secs.is_none());
    }
}
