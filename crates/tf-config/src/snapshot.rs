//! Configuration snapshots for run reports.
//!
//! A snapshot captures the configuration a run was made with, so a bulk
//! report can be traced back to the exact table config and translations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::{ConfigPaths, ConfigSource};
use crate::table::TableConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    /// SHA-256 hash of the table config content.
    #[serde(default)]
    pub table_hash: Option<String>,

    #[serde(default)]
    pub table_path: Option<String>,

    pub table_source: String,

    /// SHA-256 hash of the translations content.
    #[serde(default)]
    pub translations_hash: Option<String>,

    #[serde(default)]
    pub translations_path: Option<String>,

    pub translations_source: String,

    /// Combined hash of all config files (for quick comparison).
    pub combined_hash: String,

    pub summary: ConfigSummary,
}

/// Key configuration values for quick reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub table: String,
    pub search_columns: usize,
    pub dimensions: Vec<String>,
    pub bulk_enabled: bool,
    #[serde(default)]
    pub bulk_endpoint: Option<String>,
    pub modal_enabled: bool,
}

impl ConfigSummary {
    pub fn from_config(config: &TableConfig) -> Self {
        ConfigSummary {
            table: config.table.clone(),
            search_columns: config.search_columns.len(),
            dimensions: config.filters.iter().map(|d| d.name.clone()).collect(),
            bulk_enabled: config.bulk.is_some(),
            bulk_endpoint: config.bulk.as_ref().map(|b| b.endpoint.clone()),
            modal_enabled: config.modal.is_some(),
        }
    }
}

impl ConfigSnapshot {
    /// Create a snapshot from loaded configuration and the raw file contents.
    pub fn new(
        config: &TableConfig,
        paths: &ConfigPaths,
        table_content: Option<&str>,
        translations_content: Option<&str>,
    ) -> Self {
        let table_hash = table_content.map(hash_content);
        let translations_hash = translations_content.map(hash_content);

        let combined = format!(
            "{}:{}",
            table_hash.as_deref().unwrap_or("none"),
            translations_hash.as_deref().unwrap_or("none")
        );

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            table_hash,
            table_path: paths.table.as_ref().map(|p| p.display().to_string()),
            table_source: paths.table_source.to_string(),
            translations_hash,
            translations_path: paths.translations.as_ref().map(|p| p.display().to_string()),
            translations_source: paths.translations_source.to_string(),
            combined_hash: hash_content(&combined),
            summary: ConfigSummary::from_config(config),
        }
    }

    /// Create a snapshot with only defaults (no config files loaded).
    pub fn defaults_only() -> Self {
        let config = TableConfig::default();
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            table_hash: None,
            table_path: None,
            table_source: ConfigSource::BuiltinDefault.to_string(),
            translations_hash: None,
            translations_path: None,
            translations_source: ConfigSource::BuiltinDefault.to_string(),
            combined_hash: hash_content("none:none"),
            summary: ConfigSummary::from_config(&config),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.combined_hash == other.combined_hash
    }

    /// Short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.combined_hash[..12.min(self.combined_hash.len())]
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_snapshot() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.schema_version, crate::CONFIG_SCHEMA_VERSION);
        assert!(snapshot.table_hash.is_none());
        assert_eq!(snapshot.summary.table, "roles");
        assert!(snapshot.summary.bulk_enabled);
    }

    #[test]
    fn test_snapshot_short_id() {
        assert_eq!(ConfigSnapshot::defaults_only().short_id().len(), 12);
    }

    #[test]
    fn test_snapshot_changes_with_content() {
        let config = TableConfig::default();
        let paths = ConfigPaths::default();
        let a = ConfigSnapshot::new(&config, &paths, Some("{\"a\":1}"), None);
        let b = ConfigSnapshot::new(&config, &paths, Some("{\"a\":2}"), None);
        let c = ConfigSnapshot::new(&config, &paths, Some("{\"a\":1}"), None);
        assert!(!a.matches(&b));
        assert!(a.matches(&c));
    }

    #[test]
    fn test_hash_content() {
        let hash = hash_content("test");
        assert_eq!(hash, hash_content("test"));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = ConfigSnapshot::defaults_only();
        let json = snapshot.to_json().unwrap();
        let restored = ConfigSnapshot::from_json(&json).unwrap();
        assert!(snapshot.matches(&restored));
    }
}
