//! Table Filter configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the table config (element ids, search columns,
//!   filter dimensions, bulk and modal sections)
//! - The translation-string lookup used for display text
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for run reports

pub mod resolve;
pub mod snapshot;
pub mod table;
pub mod translations;
pub mod validate;

pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use table::{
    BulkConfig, Combinator, DimensionConfig, ElementIds, ModalConfig, ModalTarget, NounKeys,
    PrefillField, SearchColumn, TableConfig, ValueSource,
};
pub use translations::Translations;
pub use validate::{validate_table_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
