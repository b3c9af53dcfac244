//! Structured event definitions for logging.
//!
//! Levels, lifecycle stages and event names shared by every log line.
//! Events logged through a [`LogContext`] carry the run id and the table.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Where in the page lifecycle an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Config loading and page wiring.
    Init,
    /// Query and filter recomputation.
    Filter,
    /// Row selection changes.
    Select,
    /// Bulk action run.
    Bulk,
    /// Confirmation dialog prefill.
    Modal,
    /// Output rendering.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Filter => "filter",
            Stage::Select => "select",
            Stage::Bulk => "bulk",
            Stage::Modal => "modal",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";

    // Engine
    pub const ENGINE_INITIALIZED: &str = "engine.initialized";
    pub const ENGINE_DISABLED: &str = "engine.disabled";
    pub const ENGINE_RECOMPUTED: &str = "engine.recomputed";
    pub const FILTER_TOGGLED: &str = "filter.toggled";
    pub const FILTER_UNKNOWN_DIMENSION: &str = "filter.unknown_dimension";
    pub const SEARCH_CLEARED: &str = "search.cleared";

    // Selection
    pub const SELECTION_CHANGED: &str = "selection.changed";
    pub const SELECTION_REJECTED: &str = "selection.rejected";
    pub const SELECTION_PRUNED: &str = "selection.pruned";

    // Bulk action
    pub const BULK_STARTED: &str = "bulk.started";
    pub const BULK_BUSY: &str = "bulk.busy";
    pub const BULK_ITEM_DONE: &str = "bulk.item_done";
    pub const BULK_ITEM_FAILED: &str = "bulk.item_failed";
    pub const BULK_FINISHED: &str = "bulk.finished";

    // Modal
    pub const MODAL_PREFILLED: &str = "modal.prefilled";
    pub const MODAL_CLEARED: &str = "modal.cleared";

    // Global bindings
    pub const BINDING_REGISTERED: &str = "binding.registered";
    pub const BINDING_REPLACED: &str = "binding.replaced";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
}

/// Correlation ids shared by every event of one run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub table: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            table: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Label used for the `table` field; empty when no table is bound.
    pub fn table_label(&self) -> &str {
        self.table.as_deref().unwrap_or("")
    }
}
