//! Error types for Table Filter.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 21,
//!   "category": "document",
//!   "message": "required element not found: searchInput",
//!   "recoverable": true,
//!   "suggested_action": "fix_document",
//!   "context": { "element_id": "searchInput" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Table Filter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Table config and translation file errors.
    Config,
    /// Rendered table / document shape errors.
    Document,
    /// Bulk action errors.
    Action,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Document => write!(f, "document"),
            ErrorCategory::Action => write!(f, "action"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for callers to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Run the config check command.
    RunCheck,
    /// Fix the rendered document snapshot.
    FixDocument,
    /// Skip this item and continue.
    Skip,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::FixDocument => write!(f, "fix_document"),
            SuggestedAction::Skip => write!(f, "skip"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for Table Filter.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid table config: {0}")]
    InvalidTableConfig(String),

    #[error("invalid translations file: {0}")]
    InvalidTranslations(String),

    // Document errors (20-29)
    #[error("document error: {0}")]
    Document(String),

    #[error("required element not found: {id}")]
    MissingElement { id: String },

    #[error("unknown filter dimension: {name}")]
    UnknownDimension { name: String },

    // Action errors (40-49)
    #[error("request for row {id} failed with status {status}")]
    RequestFailed { id: String, status: u16 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Document errors
    /// - 40-49: Action errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidTableConfig(_) => 11,
            Error::InvalidTranslations(_) => 12,
            Error::Document(_) => 20,
            Error::MissingElement { .. } => 21,
            Error::UnknownDimension { .. } => 23,
            Error::RequestFailed { .. } => 42,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidTableConfig(_) | Error::InvalidTranslations(_) => ErrorCategory::Config,

            Error::Document(_) | Error::MissingElement { .. } | Error::UnknownDimension { .. } => {
                ErrorCategory::Document
            }

            Error::RequestFailed { .. } => ErrorCategory::Action,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidTableConfig(_) | Error::InvalidTranslations(_) => true,

            Error::Document(_) => true,
            Error::MissingElement { .. } => true,
            Error::UnknownDimension { .. } => true,

            Error::RequestFailed { status, .. } => *status >= 500,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns the suggested action for callers.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::InvalidTableConfig(_) | Error::InvalidTranslations(_) => {
                SuggestedAction::RunCheck
            }

            Error::Document(_) | Error::MissingElement { .. } => SuggestedAction::FixDocument,
            Error::UnknownDimension { .. } => SuggestedAction::RunCheck,

            Error::RequestFailed { status, .. } if *status >= 500 => SuggestedAction::Retry,
            Error::RequestFailed { .. } => SuggestedAction::Skip,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidTableConfig(_) => {
                "Run 'tf-core check' to validate the table configuration."
            }
            Error::InvalidTranslations(_) => {
                "Translations must be a flat JSON object mapping keys to strings."
            }
            Error::Document(_) => "Re-export the rendered table snapshot and try again.",
            Error::MissingElement { .. } => {
                "Make sure the page renders every element id named in the table config."
            }
            Error::UnknownDimension { .. } => {
                "Use one of the filter dimension names declared in the table config."
            }
            Error::RequestFailed { .. } => {
                "The server rejected the request. Check permissions and the endpoint template."
            }
            Error::Io(_) => "Check file paths and permissions.",
            Error::Json(_) => "Check the JSON syntax of the input file.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidTableConfig(_) => "Invalid Table Configuration",
            Error::InvalidTranslations(_) => "Invalid Translations",
            Error::Document(_) => "Document Error",
            Error::MissingElement { .. } => "Missing Page Element",
            Error::UnknownDimension { .. } => "Unknown Filter Dimension",
            Error::RequestFailed { .. } => "Request Failed",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Format for a human reader: headline, reason and fix.
    pub fn to_human(&self) -> String {
        format!(
            "\u{2717} {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for callers.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., row id, element id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MissingElement { id } => {
                context.insert("element_id".to_string(), serde_json::json!(id));
            }
            Error::UnknownDimension { name } => {
                context.insert("dimension".to_string(), serde_json::json!(name));
            }
            Error::RequestFailed { id, status } => {
                context.insert("row_id".to_string(), serde_json::json!(id));
                context.insert("status".to_string(), serde_json::json!(status));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_category_ranges() {
        assert_eq!(Error::InvalidTableConfig("x".into()).code(), 11);
        assert_eq!(
            Error::MissingElement {
                id: "searchInput".into()
            }
            .code(),
            21
        );
        let failed = Error::RequestFailed {
            id: "2".into(),
            status: 500,
        };
        assert_eq!(failed.code(), 42);
        assert_eq!(failed.category(), ErrorCategory::Action);
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.code(), 60);
        assert_eq!(io.category(), ErrorCategory::Io);
    }

    #[test]
    fn request_failed_recoverability_depends_on_status() {
        let server = Error::RequestFailed {
            id: "1".into(),
            status: 503,
        };
        let client = Error::RequestFailed {
            id: "1".into(),
            status: 403,
        };
        assert!(server.is_recoverable());
        assert_eq!(server.suggested_action(), SuggestedAction::Retry);
        assert!(!client.is_recoverable());
        assert_eq!(client.suggested_action(), SuggestedAction::Skip);
    }

    #[test]
    fn structured_error_carries_context() {
        let err = Error::MissingElement {
            id: "searchInput".into(),
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 21);
        assert_eq!(structured.category, ErrorCategory::Document);
        assert_eq!(
            structured.context.get("element_id"),
            Some(&serde_json::json!("searchInput"))
        );
        let json = structured.to_json();
        assert!(json.contains("\"suggested_action\":\"fix_document\""));
    }

    #[test]
    fn human_format_has_reason_and_fix() {
        let text = Error::UnknownDimension {
            name: "color".into(),
        }
        .to_human();
        assert!(text.contains("Unknown Filter Dimension"));
        assert!(text.contains("Reason: unknown filter dimension: color"));
        assert!(text.contains("Fix:"));
    }
}
