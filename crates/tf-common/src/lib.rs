//! Table Filter common types, IDs, and errors.
//!
//! This crate provides foundational types shared across tf-core modules:
//! - Row identity types
//! - Common error types with stable codes
//! - Output formats

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use id::RowId;
pub use output::OutputFormat;
