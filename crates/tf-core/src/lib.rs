//! Table Filter Core Library
//!
//! Headless search, filter, bulk-selection and dialog-prefill behaviour for
//! server-rendered admin tables:
//! - `engine`: free-text query, multi-select filter dimensions, highlighting
//!   and the results summary
//! - `selection`: checkbox selection with a tri-state "select all"
//! - `bulk`: sequential bulk actions over HTTP with progress reporting
//! - `modal`: confirmation dialog prefill from trigger attributes
//! - `page`: wiring of the above per table, plus page-global bindings
//!
//! The binary entry point is in `main.rs`.

pub mod bulk;
pub mod config;
pub mod document;
pub mod engine;
pub mod events;
pub mod exit_codes;
pub mod logging;
pub mod modal;
pub mod page;
pub mod selection;
pub mod view;

pub use document::{Document, RowNode, TriggerNode};
pub use engine::{InitError, Segment, TableFilterEngine};
pub use modal::ModalPrefillBinder;
pub use page::{Binding, Page, TablePage};
pub use selection::BulkSelectionController;
pub use view::{NullView, RecordingView, TableView};
