//! Bulk actions over the selected rows.

pub mod executor;
pub mod transport;

pub use executor::{BulkAction, BulkExecutor, BulkReport, BulkRun, ItemOutcome, ItemStatus, DEFAULT_PAUSE};
pub use transport::{ActionTransport, HttpTransport, NoopTransport, StaticTransport, TransportError};

use tf_common::RowId;
use tf_config::validate::ID_PLACEHOLDER;

/// Substitute a row id into an endpoint template.
pub fn endpoint_for(template: &str, id: &RowId) -> String {
    template.replace(ID_PLACEHOLDER, id.as_str())
}
