//! Row identity types.
//!
//! A row is identified by the opaque string the server rendered into its
//! checkbox value / `data-*-id` attribute (usually a UUID, sometimes numeric).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    /// Create a row id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a row id, rejecting values that cannot be placed in a URL path
    /// segment (empty, or containing `/`, `?`, `#` or whitespace).
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        if s
            .chars()
            .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace())
        {
            return None;
        }
        Some(RowId(s.to_string()))
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        RowId(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        RowId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_uuid_and_numeric() {
        assert!(RowId::parse("0b6a2f9e-3c1d-4f5e-9a7b-1c2d3e4f5a6b").is_some());
        assert!(RowId::parse("42").is_some());
    }

    #[test]
    fn parse_rejects_path_breaking_values() {
        assert!(RowId::parse("").is_none());
        assert!(RowId::parse("a/b").is_none());
        assert!(RowId::parse("a b").is_none());
        assert!(RowId::parse("x?y").is_none());
    }

    #[test]
    fn serializes_transparently() {
        let id = RowId::new("7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
        let back: RowId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(back, id);
    }
}
