//! Free-text search query.

/// The current search text.
///
/// Leading and trailing whitespace is trimmed; internal whitespace is kept.
/// Matching is a case-insensitive substring test against a row's search blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    normalized: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        SearchQuery {
            raw: text.to_string(),
            normalized: text.trim().to_lowercase(),
        }
    }

    /// Text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed text, original case.
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    /// Trimmed, lowercased text used for matching.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Whether a lowercase search blob satisfies the query.
    pub fn matches(&self, blob: &str) -> bool {
        self.is_empty() || blob.contains(&self.normalized)
    }
}

/// Build a row's lowercase search blob from its searchable texts.
pub fn build_blob<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_ends_and_lowercases() {
        let q = SearchQuery::new("  Super Admin ");
        assert_eq!(q.normalized(), "super admin");
        assert_eq!(q.trimmed(), "Super Admin");
        assert_eq!(q.raw(), "  Super Admin ");
    }

    #[test]
    fn whitespace_only_is_empty() {
        let q = SearchQuery::new("   ");
        assert!(q.is_empty());
        assert!(q.matches("anything"));
    }

    #[test]
    fn internal_whitespace_is_significant() {
        let q = SearchQuery::new("super  admin");
        assert!(!q.matches("super admin"));
        assert!(q.matches("the super  admin role"));
    }

    #[test]
    fn blob_skips_empty_parts() {
        assert_eq!(build_blob(["Admin", "", "Full Access"]), "admin full access");
    }
}
