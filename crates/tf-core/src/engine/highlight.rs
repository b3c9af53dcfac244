//! Match highlighting as text segments.
//!
//! A cell is rendered as a list of [`Segment`]s; concatenating their text
//! always yields the original cell text, so clearing a highlight is just
//! rendering the single plain segment again.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// A run of cell text, marked when it matches the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            is_match: false,
        }
    }

    pub fn matched(text: impl Into<String>) -> Self {
        Segment {
            text: text.into(),
            is_match: true,
        }
    }
}

/// Concatenate segment text.
pub fn join_segments(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Case-insensitive matcher for one query.
///
/// The query is escaped, so characters like `(` or `*` match literally.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a highlighter; an empty query never matches.
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            return Highlighter { pattern: None };
        }
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build();
        match pattern {
            Ok(re) => Highlighter { pattern: Some(re) },
            Err(err) => {
                tracing::debug!(error = %err, "query too large to highlight");
                Highlighter { pattern: None }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Split `text` into matched and unmatched segments.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let Some(re) = &self.pattern else {
            return vec![Segment::plain(text)];
        };

        let mut out = Vec::new();
        let mut last = 0;
        for m in re.find_iter(text) {
            if m.start() > last {
                out.push(Segment::plain(&text[last..m.start()]));
            }
            out.push(Segment::matched(m.as_str()));
            last = m.end();
        }
        if last < text.len() || out.is_empty() {
            out.push(Segment::plain(&text[last..]));
        }
        out
    }
}
