//! Results summary text.

use serde::Serialize;
use tf_config::{NounKeys, Translations};

/// What the results-summary region and no-results placeholder show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    pub visible: usize,
    pub total: usize,
    /// Summary text; empty while the no-results placeholder is shown.
    pub text: String,
    pub no_results: bool,
}

/// Inputs to the summary wording.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub visible: usize,
    pub total: usize,
    pub has_query: bool,
    pub has_filters: bool,
    pub noun: &'a NounKeys,
}

/// Build the summary.
///
/// - nothing active: "Total: N roles"
/// - something active, rows visible: "Showing v of N roles", plus
///   " (filtered)" when only filters are active or " (search + filters)"
///   when both are
/// - something active, nothing visible: empty text, no-results shown
pub fn summarize(input: SummaryInput<'_>, t: &Translations) -> ResultsSummary {
    let SummaryInput {
        visible,
        total,
        has_query,
        has_filters,
        noun,
    } = input;

    if !has_query && !has_filters {
        return ResultsSummary {
            visible,
            total,
            text: format!("{}: {} {}", t.get("total"), total, t.get(&noun.plural)),
            no_results: false,
        };
    }

    if visible == 0 {
        return ResultsSummary {
            visible,
            total,
            text: String::new(),
            no_results: true,
        };
    }

    let noun_key = if visible == 1 { &noun.singular } else { &noun.plural };
    let mut text = format!(
        "{} {} {} {} {}",
        t.get("showing"),
        visible,
        t.get("of"),
        total,
        t.get(noun_key)
    );
    if has_filters {
        let suffix = if has_query {
            t.get("search_and_filters")
        } else {
            t.get("filtered")
        };
        text.push_str(&format!(" ({})", suffix));
    }

    ResultsSummary {
        visible,
        total,
        text,
        no_results: false,
    }
}
