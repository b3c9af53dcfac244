//! Filter menu generation.
//!
//! The menu lists, per dimension, every distinct value found in the table,
//! labelled and sorted for display, with the current checked state.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// One checkbox in the filter menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    pub value: String,
    pub label: String,
    /// Stable element id for the checkbox.
    pub option_id: String,
    pub checked: bool,
    /// Rows carrying this value.
    pub count: usize,
}

/// Menu block for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub dimension: String,
    pub label: String,
    pub combinator: String,
    pub options: Vec<MenuOption>,
}

/// The whole filter menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterMenu {
    pub sections: Vec<MenuSection>,
}

impl FilterMenu {
    pub fn section(&self, dimension: &str) -> Option<&MenuSection> {
        self.sections.iter().find(|s| s.dimension == dimension)
    }

    pub fn option_count(&self) -> usize {
        self.sections.iter().map(|s| s.options.len()).sum()
    }
}

/// Base element id for a filter checkbox: whitespace runs become `-`.
pub fn option_id(dimension: &str, value: &str) -> String {
    let slug = value.split_whitespace().collect::<Vec<_>>().join("-");
    format!("filter-{}-{}", dimension, slug)
}

/// Checkbox ids of one dimension, unique within it and stable once assigned.
///
/// Values whose base ids collide get a numeric suffix in assignment order
/// (`filter-role-Super-Admin`, `filter-role-Super-Admin-2`).
#[derive(Debug, Clone, Default)]
pub struct OptionIds {
    dimension: String,
    by_value: BTreeMap<String, String>,
    taken: BTreeSet<String>,
}

impl OptionIds {
    pub fn new(dimension: impl Into<String>) -> Self {
        OptionIds {
            dimension: dimension.into(),
            ..Default::default()
        }
    }

    /// Id of `value`, assigning a fresh one on first sight.
    pub fn assign(&mut self, value: &str) -> String {
        if let Some(id) = self.by_value.get(value) {
            return id.clone();
        }
        let base = option_id(&self.dimension, value);
        let mut id = base.clone();
        let mut n = 2;
        while self.taken.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.taken.insert(id.clone());
        self.by_value.insert(value.to_string(), id.clone());
        id
    }

    pub fn get(&self, value: &str) -> Option<&str> {
        self.by_value.get(value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}

/// Sort options by label, case-insensitively, then by value.
pub(crate) fn sort_options(options: &mut [MenuOption]) {
    options.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });
}
