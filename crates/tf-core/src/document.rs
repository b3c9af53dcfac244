//! Snapshot of a rendered table page.
//!
//! A [`Document`] is what the engine reads at initialization: which element
//! ids exist on the page, the table rows with their cells, data attributes
//! and badges, and the trigger controls that open confirmation dialogs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tf_common::{Error, Result, RowId};

/// A rendered page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Ids of the elements present on the page.
    #[serde(default)]
    pub elements: BTreeSet<String>,

    /// Table rows in display order.
    #[serde(default)]
    pub rows: Vec<RowNode>,

    /// Controls that carry data attributes for a dialog (e.g. delete buttons).
    #[serde(default)]
    pub triggers: Vec<TriggerNode>,
}

/// One rendered table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowNode {
    pub id: RowId,

    /// Precomputed search blob (`data-search`).
    #[serde(default)]
    pub search: Option<String>,

    /// Cell text keyed by selector (e.g. ".searchable-rolename").
    #[serde(default)]
    pub cells: BTreeMap<String, String>,

    /// Data attributes keyed by full name (e.g. "data-rolename").
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,

    /// Badge texts in display order.
    #[serde(default)]
    pub badges: Vec<String>,

    /// Whether the row checkbox is disabled.
    #[serde(default)]
    pub disabled: bool,
}

/// A control that opens a dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerNode {
    pub id: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl RowNode {
    pub fn new(id: impl Into<RowId>) -> Self {
        RowNode {
            id: id.into(),
            search: None,
            cells: BTreeMap::new(),
            attrs: BTreeMap::new(),
            badges: Vec::new(),
            disabled: false,
        }
    }

    pub fn with_cell(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.cells.insert(selector.into(), text.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_badge(mut self, text: impl Into<String>) -> Self {
        self.badges.push(text.into());
        self
    }

    pub fn with_search(mut self, blob: impl Into<String>) -> Self {
        self.search = Some(blob.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn cell(&self, selector: &str) -> Option<&str> {
        self.cells.get(selector).map(String::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

impl TriggerNode {
    pub fn new(id: impl Into<String>) -> Self {
        TriggerNode {
            id: id.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.elements.insert(id.into());
        self
    }

    pub fn with_elements<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_row(mut self, row: RowNode) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerNode) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    pub fn row(&self, id: &RowId) -> Option<&RowNode> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn trigger(&self, id: &str) -> Option<&TriggerNode> {
        self.triggers.iter().find(|t| t.id == id)
    }

    /// Parse a document snapshot, rejecting duplicate row ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Document = serde_json::from_str(json)?;
        doc.check_unique_rows()?;
        Ok(doc)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn check_unique_rows(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for row in &self.rows {
            if !seen.insert(&row.id) {
                return Err(Error::Document(format!("duplicate row id {}", row.id)));
            }
        }
        Ok(())
    }
}
