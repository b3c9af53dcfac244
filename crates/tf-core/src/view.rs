//! Rendering seam between the engine and a UI layer.
//!
//! Every visual side effect the engine, the selection controller and the
//! modal binder produce goes through [`TableView`]. [`RecordingView`] keeps
//! the last rendered state in memory; the CLI prints it and tests assert on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tf_common::RowId;

use crate::engine::highlight::Segment;

/// State of the "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    #[default]
    Unchecked,
    Checked,
    Indeterminate,
}

/// Search affordance icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchIcon {
    #[default]
    Search,
    Clear,
}

/// Filter button label and active state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterButton {
    pub label: String,
    pub active_count: usize,
}

impl FilterButton {
    pub fn is_active(&self) -> bool {
        self.active_count > 0
    }
}

/// Bulk button state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BulkButton {
    pub visible: bool,
    pub count: usize,
    pub title: String,
}

/// Progress indicator for a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub completed: usize,
    pub total: usize,
    pub status: String,
}

impl ProgressView {
    /// Completion in whole percent.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// Receiver of every visual side effect.
///
/// All methods default to no-ops so a UI can implement only what it renders.
pub trait TableView {
    fn set_row_visible(&mut self, _row: &RowId, _visible: bool) {}
    fn render_cell(&mut self, _row: &RowId, _column: &str, _segments: &[Segment]) {}
    fn set_results_summary(&mut self, _text: &str) {}
    fn set_table_visible(&mut self, _visible: bool) {}
    /// Show or hide the no-results region; `term` is the searched text.
    fn set_no_results(&mut self, _visible: bool, _term: &str) {}
    fn set_filter_button(&mut self, _button: &FilterButton) {}
    fn set_search_icon(&mut self, _icon: SearchIcon, _title: &str) {}
    fn set_search_text(&mut self, _text: &str) {}
    fn focus_search(&mut self) {}
    fn set_filter_checked(&mut self, _option_id: &str, _checked: bool) {}

    fn set_row_selected(&mut self, _row: &RowId, _selected: bool) {}
    fn set_select_all(&mut self, _state: TriState) {}
    fn set_bulk_button(&mut self, _button: &BulkButton) {}
    fn set_progress(&mut self, _progress: Option<&ProgressView>) {}
    fn remove_row(&mut self, _row: &RowId) {}

    fn set_text(&mut self, _element: &str, _text: &str) {}
    fn set_form_action(&mut self, _form: &str, _action: Option<&str>) {}
}

/// A view that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl TableView for NullView {}

/// In-memory view holding the last rendered state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingView {
    pub row_visible: BTreeMap<RowId, bool>,
    pub cells: BTreeMap<RowId, BTreeMap<String, Vec<Segment>>>,
    pub results_summary: String,
    pub table_visible: bool,
    /// Searched term while the no-results region is shown.
    pub no_results: Option<String>,
    pub filter_button: FilterButton,
    pub filter_checked: BTreeMap<String, bool>,
    pub search_icon: SearchIcon,
    pub search_icon_title: String,
    pub search_text: String,
    pub focus_count: usize,
    pub selected: BTreeSet<RowId>,
    pub select_all: TriState,
    pub bulk_button: BulkButton,
    pub progress: Option<ProgressView>,
    /// Every progress update in order.
    pub progress_history: Vec<ProgressView>,
    pub removed: Vec<RowId>,
    pub texts: BTreeMap<String, String>,
    pub form_actions: BTreeMap<String, Option<String>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently displayed, in id order.
    pub fn visible_rows(&self) -> Vec<RowId> {
        self.row_visible
            .iter()
            .filter(|(_, v)| **v)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn segments(&self, row: &RowId, column: &str) -> Option<&[Segment]> {
        self.cells
            .get(row)
            .and_then(|cols| cols.get(column))
            .map(Vec::as_slice)
    }

    /// Whether any cell of the row currently shows a highlight.
    pub fn is_highlighted(&self, row: &RowId) -> bool {
        self.cells
            .get(row)
            .map(|cols| cols.values().flatten().any(|s| s.is_match))
            .unwrap_or(false)
    }

    pub fn text(&self, element: &str) -> Option<&str> {
        self.texts.get(element).map(String::as_str)
    }
}

impl TableView for RecordingView {
    fn set_row_visible(&mut self, row: &RowId, visible: bool) {
        self.row_visible.insert(row.clone(), visible);
    }

    fn render_cell(&mut self, row: &RowId, column: &str, segments: &[Segment]) {
        self.cells
            .entry(row.clone())
            .or_default()
            .insert(column.to_string(), segments.to_vec());
    }

    fn set_results_summary(&mut self, text: &str) {
        self.results_summary = text.to_string();
    }

    fn set_table_visible(&mut self, visible: bool) {
        self.table_visible = visible;
    }

    fn set_no_results(&mut self, visible: bool, term: &str) {
        self.no_results = visible.then(|| term.to_string());
    }

    fn set_filter_button(&mut self, button: &FilterButton) {
        self.filter_button = button.clone();
    }

    fn set_search_icon(&mut self, icon: SearchIcon, title: &str) {
        self.search_icon = icon;
        self.search_icon_title = title.to_string();
    }

    fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    fn focus_search(&mut self) {
        self.focus_count += 1;
    }

    fn set_filter_checked(&mut self, option_id: &str, checked: bool) {
        self.filter_checked.insert(option_id.to_string(), checked);
    }

    fn set_row_selected(&mut self, row: &RowId, selected: bool) {
        if selected {
            self.selected.insert(row.clone());
        } else {
            self.selected.remove(row);
        }
    }

    fn set_select_all(&mut self, state: TriState) {
        self.select_all = state;
    }

    fn set_bulk_button(&mut self, button: &BulkButton) {
        self.bulk_button = button.clone();
    }

    fn set_progress(&mut self, progress: Option<&ProgressView>) {
        if let Some(p) = progress {
            self.progress_history.push(p.clone());
        }
        self.progress = progress.cloned();
    }

    fn remove_row(&mut self, row: &RowId) {
        self.row_visible.remove(row);
        self.cells.remove(row);
        self.selected.remove(row);
        self.removed.push(row.clone());
    }

    fn set_text(&mut self, element: &str, text: &str) {
        self.texts.insert(element.to_string(), text.to_string());
    }

    fn set_form_action(&mut self, form: &str, action: Option<&str>) {
        self.form_actions
            .insert(form.to_string(), action.map(str::to_string));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_row_forgets_row_state() {
        let mut view = RecordingView::new();
        let id = RowId::new("1");
        view.set_row_visible(&id, true);
        view.set_row_selected(&id, true);
        view.render_cell(&id, "name", &[Segment::plain("Admin")]);
        view.remove_row(&id);
        assert!(view.visible_rows().is_empty());
        assert!(view.selected.is_empty());
        assert!(view.segments(&id, "name").is_none());
        assert_eq!(view.removed, vec![id]);
    }

    #[test]
    fn no_results_tracks_term() {
        let mut view = RecordingView::new();
        view.set_no_results(true, "zzz");
        assert_eq!(view.no_results.as_deref(), Some("zzz"));
        view.set_no_results(false, "");
        assert!(view.no_results.is_none());
    }

    #[test]
    fn progress_percent() {
        let p = ProgressView {
            completed: 1,
            total: 3,
            status: String::new(),
        };
        assert_eq!(p.percent(), 33);
        let empty = ProgressView {
            completed: 0,
            total: 0,
            status: String::new(),
        };
        assert_eq!(empty.percent(), 100);
    }
}
