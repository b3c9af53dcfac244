//! Checkbox-driven row selection for bulk actions.
//!
//! The selection is always a subset of the rows the engine currently shows.
//! Hidden, removed and disabled rows cannot be selected, and rows that become
//! hidden after a recompute are dropped by [`BulkSelectionController::prune_hidden`].

use std::collections::HashSet;

use serde::Serialize;
use tf_common::RowId;
use tf_config::BulkConfig;

use crate::bulk::{BulkAction, BulkExecutor, BulkReport};
use crate::engine::TableFilterEngine;
use crate::logging::{event_names, LogContext, Stage};
use crate::view::{BulkButton, TableView, TriState};

/// One row listed in the bulk confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub id: RowId,
    pub name: String,
    pub description: String,
}

/// Contents of the bulk confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkPreview {
    pub count: usize,
    pub items: Vec<PreviewItem>,
}

/// Multi-select state and the bulk action entry point for one table.
#[derive(Debug)]
pub struct BulkSelectionController {
    config: BulkConfig,
    selected: HashSet<RowId>,
    in_flight: bool,
    ctx: LogContext,
}

impl BulkSelectionController {
    pub fn new(config: BulkConfig, ctx: LogContext) -> Self {
        BulkSelectionController {
            config,
            selected: HashSet::new(),
            in_flight: false,
            ctx,
        }
    }

    pub fn config(&self) -> &BulkConfig {
        &self.config
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Selected ids in table order.
    pub fn selected_ids(&self, engine: &TableFilterEngine) -> Vec<RowId> {
        engine
            .rows()
            .iter()
            .filter(|r| self.selected.contains(r.id()))
            .map(|r| r.id().clone())
            .collect()
    }

    /// Check or uncheck one row. Returns whether the request was applied.
    pub fn toggle_row(
        &mut self,
        engine: &TableFilterEngine,
        id: &RowId,
        checked: bool,
        view: &mut dyn TableView,
    ) -> bool {
        if checked {
            let reason = match engine.row(id) {
                None => Some("row not present"),
                Some(row) if !row.is_visible() => Some("row is hidden"),
                Some(row) if row.is_disabled() => Some("row is disabled"),
                Some(_) => None,
            };
            if let Some(reason) = reason {
                crate::log_event!(
                    self.ctx,
                    WARN,
                    event_names::SELECTION_REJECTED,
                    Stage::Select,
                    "row cannot be selected",
                    row_id = id.as_str(),
                    reason = reason
                );
                return false;
            }
            self.selected.insert(id.clone());
        } else {
            self.selected.remove(id);
        }

        view.set_row_selected(id, checked);
        crate::log_event!(
            self.ctx,
            DEBUG,
            event_names::SELECTION_CHANGED,
            Stage::Select,
            "row selection changed",
            row_id = id.as_str(),
            checked = checked,
            selected = self.selected.len() as u64
        );
        self.refresh(engine, view);
        true
    }

    /// Select or deselect every visible, enabled row.
    pub fn toggle_all_visible(
        &mut self,
        engine: &TableFilterEngine,
        checked: bool,
        view: &mut dyn TableView,
    ) {
        for row in engine.rows().iter().filter(|r| r.is_visible()) {
            if checked && row.is_disabled() {
                continue;
            }
            let changed = if checked {
                self.selected.insert(row.id().clone())
            } else {
                self.selected.remove(row.id())
            };
            if changed {
                view.set_row_selected(row.id(), checked);
            }
        }
        crate::log_event!(
            self.ctx,
            DEBUG,
            event_names::SELECTION_CHANGED,
            Stage::Select,
            "select all toggled",
            checked = checked,
            selected = self.selected.len() as u64
        );
        self.refresh(engine, view);
    }

    /// Tri-state of the "select all" checkbox against the visible, enabled rows.
    pub fn select_all_state(&self, engine: &TableFilterEngine) -> TriState {
        if self.selected.is_empty() {
            return TriState::Unchecked;
        }
        let selectable: Vec<&RowId> = engine
            .rows()
            .iter()
            .filter(|r| r.is_visible() && !r.is_disabled())
            .map(|r| r.id())
            .collect();
        let all = selectable.len() == self.selected.len()
            && selectable.iter().all(|id| self.selected.contains(*id));
        if all {
            TriState::Checked
        } else {
            TriState::Indeterminate
        }
    }

    /// Drop every selected row that is no longer visible. Returns how many.
    pub fn prune_hidden(&mut self, engine: &TableFilterEngine, view: &mut dyn TableView) -> usize {
        let hidden: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| !engine.is_visible(id))
            .cloned()
            .collect();
        for id in &hidden {
            self.selected.remove(id);
            view.set_row_selected(id, false);
        }
        if !hidden.is_empty() {
            crate::log_event!(
                self.ctx,
                DEBUG,
                event_names::SELECTION_PRUNED,
                Stage::Select,
                "hidden rows deselected",
                pruned = hidden.len() as u64,
                selected = self.selected.len() as u64
            );
        }
        self.refresh(engine, view);
        hidden.len()
    }

    /// Deselect everything.
    pub fn clear(&mut self, engine: &TableFilterEngine, view: &mut dyn TableView) {
        for id in self.selected.drain() {
            view.set_row_selected(&id, false);
        }
        self.refresh(engine, view);
    }

    /// Push select-all state, bulk button and selected count to the view.
    pub fn refresh(&self, engine: &TableFilterEngine, view: &mut dyn TableView) {
        view.set_select_all(self.select_all_state(engine));
        view.set_bulk_button(&self.bulk_button(engine));
        if let Some(counter) = &self.config.selected_count {
            view.set_text(counter, &self.selected.len().to_string());
        }
    }

    /// Bulk button: hidden while nothing is selected, e.g. "Delete 3 roles selected".
    pub fn bulk_button(&self, engine: &TableFilterEngine) -> BulkButton {
        let count = self.selected.len();
        let t = engine.translations();
        let noun = engine.noun();
        let noun_key = if count == 1 {
            &noun.singular
        } else {
            &noun.plural
        };
        BulkButton {
            visible: count > 0,
            count,
            title: format!(
                "{} {} {} {}",
                t.get(&self.config.action),
                count,
                t.get(noun_key),
                t.get("selected")
            ),
        }
    }

    /// Display name of a row, with the translated fallback.
    pub fn row_name(&self, engine: &TableFilterEngine, id: &RowId) -> String {
        engine
            .row(id)
            .and_then(|r| r.node().attr(&self.config.name_attribute))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| engine.translations().get("no_name"))
            .to_string()
    }

    /// Rows that the bulk confirmation dialog lists.
    pub fn confirmation_preview(&self, engine: &TableFilterEngine) -> BulkPreview {
        let items: Vec<PreviewItem> = self
            .selected_ids(engine)
            .into_iter()
            .map(|id| {
                let description = self
                    .config
                    .description_selector
                    .as_deref()
                    .and_then(|sel| engine.row(&id).and_then(|r| r.node().cell(sel)))
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| engine.translations().get("no_description"))
                    .to_string();
                PreviewItem {
                    name: self.row_name(engine, &id),
                    description,
                    id,
                }
            })
            .collect();
        BulkPreview {
            count: items.len(),
            items,
        }
    }

    /// The action and endpoint template from the table's bulk config.
    pub fn configured_action(&self) -> BulkAction {
        BulkAction::new(self.config.action.clone(), self.config.endpoint.clone())
    }

    /// Run the configured bulk action over the selection.
    ///
    /// Returns `None` when nothing is selected or a run is already in flight.
    pub fn run_bulk_action(
        &mut self,
        executor: &BulkExecutor<'_>,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
    ) -> Option<BulkReport> {
        executor.run(self, engine, view)
    }

    /// Run `action_name` against `endpoint_template` (an `{id}` path) instead
    /// of the configured action.
    pub fn run_bulk_action_with(
        &mut self,
        executor: &BulkExecutor<'_>,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
        action_name: &str,
        endpoint_template: &str,
    ) -> Option<BulkReport> {
        let action = BulkAction::new(action_name, endpoint_template);
        executor.run_with(action, self, engine, view)
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    pub(crate) fn deselect(&mut self, id: &RowId) -> bool {
        self.selected.remove(id)
    }
}
