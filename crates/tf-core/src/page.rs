//! Page composition.
//!
//! A [`TablePage`] wires the engine, the selection controller and the modal
//! binder of one table together: every mutation recomputes, then prunes the
//! selection, inside the same call. A component whose elements are missing
//! is disabled with a warning and its operations become no-ops.
//!
//! A [`Page`] holds several independent tables and the page-global reset
//! bindings (`clearSearch`, `clearAllFilters`). Each enabled table registers
//! them; the most recent registration wins.

use std::collections::BTreeMap;

use serde::Serialize;
use tf_common::RowId;
use tf_config::{TableConfig, Translations};

use crate::bulk::{BulkExecutor, BulkReport};
use crate::document::{Document, TriggerNode};
use crate::engine::{FilterMenu, InitError, ResultsSummary, TableFilterEngine};
use crate::logging::{event_names, generate_run_id, LogContext, Stage};
use crate::modal::{ModalPrefillBinder, Prefill};
use crate::selection::{BulkPreview, BulkSelectionController};
use crate::view::TableView;

/// One table with its optional extensions.
#[derive(Debug)]
pub struct TablePage {
    engine: Option<TableFilterEngine>,
    selection: Option<BulkSelectionController>,
    modal: Option<ModalPrefillBinder>,
    triggers: Vec<TriggerNode>,
    init_error: Option<InitError>,
    ctx: LogContext,
}

impl TablePage {
    /// Wire up a table. Never fails; missing elements disable features.
    pub fn initialize(config: &TableConfig, doc: &Document, translations: Translations) -> Self {
        let ctx = LogContext::new(generate_run_id()).with_table(&config.table);
        Self::initialize_with_context(config, doc, translations, ctx)
    }

    pub fn initialize_with_context(
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
        ctx: LogContext,
    ) -> Self {
        let (engine, init_error) = match TableFilterEngine::initialize_with_context(
            config,
            doc,
            translations.clone(),
            ctx.clone(),
        ) {
            Ok(engine) => (Some(engine), None),
            Err(err) => {
                disabled(&ctx, "search and filter", &err);
                (None, Some(err))
            }
        };

        let selection = match (&engine, &config.bulk) {
            (Some(_), Some(bulk)) => {
                match [&bulk.select_all, &bulk.bulk_button]
                    .into_iter()
                    .find(|id| !doc.has_element(id))
                {
                    Some(id) => {
                        let err = InitError::MissingElement { id: id.clone() };
                        disabled(&ctx, "bulk selection", &err);
                        None
                    }
                    None => Some(BulkSelectionController::new(bulk.clone(), ctx.clone())),
                }
            }
            _ => None,
        };

        let modal = match &config.modal {
            Some(modal) if doc.has_element(&modal.modal) => Some(ModalPrefillBinder::new(
                modal.clone(),
                translations,
                ctx.clone(),
            )),
            Some(modal) => {
                let err = InitError::MissingElement {
                    id: modal.modal.clone(),
                };
                disabled(&ctx, "confirmation dialog", &err);
                None
            }
            None => None,
        };

        TablePage {
            engine,
            selection,
            modal,
            triggers: doc.triggers.clone(),
            init_error,
            ctx,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    /// Why search and filter were disabled, if they were.
    pub fn init_error(&self) -> Option<&InitError> {
        self.init_error.as_ref()
    }

    pub fn table(&self) -> &str {
        self.ctx.table_label()
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    pub fn engine(&self) -> Option<&TableFilterEngine> {
        self.engine.as_ref()
    }

    pub fn selection(&self) -> Option<&BulkSelectionController> {
        self.selection.as_ref()
    }

    pub fn modal(&self) -> Option<&ModalPrefillBinder> {
        self.modal.as_ref()
    }

    /// Initial render: visibility, summary and selection controls.
    pub fn render(&mut self, view: &mut dyn TableView) {
        self.apply(view, |engine, view| engine.recompute(view));
    }

    pub fn on_query_changed(&mut self, text: &str, view: &mut dyn TableView) -> usize {
        self.apply(view, |engine, view| engine.on_query_changed(text, view))
    }

    pub fn on_filter_toggled(
        &mut self,
        dimension: &str,
        value: &str,
        is_active: bool,
        view: &mut dyn TableView,
    ) -> tf_common::Result<usize> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(0);
        };
        let visible = engine.on_filter_toggled(dimension, value, is_active, view)?;
        if let Some(selection) = self.selection.as_mut() {
            selection.prune_hidden(engine, view);
        }
        Ok(visible)
    }

    pub fn clear_all(&mut self, view: &mut dyn TableView) -> usize {
        self.apply(view, |engine, view| engine.clear_all(view))
    }

    pub fn clear_search(&mut self, view: &mut dyn TableView) -> usize {
        self.apply(view, |engine, view| engine.clear_search(view))
    }

    pub fn clear_all_filters(&mut self, view: &mut dyn TableView) -> usize {
        self.apply(view, |engine, view| engine.clear_all_filters(view))
    }

    pub fn on_search_icon_clicked(&mut self, view: &mut dyn TableView) {
        self.apply(view, |engine, view| {
            engine.on_search_icon_clicked(view);
            engine.visible_count()
        });
    }

    pub fn on_escape(&mut self, view: &mut dyn TableView) -> usize {
        self.apply(view, |engine, view| engine.on_escape(view))
    }

    fn apply<F>(&mut self, view: &mut dyn TableView, op: F) -> usize
    where
        F: FnOnce(&mut TableFilterEngine, &mut dyn TableView) -> usize,
    {
        let Some(engine) = self.engine.as_mut() else {
            return 0;
        };
        let visible = op(engine, view);
        if let Some(selection) = self.selection.as_mut() {
            selection.prune_hidden(engine, view);
        }
        visible
    }

    pub fn toggle_row(&mut self, id: &RowId, checked: bool, view: &mut dyn TableView) -> bool {
        match (&self.engine, self.selection.as_mut()) {
            (Some(engine), Some(selection)) => selection.toggle_row(engine, id, checked, view),
            _ => false,
        }
    }

    pub fn toggle_all_visible(&mut self, checked: bool, view: &mut dyn TableView) {
        if let (Some(engine), Some(selection)) = (&self.engine, self.selection.as_mut()) {
            selection.toggle_all_visible(engine, checked, view);
        }
    }

    pub fn confirmation_preview(&self) -> Option<BulkPreview> {
        match (&self.engine, &self.selection) {
            (Some(engine), Some(selection)) => Some(selection.confirmation_preview(engine)),
            _ => None,
        }
    }

    pub fn run_bulk_action(
        &mut self,
        executor: &BulkExecutor<'_>,
        view: &mut dyn TableView,
    ) -> Option<BulkReport> {
        match (self.engine.as_mut(), self.selection.as_mut()) {
            (Some(engine), Some(selection)) => selection.run_bulk_action(executor, engine, view),
            _ => None,
        }
    }

    pub fn run_bulk_action_with(
        &mut self,
        executor: &BulkExecutor<'_>,
        view: &mut dyn TableView,
        action_name: &str,
        endpoint_template: &str,
    ) -> Option<BulkReport> {
        match (self.engine.as_mut(), self.selection.as_mut()) {
            (Some(engine), Some(selection)) => selection.run_bulk_action_with(
                executor,
                engine,
                view,
                action_name,
                endpoint_template,
            ),
            _ => None,
        }
    }

    /// Open the confirmation dialog from the trigger with `trigger_id`.
    pub fn show_modal(&mut self, trigger_id: &str, view: &mut dyn TableView) -> Option<&Prefill> {
        let modal = self.modal.as_mut()?;
        let Some(trigger) = self.triggers.iter().find(|t| t.id == trigger_id) else {
            crate::log_event!(
                self.ctx,
                WARN,
                event_names::MODAL_PREFILLED,
                Stage::Modal,
                "unknown dialog trigger",
                trigger = trigger_id
            );
            return None;
        };
        Some(modal.show(trigger, view))
    }

    pub fn hide_modal(&mut self, view: &mut dyn TableView) {
        if let Some(modal) = self.modal.as_mut() {
            modal.hidden(view);
        }
    }

    pub fn filter_menu(&self) -> Option<FilterMenu> {
        self.engine.as_ref().map(TableFilterEngine::filter_menu)
    }

    pub fn summary(&self) -> Option<ResultsSummary> {
        self.engine.as_ref().map(TableFilterEngine::summary)
    }
}

fn disabled(ctx: &LogContext, feature: &str, err: &InitError) {
    crate::log_event!(
        ctx,
        WARN,
        event_names::ENGINE_DISABLED,
        Stage::Init,
        "feature disabled",
        feature = feature,
        reason = err.to_string().as_str()
    );
}

/// A page-global reset function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    ClearSearch,
    ClearAllFilters,
}

impl Binding {
    pub const ALL: [Binding; 2] = [Binding::ClearSearch, Binding::ClearAllFilters];

    /// Accepts both `clearSearch` and `clear_search` spellings.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "clearSearch" | "clear_search" => Some(Binding::ClearSearch),
            "clearAllFilters" | "clear_all_filters" => Some(Binding::ClearAllFilters),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Binding::ClearSearch => "clearSearch",
            Binding::ClearAllFilters => "clearAllFilters",
        }
    }
}

/// Every table on a page plus the global bindings.
#[derive(Debug)]
pub struct Page {
    tables: Vec<TablePage>,
    bindings: BTreeMap<Binding, usize>,
    ctx: LogContext,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Page {
            tables: Vec::new(),
            bindings: BTreeMap::new(),
            ctx: LogContext::new(generate_run_id()),
        }
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    /// Initialize a table sharing this page's run id, and register it.
    pub fn initialize_table(
        &mut self,
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
    ) -> usize {
        let ctx = LogContext::new(self.ctx.run_id.clone()).with_table(&config.table);
        self.add_table(TablePage::initialize_with_context(config, doc, translations, ctx))
    }

    /// Add a table; an enabled table takes over the global bindings.
    pub fn add_table(&mut self, table: TablePage) -> usize {
        let index = self.tables.len();
        if table.is_enabled() {
            for binding in Binding::ALL {
                match self.bindings.insert(binding, index) {
                    Some(previous) => crate::log_event!(
                        table.ctx,
                        WARN,
                        event_names::BINDING_REPLACED,
                        Stage::Init,
                        "global binding replaced",
                        binding = binding.name(),
                        previous_table = self.tables[previous].table()
                    ),
                    None => crate::log_event!(
                        table.ctx,
                        DEBUG,
                        event_names::BINDING_REGISTERED,
                        Stage::Init,
                        "global binding registered",
                        binding = binding.name()
                    ),
                }
            }
        }
        self.tables.push(table);
        index
    }

    pub fn tables(&self) -> &[TablePage] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> Option<&TablePage> {
        self.tables.get(index)
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut TablePage> {
        self.tables.get_mut(index)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&TablePage> {
        self.tables.iter().find(|t| t.table() == name)
    }

    /// Table currently bound to `binding`.
    pub fn bound_table(&self, binding: Binding) -> Option<usize> {
        self.bindings.get(&binding).copied()
    }

    /// Invoke a global binding by name. `None` when the name is unknown or unbound.
    pub fn invoke(&mut self, name: &str, view: &mut dyn TableView) -> Option<usize> {
        let binding = Binding::parse(name)?;
        let index = self.bound_table(binding)?;
        let table = self.tables.get_mut(index)?;
        Some(match binding {
            Binding::ClearSearch => table.clear_search(view),
            Binding::ClearAllFilters => table.clear_all_filters(view),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::NoopTransport;
    use crate::document::RowNode;
    use crate::view::{RecordingView, TriState};
    use std::time::Duration;

    fn doc() -> Document {
        Document::new()
            .with_elements([
                "searchInput",
                "rolesTableContainer",
                "noSearchResults",
                "searchResults",
                "selectAllCheckbox",
                "bulkDeleteBtn",
                "deleteRoleModal",
            ])
            .with_row(
                RowNode::new("1")
                    .with_cell(".searchable-rolename", "Admin")
                    .with_badge("Composite"),
            )
            .with_row(
                RowNode::new("2")
                    .with_cell(".searchable-rolename", "Viewer")
                    .with_badge("Simple"),
            )
            .with_trigger(
                TriggerNode::new("del-1")
                    .with_attr("data-role-id", "1")
                    .with_attr("data-rolename", "Admin"),
            )
    }

    #[test]
    fn missing_element_disables_without_panicking() {
        let mut d = doc();
        d.elements.remove("searchResults");
        let mut page = TablePage::initialize(&TableConfig::default(), &d, Translations::english());
        let mut view = RecordingView::new();
        assert!(!page.is_enabled());
        assert_eq!(page.on_query_changed("x", &mut view), 0);
        assert!(!page.toggle_row(&RowId::new("1"), true, &mut view));
        assert!(page.modal().is_some());
        assert_eq!(
            page.init_error(),
            Some(&InitError::MissingElement {
                id: "searchResults".into()
            })
        );
    }

    #[test]
    fn engine_logs_under_the_page_run() {
        let page = TablePage::initialize(&TableConfig::default(), &doc(), Translations::english());
        assert!(page.init_error().is_none());
        let engine = page.engine().unwrap();
        assert_eq!(engine.log_context().run_id, page.log_context().run_id);
        assert_eq!(
            page.selection().unwrap().log_context().run_id,
            page.log_context().run_id
        );
    }

    #[test]
    fn missing_bulk_elements_disable_only_selection() {
        let mut d = doc();
        d.elements.remove("bulkDeleteBtn");
        let page = TablePage::initialize(&TableConfig::default(), &d, Translations::english());
        assert!(page.is_enabled());
        assert!(page.selection().is_none());
    }

    #[test]
    fn filtering_prunes_selection() {
        let mut page = TablePage::initialize(&TableConfig::default(), &doc(), Translations::english());
        let mut view = RecordingView::new();
        page.render(&mut view);
        page.toggle_all_visible(true, &mut view);
        assert_eq!(view.select_all, TriState::Checked);
        page.on_filter_toggled("type", "Simple", true, &mut view).unwrap();
        let selection = page.selection().unwrap();
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&RowId::new("2")));
        assert_eq!(view.select_all, TriState::Checked);
    }

    #[test]
    fn bulk_run_through_page() {
        let mut page = TablePage::initialize(&TableConfig::default(), &doc(), Translations::english());
        let mut view = RecordingView::new();
        page.toggle_row(&RowId::new("1"), true, &mut view);
        let transport = NoopTransport;
        let exec = BulkExecutor::new(&transport).with_pause(Duration::ZERO);
        let report = page.run_bulk_action(&exec, &mut view).unwrap();
        assert_eq!(report.successes, 1);
        assert_eq!(page.engine().unwrap().total(), 1);
    }

    #[test]
    fn modal_show_by_trigger_id() {
        let mut page = TablePage::initialize(&TableConfig::default(), &doc(), Translations::english());
        let mut view = RecordingView::new();
        assert!(page.show_modal("nope", &mut view).is_none());
        let prefill = page.show_modal("del-1", &mut view).unwrap();
        assert_eq!(prefill.form_action.as_deref(), Some("/role/delete/1"));
        page.hide_modal(&mut view);
        assert!(!page.modal().unwrap().is_open());
    }

    #[test]
    fn last_registered_table_owns_bindings() {
        let mut page = Page::new();
        let roles = TableConfig::default();
        let mut users = TableConfig::default();
        users.table = "users".into();

        let first = page.initialize_table(&roles, &doc(), Translations::english());
        let second = page.initialize_table(&users, &doc(), Translations::english());
        assert_eq!(page.bound_table(Binding::ClearSearch), Some(second));

        let mut view = RecordingView::new();
        page.table_mut(first)
            .unwrap()
            .on_query_changed("admin", &mut view);
        page.table_mut(second)
            .unwrap()
            .on_query_changed("admin", &mut view);
        assert_eq!(page.invoke("clear_search", &mut view), Some(2));
        assert_eq!(page.table(first).unwrap().engine().unwrap().visible_count(), 1);
        assert!(page.invoke("reloadPage", &mut view).is_none());
    }

    #[test]
    fn disabled_table_does_not_take_bindings() {
        let mut page = Page::new();
        let first = page.initialize_table(&TableConfig::default(), &doc(), Translations::english());
        page.initialize_table(&TableConfig::default(), &Document::new(), Translations::english());
        assert_eq!(page.bound_table(Binding::ClearAllFilters), Some(first));
        assert_eq!(page.table_by_name("roles").map(TablePage::is_enabled), Some(true));
    }
}
