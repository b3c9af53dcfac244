//! Table search and filter engine.
//!
//! [`TableFilterEngine`] owns the rows of one table, the free-text query and
//! the filter dimensions. Every mutation recomputes visibility for all rows
//! and renders the result through a [`TableView`] before returning.
//!
//! A row is visible iff the query is empty or its search blob contains the
//! query, and every dimension with active values accepts the row's values
//! under that dimension's combinator.

pub mod dimension;
pub mod highlight;
pub mod menu;
pub mod query;
pub mod summary;

use std::collections::BTreeMap;

use thiserror::Error;
use tf_common::RowId;
use tf_config::{ElementIds, NounKeys, SearchColumn, TableConfig, Translations};

use crate::document::{Document, RowNode};
use crate::logging::{event_names, generate_run_id, truncate_for_log, LogContext, Stage};
use crate::view::{FilterButton, SearchIcon, TableView};

pub use dimension::{FilterDimension, FnExtractor, ValueExtractor};
pub use highlight::{Highlighter, Segment};
pub use menu::{FilterMenu, MenuOption, MenuSection};
pub use query::SearchQuery;
pub use summary::ResultsSummary;

/// Why an engine could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("required element not found: {id}")]
    MissingElement { id: String },

    #[error("no searchable columns configured")]
    NoSearchColumns,
}

impl From<InitError> for tf_common::Error {
    fn from(err: InitError) -> Self {
        match err {
            InitError::MissingElement { id } => tf_common::Error::MissingElement { id },
            InitError::NoSearchColumns => {
                tf_common::Error::InvalidTableConfig(InitError::NoSearchColumns.to_string())
            }
        }
    }
}

/// A table row with its derived search data.
#[derive(Debug, Clone)]
pub struct Row {
    node: RowNode,
    blob: String,
    values: Vec<Vec<String>>,
    labels: Vec<Vec<String>>,
    visible: bool,
}

impl Row {
    pub fn id(&self) -> &RowId {
        &self.node.id
    }

    /// The row as rendered; never modified by the engine.
    pub fn node(&self) -> &RowNode {
        &self.node
    }

    /// Lowercase search blob.
    pub fn blob(&self) -> &str {
        &self.blob
    }

    /// Categorical values for the dimension at `index`.
    pub fn values(&self, index: usize) -> &[String] {
        self.values.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_disabled(&self) -> bool {
        self.node.disabled
    }
}

/// Search and filter state for one table.
pub struct TableFilterEngine {
    table: String,
    elements: ElementIds,
    columns: Vec<SearchColumn>,
    noun: NounKeys,
    dimensions: Vec<FilterDimension>,
    rows: Vec<Row>,
    query: SearchQuery,
    highlighter: Highlighter,
    translations: Translations,
    ctx: LogContext,
}

impl std::fmt::Debug for TableFilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableFilterEngine")
            .field("table", &self.table)
            .field("rows", &self.rows.len())
            .field("query", &self.query.normalized())
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl TableFilterEngine {
    /// Build the engine from config and the rendered document.
    ///
    /// Fails when a required element (search input, table container,
    /// no-results region, results summary) is absent.
    pub fn initialize(
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
    ) -> Result<Self, InitError> {
        let ctx = LogContext::new(generate_run_id()).with_table(&config.table);
        Self::initialize_with_context(config, doc, translations, ctx)
    }

    /// Like [`initialize`](Self::initialize), logging under an existing run.
    pub fn initialize_with_context(
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
        ctx: LogContext,
    ) -> Result<Self, InitError> {
        let dimensions = config
            .filters
            .iter()
            .map(FilterDimension::from_config)
            .collect();
        Self::build(config, doc, translations, dimensions, ctx)
    }

    /// Like [`initialize`](Self::initialize) with caller-built dimensions.
    pub fn with_dimensions(
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
        dimensions: Vec<FilterDimension>,
    ) -> Result<Self, InitError> {
        let ctx = LogContext::new(generate_run_id()).with_table(&config.table);
        Self::build(config, doc, translations, dimensions, ctx)
    }

    fn build(
        config: &TableConfig,
        doc: &Document,
        translations: Translations,
        mut dimensions: Vec<FilterDimension>,
        ctx: LogContext,
    ) -> Result<Self, InitError> {
        let elements = &config.elements;
        for id in [
            &elements.search_input,
            &elements.table_container,
            &elements.no_results,
            &elements.results_summary,
        ] {
            if !doc.has_element(id) {
                return Err(InitError::MissingElement { id: id.clone() });
            }
        }
        if config.search_columns.is_empty() {
            return Err(InitError::NoSearchColumns);
        }

        let rows: Vec<Row> = doc
            .rows
            .iter()
            .map(|node| build_row(node, &config.search_columns, &dimensions))
            .collect();
        for (i, dim) in dimensions.iter_mut().enumerate() {
            for row in &rows {
                for value in &row.values[i] {
                    dim.register_value(value);
                }
            }
        }

        let engine = TableFilterEngine {
            table: config.table.clone(),
            elements: elements.clone(),
            columns: config.search_columns.clone(),
            noun: config.noun.clone(),
            dimensions,
            rows,
            query: SearchQuery::default(),
            highlighter: Highlighter::new(""),
            translations,
            ctx,
        };

        crate::log_event!(
            engine.ctx,
            INFO,
            event_names::ENGINE_INITIALIZED,
            Stage::Init,
            "table filter engine ready",
            rows = engine.rows.len() as u64,
            dimensions = engine.dimensions.len() as u64
        );
        Ok(engine)
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Replace the query text and recompute. Returns the visible count.
    pub fn on_query_changed(&mut self, text: &str, view: &mut dyn TableView) -> usize {
        self.query = SearchQuery::new(text);
        self.highlighter = Highlighter::new(self.query.trimmed());
        self.recompute(view)
    }

    /// Activate or deactivate one value of a dimension and recompute.
    ///
    /// An unknown dimension leaves all state untouched.
    pub fn on_filter_toggled(
        &mut self,
        dimension: &str,
        value: &str,
        is_active: bool,
        view: &mut dyn TableView,
    ) -> tf_common::Result<usize> {
        let Some(dim) = self.dimensions.iter_mut().find(|d| d.name == dimension) else {
            crate::log_event!(
                self.ctx,
                WARN,
                event_names::FILTER_UNKNOWN_DIMENSION,
                Stage::Filter,
                "filter toggled on unknown dimension",
                dimension = dimension
            );
            return Err(tf_common::Error::UnknownDimension {
                name: dimension.to_string(),
            });
        };

        let changed = dim.set_value(value, is_active);
        let option_id = dim.register_value(value);
        view.set_filter_checked(&option_id, is_active);
        crate::log_event!(
            self.ctx,
            DEBUG,
            event_names::FILTER_TOGGLED,
            Stage::Filter,
            "filter toggled",
            dimension = dimension,
            value = value,
            active = is_active,
            changed = changed
        );
        Ok(self.recompute(view))
    }

    /// Empty the query and every filter, recompute, focus the search input.
    pub fn clear_all(&mut self, view: &mut dyn TableView) -> usize {
        self.reset_query(view);
        self.reset_filters(view);
        let visible = self.recompute(view);
        view.focus_search();
        visible
    }

    /// Empty the query only, recompute, focus the search input.
    pub fn clear_search(&mut self, view: &mut dyn TableView) -> usize {
        self.reset_query(view);
        crate::log_event!(
            self.ctx,
            DEBUG,
            event_names::SEARCH_CLEARED,
            Stage::Filter,
            "search cleared"
        );
        let visible = self.recompute(view);
        view.focus_search();
        visible
    }

    /// Empty every filter, keep the query, recompute.
    pub fn clear_all_filters(&mut self, view: &mut dyn TableView) -> usize {
        self.reset_filters(view);
        self.recompute(view)
    }

    /// Search icon click: clears a non-empty search, otherwise focuses the input.
    pub fn on_search_icon_clicked(&mut self, view: &mut dyn TableView) {
        if self.query.is_empty() {
            view.focus_search();
        } else {
            self.clear_search(view);
        }
    }

    /// Escape in the search input clears the search.
    pub fn on_escape(&mut self, view: &mut dyn TableView) -> usize {
        self.clear_search(view)
    }

    fn reset_query(&mut self, view: &mut dyn TableView) {
        self.query = SearchQuery::default();
        self.highlighter = Highlighter::new("");
        view.set_search_text("");
    }

    fn reset_filters(&mut self, view: &mut dyn TableView) {
        for dim in &mut self.dimensions {
            for value in dim.active().iter() {
                view.set_filter_checked(&dim.option_id(value), false);
            }
            dim.clear();
        }
    }

    /// Recompute visibility of every row and render. Returns the visible count.
    pub fn recompute(&mut self, view: &mut dyn TableView) -> usize {
        let mut visible = 0;
        for i in 0..self.rows.len() {
            let matches = self.row_matches(&self.rows[i]);
            self.rows[i].visible = matches;
            if matches {
                visible += 1;
            }
        }

        crate::log_event!(
            self.ctx,
            DEBUG,
            event_names::ENGINE_RECOMPUTED,
            Stage::Filter,
            "visibility recomputed",
            query = truncate_for_log(self.query.normalized(), 64).as_str(),
            visible = visible as u64,
            total = self.rows.len() as u64
        );

        self.render(view);
        visible
    }

    /// Whether a row passes the current query and filters.
    pub fn row_matches(&self, row: &Row) -> bool {
        self.query.matches(&row.blob)
            && self
                .dimensions
                .iter()
                .enumerate()
                .all(|(i, dim)| dim.matches(row.values(i)))
    }

    /// Push the current state to the view.
    pub fn render(&self, view: &mut dyn TableView) {
        for row in &self.rows {
            view.set_row_visible(row.id(), row.visible);
            for column in &self.columns {
                let segments = self.cell_segments(row, column);
                view.render_cell(row.id(), &column.key, &segments);
            }
        }

        let summary = self.summary();
        view.set_results_summary(&summary.text);
        view.set_table_visible(!summary.no_results);
        view.set_no_results(summary.no_results, self.query.trimmed());

        if self.elements.filter_button.is_some() {
            view.set_filter_button(&self.filter_button());
        }
        if self.elements.search_icon.is_some() {
            let (icon, title) = self.search_icon();
            view.set_search_icon(icon, title);
        }
    }

    /// Segments for one cell; only visible rows are highlighted.
    pub fn cell_segments(&self, row: &Row, column: &SearchColumn) -> Vec<Segment> {
        let text = row.node.cell(&column.selector).unwrap_or("");
        if let Some(placeholder) = &column.placeholder {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return vec![Segment::plain(placeholder.as_str())];
            }
            if trimmed == placeholder {
                return vec![Segment::plain(text)];
            }
        }
        if row.visible && column.highlight {
            self.highlighter.segments(text)
        } else {
            vec![Segment::plain(text)]
        }
    }

    /// Remove a row after a successful server-side delete.
    ///
    /// Does not recompute; callers recompute once after a batch of removals.
    pub fn remove_row(&mut self, id: &RowId, view: &mut dyn TableView) -> Option<RowNode> {
        let index = self.rows.iter().position(|r| r.id() == id)?;
        let row = self.rows.remove(index);
        view.remove_row(id);
        Some(row.node)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn elements(&self) -> &ElementIds {
        &self.elements
    }

    pub fn columns(&self) -> &[SearchColumn] {
        &self.columns
    }

    pub fn noun(&self) -> &NounKeys {
        &self.noun
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn dimensions(&self) -> &[FilterDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&FilterDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn is_visible(&self, id: &RowId) -> bool {
        self.row(id).map(Row::is_visible).unwrap_or(false)
    }

    /// Visible row ids in table order.
    pub fn visible_ids(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|r| r.visible)
            .map(|r| r.id().clone())
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.rows.iter().filter(|r| r.visible).count()
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn has_active_filters(&self) -> bool {
        self.dimensions.iter().any(FilterDimension::is_active)
    }

    /// Active values summed over all dimensions.
    pub fn active_filter_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.active().len()).sum()
    }

    pub fn summary(&self) -> ResultsSummary {
        summary::summarize(
            summary::SummaryInput {
                visible: self.visible_count(),
                total: self.rows.len(),
                has_query: !self.query.is_empty(),
                has_filters: self.has_active_filters(),
                noun: &self.noun,
            },
            &self.translations,
        )
    }

    /// Filter button label: "Filters", or "Filters (n)" with n active values.
    pub fn filter_button(&self) -> FilterButton {
        let count = self.active_filter_count();
        let base = self.translations.get("filters");
        let label = if count > 0 {
            format!("{} ({})", base, count)
        } else {
            base.to_string()
        };
        FilterButton {
            label,
            active_count: count,
        }
    }

    pub fn search_icon(&self) -> (SearchIcon, &str) {
        if self.query.is_empty() {
            (SearchIcon::Search, self.translations.get("search"))
        } else {
            (SearchIcon::Clear, self.translations.get("clear_search"))
        }
    }

    /// Distinct values per dimension, labelled, sorted and with checked state.
    ///
    /// Active values no longer present in any row are kept with a zero count
    /// so they can still be unchecked.
    pub fn filter_menu(&self) -> FilterMenu {
        let sections = self
            .dimensions
            .iter()
            .enumerate()
            .map(|(i, dim)| {
                let mut found: BTreeMap<&str, (&str, usize)> = BTreeMap::new();
                for row in &self.rows {
                    for (value, label) in row.values(i).iter().zip(&row.labels[i]) {
                        found
                            .entry(value.as_str())
                            .or_insert((label.as_str(), 0))
                            .1 += 1;
                    }
                }
                for value in dim.active() {
                    found.entry(value.as_str()).or_insert((value.as_str(), 0));
                }

                let mut options: Vec<MenuOption> = found
                    .into_iter()
                    .map(|(value, (label, count))| MenuOption {
                        value: value.to_string(),
                        label: label.to_string(),
                        option_id: dim.option_id(value),
                        checked: dim.active().contains(value),
                        count,
                    })
                    .collect();
                menu::sort_options(&mut options);

                MenuSection {
                    dimension: dim.name.clone(),
                    label: dim.label.clone(),
                    combinator: dim.combinator.to_string(),
                    options,
                }
            })
            .collect();
        FilterMenu { sections }
    }
}

fn build_row(node: &RowNode, columns: &[SearchColumn], dimensions: &[FilterDimension]) -> Row {
    let blob = match &node.search {
        Some(search) => search.to_lowercase(),
        None => query::build_blob(columns.iter().filter_map(|c| {
            let text = node.cell(&c.selector)?.trim();
            match &c.placeholder {
                Some(p) if p == text => None,
                _ => Some(text),
            }
        })),
    };

    let mut values = Vec::with_capacity(dimensions.len());
    let mut labels = Vec::with_capacity(dimensions.len());
    for dim in dimensions {
        let v = dim.values(node);
        labels.push(dim.labels(node, &v));
        values.push(v);
    }

    Row {
        node: node.clone(),
        blob,
        values,
        labels,
        visible: true,
    }
}
