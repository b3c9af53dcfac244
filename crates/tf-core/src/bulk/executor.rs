//! Sequential bulk action execution.
//!
//! One request per selected row, in table order, each awaited before a fixed
//! pause and the next. A failed item is logged and counted; the queue always
//! runs to the end.

use std::time::{Duration, Instant};

use serde::Serialize;
use tf_common::RowId;

use crate::bulk::endpoint_for;
use crate::bulk::transport::ActionTransport;
use crate::engine::TableFilterEngine;
use crate::events::{self, NoopEmitter, Phase, ProgressEmitter, ProgressEvent};
use crate::logging::{event_names, Stage};
use crate::selection::BulkSelectionController;
use crate::view::{ProgressView, TableView};

/// Default pause between two requests.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(200);

/// Status of a single item.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// Per-item result with timing and details.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub id: RowId,
    pub name: String,
    pub path: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub time_ms: u64,
}

/// Full result of a bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub action: String,
    pub attempted: usize,
    pub successes: usize,
    pub errors: usize,
    pub outcomes: Vec<ItemOutcome>,
    /// Translated completion message.
    pub message: String,
    pub elapsed_ms: u64,
}

impl BulkReport {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// The action a run performs: a name for reports and an endpoint template
/// with an `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAction {
    pub name: String,
    pub endpoint: String,
}

impl BulkAction {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        BulkAction {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// A run in progress: the snapshot of ids taken when it began.
#[derive(Debug)]
pub struct BulkRun {
    action: BulkAction,
    items: Vec<(RowId, String)>,
    next: usize,
    outcomes: Vec<ItemOutcome>,
    started: Instant,
}

impl BulkRun {
    pub fn action(&self) -> &BulkAction {
        &self.action
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn completed(&self) -> usize {
        self.next
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.items.len()
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }
}

/// Drives bulk runs through a transport.
pub struct BulkExecutor<'a> {
    transport: &'a dyn ActionTransport,
    emitter: &'a dyn ProgressEmitter,
    pause: Duration,
}

impl<'a> BulkExecutor<'a> {
    pub fn new(transport: &'a dyn ActionTransport) -> Self {
        BulkExecutor {
            transport,
            emitter: &NoopEmitter,
            pause: DEFAULT_PAUSE,
        }
    }

    pub fn with_emitter(mut self, emitter: &'a dyn ProgressEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Run the action configured on the selection's bulk table.
    pub fn run(
        &self,
        selection: &mut BulkSelectionController,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
    ) -> Option<BulkReport> {
        let action = selection.configured_action();
        self.run_with(action, selection, engine, view)
    }

    /// Begin, step through every item with the pause between requests, finish.
    pub fn run_with(
        &self,
        action: BulkAction,
        selection: &mut BulkSelectionController,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
    ) -> Option<BulkReport> {
        let mut run = self.begin_with(action, selection, engine, view)?;
        while !run.is_done() {
            self.step(&mut run, selection, engine, view);
            if !run.is_done() && !self.pause.is_zero() {
                std::thread::sleep(self.pause);
            }
        }
        Some(self.finish(run, selection, engine, view))
    }

    /// Start a run of the configured action over the current selection.
    pub fn begin(
        &self,
        selection: &mut BulkSelectionController,
        engine: &TableFilterEngine,
        view: &mut dyn TableView,
    ) -> Option<BulkRun> {
        let action = selection.configured_action();
        self.begin_with(action, selection, engine, view)
    }

    /// Start a run of `action` over the current selection.
    ///
    /// Returns `None` while another run is in flight or when nothing is selected.
    pub fn begin_with(
        &self,
        action: BulkAction,
        selection: &mut BulkSelectionController,
        engine: &TableFilterEngine,
        view: &mut dyn TableView,
    ) -> Option<BulkRun> {
        let ctx = selection.log_context().clone();
        if selection.is_in_flight() {
            crate::log_event!(
                ctx,
                WARN,
                event_names::BULK_BUSY,
                Stage::Bulk,
                "bulk action already running"
            );
            return None;
        }
        let ids = selection.selected_ids(engine);
        if ids.is_empty() {
            return None;
        }

        let items: Vec<(RowId, String)> = ids
            .into_iter()
            .map(|id| {
                let name = selection.row_name(engine, &id);
                (id, name)
            })
            .collect();
        selection.set_in_flight(true);

        let total = items.len();
        crate::log_event!(
            ctx,
            INFO,
            event_names::BULK_STARTED,
            Stage::Bulk,
            "bulk action started",
            action = action.name.as_str(),
            endpoint = action.endpoint.as_str(),
            total = total as u64
        );
        self.emitter.emit(
            ProgressEvent::new(events::event_names::BULK_STARTED, Phase::Bulk)
                .with_run_id(&ctx.run_id)
                .with_progress(0, Some(total as u64))
                .with_detail("action", &action.name),
        );
        view.set_progress(Some(&ProgressView {
            completed: 0,
            total,
            status: format!("{}...", engine.translations().get("processing")),
        }));

        Some(BulkRun {
            action,
            items,
            next: 0,
            outcomes: Vec::with_capacity(total),
            started: Instant::now(),
        })
    }

    /// Process the next item. Returns whether items remain.
    pub fn step(
        &self,
        run: &mut BulkRun,
        selection: &mut BulkSelectionController,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
    ) -> bool {
        let Some((id, name)) = run.items.get(run.next).cloned() else {
            return false;
        };
        let total = run.items.len();
        let ctx = selection.log_context().clone();
        let path = endpoint_for(&run.action.endpoint, &id);

        view.set_progress(Some(&ProgressView {
            completed: run.next,
            total,
            status: format!("{} {}...", engine.translations().get("deleting"), name),
        }));

        let start = Instant::now();
        let result = self.transport.send(&path);
        let time_ms = start.elapsed().as_millis() as u64;

        let (status, http_status, error) = match result {
            Ok(code) if (200..300).contains(&code) => (ItemStatus::Success, Some(code), None),
            Ok(code) => {
                let err = tf_common::Error::RequestFailed {
                    id: id.to_string(),
                    status: code,
                };
                (ItemStatus::Failed, Some(code), Some(err.to_string()))
            }
            Err(err) => (ItemStatus::Failed, None, Some(err.to_string())),
        };

        match status {
            ItemStatus::Success => {
                engine.remove_row(&id, view);
                selection.deselect(&id);
                crate::log_event!(
                    ctx,
                    DEBUG,
                    event_names::BULK_ITEM_DONE,
                    Stage::Bulk,
                    "bulk item done",
                    row_id = id.as_str(),
                    path = path.as_str()
                );
                self.emitter.emit(
                    ProgressEvent::new(events::event_names::BULK_PROGRESS, Phase::Bulk)
                        .with_run_id(&ctx.run_id)
                        .with_progress(run.next as u64 + 1, Some(total as u64))
                        .with_detail("row_id", &id)
                        .with_detail("status", "success"),
                );
            }
            ItemStatus::Failed => {
                let message = error.clone().unwrap_or_default();
                crate::log_event!(
                    ctx,
                    WARN,
                    event_names::BULK_ITEM_FAILED,
                    Stage::Bulk,
                    "bulk item failed",
                    row_id = id.as_str(),
                    path = path.as_str(),
                    error = message.as_str()
                );
                self.emitter.emit(
                    ProgressEvent::new(events::event_names::BULK_ITEM_FAILED, Phase::Bulk)
                        .with_run_id(&ctx.run_id)
                        .with_progress(run.next as u64 + 1, Some(total as u64))
                        .with_detail("row_id", &id)
                        .with_detail("http_status", http_status)
                        .with_detail("error", &message),
                );
            }
        }

        run.outcomes.push(ItemOutcome {
            id,
            name,
            path,
            status,
            http_status,
            error,
            time_ms,
        });
        run.next += 1;

        view.set_progress(Some(&ProgressView {
            completed: run.next,
            total,
            status: format!("{}...", engine.translations().get("processing")),
        }));
        !run.is_done()
    }

    /// Close a run: clear the in-flight flag and the selection, recompute and
    /// report.
    pub fn finish(
        &self,
        run: BulkRun,
        selection: &mut BulkSelectionController,
        engine: &mut TableFilterEngine,
        view: &mut dyn TableView,
    ) -> BulkReport {
        let ctx = selection.log_context().clone();
        let successes = run
            .outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Success)
            .count();
        let errors = run.outcomes.len() - successes;

        selection.set_in_flight(false);
        engine.recompute(view);
        selection.clear(engine, view);

        let message = completion_message(engine, successes, errors);
        view.set_progress(Some(&ProgressView {
            completed: run.outcomes.len(),
            total: run.items.len(),
            status: message.clone(),
        }));

        let elapsed_ms = run.started.elapsed().as_millis() as u64;
        crate::log_event!(
            ctx,
            INFO,
            event_names::BULK_FINISHED,
            Stage::Bulk,
            "bulk action finished",
            successes = successes as u64,
            errors = errors as u64,
            elapsed_ms = elapsed_ms
        );
        self.emitter.emit(
            ProgressEvent::new(events::event_names::BULK_COMPLETE, Phase::Bulk)
                .with_run_id(&ctx.run_id)
                .with_progress(run.outcomes.len() as u64, Some(run.items.len() as u64))
                .with_elapsed_ms(elapsed_ms)
                .with_detail("successes", successes)
                .with_detail("errors", errors),
        );

        BulkReport {
            action: run.action.name,
            attempted: run.outcomes.len(),
            successes,
            errors,
            outcomes: run.outcomes,
            message,
            elapsed_ms,
        }
    }
}

/// "Deletion complete: 2 roles deleted successfully. 1 errors"
fn completion_message(engine: &TableFilterEngine, successes: usize, errors: usize) -> String {
    let t = engine.translations();
    let mut message = format!(
        "{}: {} {} {}",
        t.get("deletion_complete"),
        successes,
        t.get(&engine.noun().plural),
        t.get("deleted_successfully")
    );
    if errors > 0 {
        message.push_str(&format!(". {} {}", errors, t.get("errors")));
    }
    message
}
