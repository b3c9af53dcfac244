//! End-to-end scenarios over a table page: filtering, highlighting, selection
//! and bulk deletion, driven through the public API with a recording view.

use std::time::Duration;

use tf_common::RowId;
use tf_config::{Combinator, DimensionConfig, TableConfig, Translations, ValueSource};
use tf_core::bulk::{BulkExecutor, StaticTransport};
use tf_core::engine::highlight::join_segments;
use tf_core::events::EventBus;
use tf_core::view::TriState;
use tf_core::{Document, RecordingView, RowNode, TableFilterEngine, TablePage};

const REQUIRED: [&str; 6] = [
    "searchInput",
    "rolesTableContainer",
    "noSearchResults",
    "searchResults",
    "selectAllCheckbox",
    "bulkDeleteBtn",
];

fn role_config() -> TableConfig {
    let mut config = TableConfig::default();
    config.filters = vec![DimensionConfig {
        name: "role".into(),
        label: "Role".into(),
        source: ValueSource::Attribute {
            name: "data-role".into(),
        },
        display: None,
        combinator: Combinator::Any,
    }];
    config
}

fn users_doc() -> Document {
    let people = [
        ("1", "Alice", "Admin"),
        ("2", "Bob", "Viewer"),
        ("3", "Carol", "Admin"),
        ("4", "Dan", "Viewer"),
        ("5", "Eve", "Viewer"),
    ];
    let mut doc = Document::new().with_elements(REQUIRED);
    for (id, name, role) in people {
        doc = doc.with_row(
            RowNode::new(id)
                .with_cell(".searchable-rolename", name)
                .with_attr("data-role", role)
                .with_attr("data-rolename", name),
        );
    }
    doc
}

mod filtering {
    use super::*;

    #[test]
    fn admin_filter_shows_two_of_five() {
        let mut page = TablePage::initialize(&role_config(), &users_doc(), Translations::english());
        let mut view = RecordingView::new();
        page.render(&mut view);
        assert_eq!(view.results_summary, "Total: 5 roles");

        let visible = page
            .on_filter_toggled("role", "Admin", true, &mut view)
            .unwrap();
        assert_eq!(visible, 2);
        assert_eq!(view.results_summary, "Showing 2 of 5 roles (filtered)");
        assert_eq!(view.visible_rows(), vec![RowId::new("1"), RowId::new("3")]);
    }

    #[test]
    fn visible_plus_hidden_is_total() {
        let mut page = TablePage::initialize(&role_config(), &users_doc(), Translations::english());
        let mut view = RecordingView::new();
        page.on_query_changed("e", &mut view);
        let hidden = view.row_visible.values().filter(|v| !**v).count();
        assert_eq!(view.visible_rows().len() + hidden, 5);
    }

    #[test]
    fn clear_all_restores_everything_and_focuses() {
        let mut page = TablePage::initialize(&role_config(), &users_doc(), Translations::english());
        let mut view = RecordingView::new();
        page.on_filter_toggled("role", "Viewer", true, &mut view)
            .unwrap();
        page.on_query_changed("bob", &mut view);
        assert_eq!(view.results_summary, "Showing 1 of 5 role (search + filters)");

        assert_eq!(page.clear_all(&mut view), 5);
        assert_eq!(view.results_summary, "Total: 5 roles");
        assert_eq!(view.filter_button.label, "Filters");
        assert_eq!(view.search_text, "");
        assert_eq!(view.focus_count, 1);
    }
}

mod highlighting {
    use super::*;

    fn names_doc() -> Document {
        let mut doc = Document::new().with_elements(REQUIRED);
        for (id, name) in [("1", "John"), ("2", "Joanna"), ("3", "Mark")] {
            doc = doc.with_row(RowNode::new(id).with_cell(".searchable-rolename", name));
        }
        doc
    }

    #[test]
    fn jo_highlights_first_two_and_hides_mark() {
        let doc = names_doc();
        let mut engine =
            TableFilterEngine::initialize(&TableConfig::default(), &doc, Translations::english())
                .unwrap();
        let mut view = RecordingView::new();
        engine.on_query_changed("jo", &mut view);

        for id in ["1", "2"] {
            let segments = view.segments(&RowId::new(id), "name").unwrap();
            assert!(segments[0].is_match);
            assert_eq!(segments[0].text, "Jo");
        }
        assert!(!engine.is_visible(&RowId::new("3")));
        assert!(!view.is_highlighted(&RowId::new("3")));

        // Row data is never rewritten.
        for (row, original) in engine.rows().iter().zip(&doc.rows) {
            assert_eq!(row.node().cells, original.cells);
        }
    }

    #[test]
    fn clearing_restores_plain_text() {
        let mut engine = TableFilterEngine::initialize(
            &TableConfig::default(),
            &names_doc(),
            Translations::english(),
        )
        .unwrap();
        let mut view = RecordingView::new();
        engine.on_query_changed("an", &mut view);
        engine.clear_search(&mut view);
        let segments = view.segments(&RowId::new("2"), "name").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(join_segments(segments), "Joanna");
        assert!(!segments[0].is_match);
    }

    #[test]
    fn regex_metacharacters_match_literally() {
        let doc = Document::new()
            .with_elements(REQUIRED)
            .with_row(RowNode::new("1").with_cell(".searchable-rolename", "Ops (EU)"))
            .with_row(RowNode::new("2").with_cell(".searchable-rolename", "Ops EU"));
        let mut engine =
            TableFilterEngine::initialize(&TableConfig::default(), &doc, Translations::english())
                .unwrap();
        let mut view = RecordingView::new();
        assert_eq!(engine.on_query_changed("(eu)", &mut view), 1);
        let segments = view.segments(&RowId::new("1"), "name").unwrap();
        assert_eq!(segments[1].text, "(EU)");
    }
}

mod bulk {
    use super::*;

    #[test]
    fn three_selected_with_second_failing() {
        let mut page = TablePage::initialize(&role_config(), &users_doc(), Translations::english());
        let mut view = RecordingView::new();
        page.render(&mut view);
        for id in ["1", "2", "3"] {
            assert!(page.toggle_row(&RowId::new(id), true, &mut view));
        }
        assert_eq!(view.select_all, TriState::Indeterminate);
        assert_eq!(view.bulk_button.title, "Delete 3 roles selected");

        let transport = StaticTransport::new().with_status("/role/delete/2", 500);
        let bus = EventBus::new();
        let events = bus.subscribe();
        let executor = BulkExecutor::new(&transport)
            .with_emitter(&bus)
            .with_pause(Duration::ZERO);
        let report = page.run_bulk_action(&executor, &mut view).unwrap();

        assert_eq!(report.successes, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(view.removed, vec![RowId::new("1"), RowId::new("3")]);
        assert!(page.selection().unwrap().is_empty());
        assert_eq!(view.select_all, TriState::Unchecked);
        assert!(!view.bulk_button.visible);
        assert_eq!(page.engine().unwrap().total(), 3);
        assert_eq!(events.try_iter().count(), 5);
    }

    #[test]
    fn selection_respects_filters() {
        let mut page = TablePage::initialize(&role_config(), &users_doc(), Translations::english());
        let mut view = RecordingView::new();
        page.on_filter_toggled("role", "Viewer", true, &mut view)
            .unwrap();
        page.toggle_all_visible(true, &mut view);
        assert_eq!(page.selection().unwrap().len(), 3);
        assert!(!page.toggle_row(&RowId::new("1"), true, &mut view));

        page.on_query_changed("dan", &mut view);
        let selection = page.selection().unwrap();
        assert_eq!(selection.len(), 1);
        assert!(selection.is_selected(&RowId::new("4")));
        assert_eq!(view.select_all, TriState::Checked);

        page.toggle_all_visible(false, &mut view);
        assert!(page.selection().unwrap().is_empty());
        assert_eq!(view.select_all, TriState::Unchecked);
    }
}
