//! Property-based tests for filtering, highlighting and selection invariants.

use proptest::prelude::*;
use tf_common::RowId;
use tf_config::{Combinator, DimensionConfig, TableConfig, Translations, ValueSource};
use tf_core::engine::highlight::{join_segments, Highlighter};
use tf_core::selection::BulkSelectionController;
use tf_core::{Document, RecordingView, RowNode, TableFilterEngine};

const TAGS: [&str; 4] = ["red", "green", "blue", "gold"];

fn config(combinator: Combinator) -> TableConfig {
    let mut config = TableConfig::default();
    config.filters = vec![DimensionConfig {
        name: "tag".into(),
        label: "Tag".into(),
        source: ValueSource::AttributeList {
            name: "data-tags".into(),
            separator: ",".into(),
        },
        display: None,
        combinator,
    }];
    config
}

fn document(rows: &[(String, Vec<usize>)]) -> Document {
    let mut doc = Document::new().with_elements([
        "searchInput",
        "rolesTableContainer",
        "noSearchResults",
        "searchResults",
    ]);
    for (i, (name, tags)) in rows.iter().enumerate() {
        let tags: Vec<&str> = tags.iter().map(|t| TAGS[*t]).collect();
        doc = doc.with_row(
            RowNode::new(i.to_string())
                .with_cell(".searchable-rolename", name.clone())
                .with_attr("data-tags", tags.join(",")),
        );
    }
    doc
}

fn rows_strategy() -> impl Strategy<Value = Vec<(String, Vec<usize>)>> {
    prop::collection::vec(
        ("[a-dA-D ]{0,8}", prop::collection::vec(0usize..TAGS.len(), 0..3)),
        0..12,
    )
}

proptest! {
    #[test]
    fn visibility_matches_formula(
        rows in rows_strategy(),
        query in "[a-d ]{0,3}",
        active in prop::collection::btree_set(0usize..TAGS.len(), 0..3),
        all in any::<bool>(),
    ) {
        let combinator = if all { Combinator::All } else { Combinator::Any };
        let doc = document(&rows);
        let mut engine =
            TableFilterEngine::initialize(&config(combinator), &doc, Translations::english()).unwrap();
        let mut view = RecordingView::new();
        for t in &active {
            engine.on_filter_toggled("tag", TAGS[*t], true, &mut view).unwrap();
        }
        engine.on_query_changed(&query, &mut view);

        let needle = query.trim().to_lowercase();
        let mut expected_visible = 0;
        for (i, (name, tags)) in rows.iter().enumerate() {
            let text_ok = needle.is_empty() || name.trim().to_lowercase().contains(&needle);
            let dim_ok = active.is_empty()
                || match combinator {
                    Combinator::Any => tags.iter().any(|t| active.contains(t)),
                    Combinator::All => active.iter().all(|a| tags.contains(a)),
                };
            let expected = text_ok && dim_ok;
            if expected {
                expected_visible += 1;
            }
            prop_assert_eq!(engine.is_visible(&RowId::new(i.to_string())), expected);
        }
        prop_assert_eq!(engine.visible_count(), expected_visible);
        prop_assert_eq!(view.visible_rows().len(), expected_visible);
    }

    #[test]
    fn highlight_round_trips(text in ".{0,40}", query in ".{0,6}") {
        let highlighter = Highlighter::new(&query);
        let segments = highlighter.segments(&text);
        prop_assert_eq!(join_segments(&segments), text.clone());
        prop_assert_eq!(join_segments(&Highlighter::new("").segments(&text)), text);
    }

    #[test]
    fn selection_stays_within_visible(
        rows in rows_strategy(),
        ops in prop::collection::vec((0usize..12, any::<bool>(), "[a-d]{0,2}"), 0..20),
    ) {
        let doc = document(&rows);
        let config = config(Combinator::Any);
        let mut engine =
            TableFilterEngine::initialize(&config, &doc, Translations::english()).unwrap();
        let mut selection = BulkSelectionController::new(
            config.bulk.clone().unwrap(),
            engine.log_context().clone(),
        );
        let mut view = RecordingView::new();

        for (row, checked, query) in ops {
            selection.toggle_row(&engine, &RowId::new(row.to_string()), checked, &mut view);
            engine.on_query_changed(&query, &mut view);
            selection.prune_hidden(&engine, &mut view);

            for id in selection.selected_ids(&engine) {
                prop_assert!(engine.is_visible(&id));
            }
            prop_assert_eq!(selection.selected_ids(&engine).len(), selection.len());
        }

        selection.toggle_all_visible(&engine, true, &mut view);
        selection.toggle_all_visible(&engine, false, &mut view);
        prop_assert!(selection.is_empty());
        prop_assert_eq!(view.select_all, tf_core::view::TriState::Unchecked);
    }
}
