//! Criterion benchmarks for the filter hot paths.
//!
//! Benchmarks `recompute` (visibility, highlighting and summary over every
//! row) at several table sizes, and `Highlighter::segments` on a single cell.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tf_config::{Combinator, DimensionConfig, TableConfig, Translations, ValueSource};
use tf_core::engine::Highlighter;
use tf_core::{Document, NullView, RowNode, TableFilterEngine};

// ── Helpers ──────────────────────────────────────────────────────────

const ROLES: [&str; 4] = ["Admin", "Editor", "Viewer", "Auditor"];

fn config() -> TableConfig {
    let mut config = TableConfig::default();
    config.filters.push(DimensionConfig {
        name: "role".into(),
        label: "Role".into(),
        source: ValueSource::Attribute {
            name: "data-role".into(),
        },
        display: None,
        combinator: Combinator::Any,
    });
    config
}

fn document(rows: usize) -> Document {
    let mut doc = Document::new().with_elements([
        "searchInput",
        "rolesTableContainer",
        "noSearchResults",
        "searchResults",
    ]);
    for i in 0..rows {
        let kind = if i % 3 == 0 { "Composite role" } else { "Simple role" };
        doc = doc.with_row(
            RowNode::new(i.to_string())
                .with_cell(".searchable-rolename", format!("role-{:05} operator", i))
                .with_cell(
                    ".searchable-description",
                    format!("Grants access to module {} and reports", i % 17),
                )
                .with_attr("data-role", ROLES[i % ROLES.len()])
                .with_badge(kind),
        );
    }
    doc
}

fn engine(rows: usize) -> TableFilterEngine {
    match TableFilterEngine::initialize(&config(), &document(rows), Translations::english()) {
        Ok(engine) => engine,
        Err(err) => panic!("bench fixture is valid: {}", err),
    }
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/recompute");

    for rows in [100usize, 1_000, 5_000] {
        let mut plain = engine(rows);
        group.bench_with_input(BenchmarkId::new("no_query", rows), &rows, |b, _| {
            b.iter(|| black_box(plain.recompute(&mut NullView)));
        });

        let mut searched = engine(rows);
        searched.on_query_changed("operator", &mut NullView);
        group.bench_with_input(BenchmarkId::new("query", rows), &rows, |b, _| {
            b.iter(|| black_box(searched.recompute(&mut NullView)));
        });

        let mut filtered = engine(rows);
        let _ = filtered.on_filter_toggled("role", "Admin", true, &mut NullView);
        let _ = filtered.on_filter_toggled("type", "Composite", true, &mut NullView);
        filtered.on_query_changed("module 3", &mut NullView);
        group.bench_with_input(BenchmarkId::new("query_and_filters", rows), &rows, |b, _| {
            b.iter(|| black_box(filtered.recompute(&mut NullView)));
        });
    }

    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/highlight");
    let text = "Grants access to module 3 and reports for the (EU) operators team";

    for query in ["eu", "(eu)", "operator", "zzz"] {
        let highlighter = Highlighter::new(query);
        group.bench_with_input(BenchmarkId::new("segments", query), &text, |b, text| {
            b.iter(|| black_box(highlighter.segments(black_box(text))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_recompute, bench_highlight);
criterion_main!(benches);
