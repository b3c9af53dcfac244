//! HttpTransport against a local server.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tf_common::RowId;
use tf_config::{TableConfig, Translations};
use tf_core::bulk::{ActionTransport, BulkExecutor, HttpTransport, ItemStatus};
use tf_core::{Document, RecordingView, RowNode, TablePage};

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    url: String,
    content_type: Option<String>,
}

/// Serve `expected` requests, answering 500 for `failing_path` and 204 otherwise.
fn spawn_server(
    expected: usize,
    failing_path: &'static str,
) -> (String, Arc<Mutex<Vec<Seen>>>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("bind local server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("server listens on an ip address");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    let handle = thread::spawn(move || {
        for _ in 0..expected {
            let request = match server.recv_timeout(Duration::from_secs(5)) {
                Ok(Some(req)) => req,
                _ => break,
            };
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string());
            let url = request.url().to_string();
            log.lock().expect("lock").push(Seen {
                method: request.method().to_string(),
                url: url.clone(),
                content_type,
            });
            let status = if url == failing_path { 500 } else { 204 };
            let _ = request.respond(tiny_http::Response::from_string("").with_status_code(status));
        }
    });

    (format!("http://{}", addr), seen, handle)
}

#[test]
fn posts_json_and_reports_status() {
    let (base, seen, handle) = spawn_server(2, "/role/delete/9");
    let transport = HttpTransport::new(format!("{}/", base));

    assert_eq!(transport.send("/role/delete/4").expect("reachable"), 204);
    assert_eq!(transport.send("/role/delete/9").expect("reachable"), 500);
    handle.join().expect("server thread");

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "/role/delete/4");
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Port 1 is reserved and closed on test machines.
    let transport = HttpTransport::with_timeout("http://127.0.0.1:1", Some(Duration::from_secs(2)));
    let err = transport.send("/role/delete/1").unwrap_err();
    assert!(err.to_string().contains("127.0.0.1:1/role/delete/1"));
}

#[test]
fn bulk_delete_over_http_continues_after_failure() {
    let (base, seen, handle) = spawn_server(3, "/role/delete/b");

    let mut doc = Document::new().with_elements([
        "searchInput",
        "rolesTableContainer",
        "noSearchResults",
        "searchResults",
        "selectAllCheckbox",
        "bulkDeleteBtn",
    ]);
    for (id, name) in [("a", "Auditor"), ("b", "Billing"), ("c", "Curator")] {
        doc = doc.with_row(
            RowNode::new(id)
                .with_cell(".searchable-rolename", name)
                .with_attr("data-rolename", name)
                .with_badge("Simple role"),
        );
    }

    let mut page = TablePage::initialize(&TableConfig::default(), &doc, Translations::english());
    let mut view = RecordingView::new();
    page.render(&mut view);
    page.toggle_all_visible(true, &mut view);

    let transport = HttpTransport::new(base);
    let executor = BulkExecutor::new(&transport).with_pause(Duration::from_millis(5));
    let report = page
        .run_bulk_action(&executor, &mut view)
        .expect("selection is not empty");
    handle.join().expect("server thread");

    assert_eq!(report.attempted, 3);
    assert_eq!(report.successes, 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.outcomes[1].status, ItemStatus::Failed);
    assert_eq!(report.outcomes[1].http_status, Some(500));
    assert_eq!(
        report.message,
        "Deletion complete: 2 roles deleted successfully. 1 errors"
    );

    let urls: Vec<String> = seen.lock().expect("lock").iter().map(|s| s.url.clone()).collect();
    assert_eq!(urls, vec!["/role/delete/a", "/role/delete/b", "/role/delete/c"]);

    let engine = page.engine().expect("engine enabled");
    assert_eq!(engine.total(), 1);
    assert!(engine.row(&RowId::new("b")).is_some());
    assert!(page.selection().expect("selection enabled").is_empty());
}
