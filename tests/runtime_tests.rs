/// Threaded runtime and page server tests.
///
/// These run the real controller thread against the in-memory backend, so
/// assertions poll with a deadline instead of stepping the panel by hand.
mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use common::{FakeBackend, sample_module, sample_scenario};
use switchboard::backend::Backend;
use switchboard::console::Reporter;
use switchboard::panel::runtime::{self, PanelHandle};
use switchboard::panel::{Panel, PanelSettings, UiEvent};
use switchboard::server;
use switchboard::view::Region;

fn start(backend: &Arc<FakeBackend>, poll: Duration) -> PanelHandle {
    let backend: Arc<dyn Backend> = backend.clone();
    runtime::spawn(
        Panel::new(PanelSettings::default()),
        backend,
        poll,
        Reporter::silent(),
    )
}

fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !done() {
        if Instant::now() >= deadline {
            panic!("timeout waiting for {what}");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn circuit_html(handle: &PanelHandle) -> String {
    handle.snapshot().unwrap().regions[&Region::Circuit].clone()
}

// ---------------------------------------------------------------------------
// Controller thread
// ---------------------------------------------------------------------------

#[test]
fn controller_boots_and_renders_circuit() {
    let backend = Arc::new(FakeBackend::new(sample_scenario()));
    let handle = start(&backend, Duration::from_secs(60));

    wait_until("circuit", || circuit_html(&handle).contains("step-2"));
    assert_eq!(backend.count("GET /api/get_conf"), 1);
}

#[test]
fn tick_polls_status_repeatedly() {
    let backend = Arc::new(FakeBackend::new(sample_scenario()));
    let _handle = start(&backend, Duration::from_millis(20));

    wait_until("three status polls", || backend.count("GET /api/status") >= 3);
}

#[test]
fn tick_runs_even_when_boot_fails() {
    let backend = Arc::new(FakeBackend::new(sample_scenario()));
    backend.fail("GET /api/get_conf");
    let handle = start(&backend, Duration::from_millis(20));

    wait_until("status polls", || backend.count("GET /api/status") >= 2);
    assert_eq!(circuit_html(&handle), "");
}

#[test]
fn events_flow_through_to_the_backend() {
    let backend = Arc::new(
        FakeBackend::new(sample_scenario()).with_module("filter", sample_module()),
    );
    let handle = start(&backend, Duration::from_secs(60));
    wait_until("circuit", || circuit_html(&handle).contains("step-0"));

    handle.send(UiEvent::Select { step: 0 }).unwrap();
    wait_until("menu", || {
        handle.snapshot().unwrap().regions[&Region::Menu].contains("cmd-seek")
    });
    assert_eq!(backend.count("GET /api/help/filter"), 1);

    let since = handle.snapshot().unwrap().seq;
    handle
        .send(UiEvent::DeleteParam {
            step: 0,
            param: "label".to_string(),
        })
        .unwrap();
    wait_until("edit", || backend.edits().len() == 1);
    wait_until("options patch", || {
        !handle.patches_since(since).unwrap().patches.is_empty()
    });

    let batch = handle.patches_since(since).unwrap();
    assert!(!batch.reset);
    assert!(batch.patches.iter().all(|p| p.seq > since));
}

#[test]
fn reader_ahead_of_journal_gets_reset() {
    let backend = Arc::new(FakeBackend::new(sample_scenario()));
    let handle = start(&backend, Duration::from_secs(60));

    let batch = handle.patches_since(1_000_000).unwrap();
    assert!(batch.reset);
    assert!(batch.patches.is_empty());
}

// ---------------------------------------------------------------------------
// Page server
// ---------------------------------------------------------------------------

fn serve(backend: &Arc<FakeBackend>) -> (String, PanelHandle) {
    let handle = start(backend, Duration::from_secs(60));
    let http = server::bind("127.0.0.1:0").unwrap();
    let addr = http.server_addr().to_ip().unwrap();
    let panel = handle.clone();
    thread::spawn(move || server::run(&http, &panel));
    (format!("http://{addr}"), handle)
}

fn status_of(result: Result<ureq::Response, ureq::Error>) -> u16 {
    match result {
        Ok(resp) => resp.status(),
        Err(ureq::Error::Status(code, _)) => code,
        Err(e) => panic!("transport error: {e}"),
    }
}

#[test]
fn page_server_serves_skeleton_and_snapshot() {
    let backend = Arc::new(FakeBackend::new(sample_scenario()));
    let (url, handle) = serve(&backend);
    wait_until("circuit", || circuit_html(&handle).contains("step-0"));

    let page = ureq::get(&url).call().unwrap().into_string().unwrap();
    assert!(page.contains(r#"data-region="circuit""#));

    let snapshot: Value = ureq::get(&format!("{url}/panel/snapshot"))
        .call()
        .unwrap()
        .into_json()
        .unwrap();
    assert!(snapshot["regions"]["circuit"]
        .as_str()
        .unwrap()
        .contains("step-0"));

    let patches: Value = ureq::get(&format!("{url}/panel/patches?since=0"))
        .call()
        .unwrap()
        .into_json()
        .unwrap();
    assert_eq!(patches["reset"], json!(false));
    assert!(!patches["patches"].as_array().unwrap().is_empty());
}

#[test]
fn page_server_queues_events() {
    let backend = Arc::new(
        FakeBackend::new(sample_scenario()).with_module("filter", sample_module()),
    );
    let (url, handle) = serve(&backend);
    wait_until("circuit", || circuit_html(&handle).contains("step-0"));

    let accepted = ureq::post(&format!("{url}/panel/event"))
        .send_json(json!({"type": "select", "step": 2}));
    assert_eq!(status_of(accepted), 202);
    wait_until("module fetch", || backend.count("GET /api/help/filter") == 1);

    let rejected = ureq::post(&format!("{url}/panel/event")).send_string("{\"type\":\"nope\"}");
    assert_eq!(status_of(rejected), 400);

    let missing = ureq::get(&format!("{url}/nope")).call();
    assert_eq!(status_of(missing), 404);
}
