//! Embedded page server for the panel.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - the page skeleton with its patch applier script
//! - the rendered page as a snapshot, and the patches since a sequence number
//! - an event endpoint that forwards operator clicks to the controller
//!
//! Launched via `switchboard serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::panel::runtime::PanelHandle;

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind the page server. `addr` may use port 0 for an ephemeral port.
pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| anyhow!("failed to start HTTP server on {addr}: {e}"))
}

/// Bind, announce, optionally open a browser, then serve until the process
/// exits.
pub fn serve(addr: &str, panel: PanelHandle, open: bool) -> Result<()> {
    let server = bind(addr)?;

    println!("switchboard panel running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    run(&server, &panel);
    Ok(())
}

/// Answer requests one at a time. Handler errors become 500 responses and
/// never stop the loop.
pub fn run(server: &Server, panel: &PanelHandle) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let response = match dispatch(panel, &method, &url, body.as_deref()) {
            Ok(resp) => Ok(resp),
            Err(e) => error_response(500, &format!("{e:#}")),
        };
        if let Ok(resp) = response {
            let _ = request.respond(resp);
        }

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(
    panel: &PanelHandle,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => serve_frontend(),

        (&Method::Get, "/panel/snapshot") => api::get_snapshot(panel),
        (&Method::Get, "/panel/patches") => api::get_patches(panel, url),
        (&Method::Post, "/panel/event") => api::post_event(panel, body.unwrap_or("")),

        _ => error_response(404, "not found"),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Result<HttpResponse> {
    Ok(Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html()?)
        .with_status_code(StatusCode(200)))
}

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Result<HttpResponse> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json()?)
        .with_status_code(StatusCode(status)))
}

pub(crate) fn content_type_json() -> Result<Header> {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .map_err(|_| anyhow!("invalid JSON content type header"))
}

fn content_type_html() -> Result<Header> {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8")
        .map_err(|_| anyhow!("invalid HTML content type header"))
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
