//! JSON handlers for the page server's `/panel/*` endpoints.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use super::{HttpResponse, content_type_json, error_response};
use crate::panel::UiEvent;
use crate::panel::runtime::PanelHandle;

#[derive(Serialize)]
struct Accepted {
    queued: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T, status: u16) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json()?)
        .with_status_code(StatusCode(status)))
}

/// Parse the `?since=N` query parameter from a URL.
fn parse_since_param(url: &str) -> Option<u64> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == "since" { v.parse().ok() } else { None }
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /panel/snapshot`: every region as HTML, plus its sequence number.
pub fn get_snapshot(panel: &PanelHandle) -> Result<HttpResponse> {
    let snapshot = panel.snapshot()?;
    json_response(&snapshot, 200)
}

/// `GET /panel/patches?since=N`: patches after N, or a reset marker.
pub fn get_patches(panel: &PanelHandle, url: &str) -> Result<HttpResponse> {
    let since = parse_since_param(url).unwrap_or(0);
    let batch = panel.patches_since(since)?;
    json_response(&batch, 200)
}

/// `POST /panel/event`: queue an operator event.
pub fn post_event(panel: &PanelHandle, body: &str) -> Result<HttpResponse> {
    let event: UiEvent = match serde_json::from_str(body) {
        Ok(event) => event,
        Err(e) => return error_response(400, &format!("invalid event: {e}")),
    };
    panel.send(event)?;
    json_response(&Accepted { queued: true }, 202)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
