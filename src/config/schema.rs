/// Configuration schema and defaults for switchboard.
///
/// Defines the TOML-serializable configuration structure with three sections:
/// `[backend]`, `[panel]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level switchboard configuration.
///
/// Maps directly to the `~/.switchboard/config.toml` and `.switchboard.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub backend: BackendConfig,
    pub panel: PanelConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the scenario runner lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the scenario runner; `/api/...` paths are appended.
    pub url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [panel]
// ---------------------------------------------------------------------------

/// Panel server and layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Address the page server binds to.
    pub listen: String,
    /// Open the panel in the default browser when `serve` starts.
    pub open_browser: bool,
    /// Interval of the unconditional run-status poll (milliseconds).
    pub status_poll_ms: u64,
    /// Height of one step block in the circuit (pixels).
    pub step_height_px: u32,
    /// Number of patches kept for browsers catching up.
    pub journal_capacity: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:9747".to_string(),
            open_browser: true,
            status_poll_ms: 1000,
            step_height_px: 64,
            journal_capacity: 2048,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Failure log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every failed request to `~/.switchboard/failures.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SwitchboardConfig {
    /// Annotated default config written by `switchboard config init`.
    pub fn default_toml() -> String {
        r#"# switchboard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SWITCHBOARD_*)
#   2. Project config (.switchboard.toml in current directory)
#   3. User global config (~/.switchboard/config.toml)
#   4. Built-in defaults

[backend]
url = "http://127.0.0.1:8080"   # scenario runner serving /api/*
timeout_ms = 10000

[panel]
listen = "127.0.0.1:9747"
open_browser = true
status_poll_ms = 1000           # run-status poll interval
step_height_px = 64             # vertical size of one queue slot
journal_capacity = 2048         # patches kept for reconnecting pages

[logging]
enabled = true                  # append failures to ~/.switchboard/failures.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
