//! The scenario runner's HTTP contract, as seen from the panel.
//!
//! [`Backend`] is the seam between panel logic and the network. The panel
//! runtime and the CLI use [`HttpBackend`]; tests substitute an in-memory
//! implementation.
//!
//! | Method | Path                   | Body              | Response            |
//! |--------|------------------------|-------------------|---------------------|
//! | GET    | `/api/get_conf`        |                   | scenario            |
//! | GET    | `/api/status`          |                   | `{status: bool}`    |
//! | GET    | `/api/start`           |                   | ignored             |
//! | GET    | `/api/stop`            |                   | ignored             |
//! | GET    | `/api/help/<module>`   |                   | module commands     |
//! | POST   | `/api/cmd/<module>`    | `{cmd: string}`   | `{response: string}`|
//! | POST   | `/api/edit/<index>`    | full param map    | opaque JSON marker  |

pub mod http;

use anyhow::Result;
use serde_json::Value;

use crate::scenario::{CommandOutput, Module, Params, Scenario, Status};

pub use http::HttpBackend;

/// Every call either yields its payload or fails as a whole; there is one
/// failure kind ("request failed"), carried as an [`anyhow::Error`].
pub trait Backend: Send + Sync {
    fn get_conf(&self) -> Result<Scenario>;
    fn status(&self) -> Result<Status>;
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn help(&self, module: &str) -> Result<Module>;
    /// Run `cmd` (command name, a space, free-text arguments) on `module`.
    fn cmd(&self, module: &str, cmd: &str) -> Result<CommandOutput>;
    /// Replace the parameters of the step at `index`.
    fn edit(&self, index: usize, params: &Params) -> Result<Value>;
}
