//! Backend requests the controller issues, and the completions they produce.
//!
//! A [`Request`] is plain data; whoever executes it (a worker thread in the
//! runtime, a loop in a test) feeds the resulting [`Completion`] back into
//! the controller. Each completion holds either a payload or an error.

use anyhow::Result;
use serde_json::Value;

use crate::backend::Backend;
use crate::scenario::{CommandOutput, Module, Params, Scenario, Status};

/// Why a status read was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPurpose {
    /// Timer poll or header refresh.
    Header,
    /// First half of a toggle: read, then start or stop.
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LoadScenario,
    FetchStatus(StatusPurpose),
    Start,
    Stop,
    FetchModule { name: String },
    RunCommand { module: String, cmd: String },
    SubmitParams { index: usize, params: Params },
}

impl Request {
    /// Method and path, for failure reports.
    pub fn describe(&self) -> String {
        match self {
            Request::LoadScenario => "GET /api/get_conf".to_string(),
            Request::FetchStatus(_) => "GET /api/status".to_string(),
            Request::Start => "GET /api/start".to_string(),
            Request::Stop => "GET /api/stop".to_string(),
            Request::FetchModule { name } => format!("GET /api/help/{name}"),
            Request::RunCommand { module, .. } => format!("POST /api/cmd/{module}"),
            Request::SubmitParams { index, .. } => format!("POST /api/edit/{index}"),
        }
    }

    /// Perform the request, blocking the calling thread.
    pub fn execute(self, backend: &dyn Backend) -> Completion {
        match self {
            Request::LoadScenario => Completion::ScenarioLoaded(backend.get_conf()),
            Request::FetchStatus(purpose) => Completion::Status {
                purpose,
                result: backend.status(),
            },
            Request::Start => Completion::Switched {
                start: true,
                result: backend.start(),
            },
            Request::Stop => Completion::Switched {
                start: false,
                result: backend.stop(),
            },
            Request::FetchModule { name } => {
                let result = backend.help(&name);
                Completion::ModuleLoaded { name, result }
            }
            Request::RunCommand { module, cmd } => {
                let result = backend.cmd(&module, &cmd);
                Completion::CommandRan { module, result }
            }
            Request::SubmitParams { index, params } => Completion::ParamsSubmitted {
                index,
                result: backend.edit(index, &params),
            },
        }
    }
}

#[derive(Debug)]
pub enum Completion {
    ScenarioLoaded(Result<Scenario>),
    Status {
        purpose: StatusPurpose,
        result: Result<Status>,
    },
    Switched {
        start: bool,
        result: Result<()>,
    },
    ModuleLoaded {
        name: String,
        result: Result<Module>,
    },
    CommandRan {
        module: String,
        result: Result<CommandOutput>,
    },
    ParamsSubmitted {
        index: usize,
        result: Result<Value>,
    },
}

impl Completion {
    /// Method and path of the request this completes.
    pub fn describe(&self) -> String {
        match self {
            Completion::ScenarioLoaded(_) => Request::LoadScenario.describe(),
            Completion::Status { purpose, .. } => Request::FetchStatus(*purpose).describe(),
            Completion::Switched { start: true, .. } => Request::Start.describe(),
            Completion::Switched { start: false, .. } => Request::Stop.describe(),
            Completion::ModuleLoaded { name, .. } => format!("GET /api/help/{name}"),
            Completion::CommandRan { module, .. } => format!("POST /api/cmd/{module}"),
            Completion::ParamsSubmitted { index, .. } => format!("POST /api/edit/{index}"),
        }
    }
}
