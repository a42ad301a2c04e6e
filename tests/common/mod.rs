//! Recording in-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, bail};
use serde_json::{Value, json};

use switchboard::backend::Backend;
use switchboard::scenario::{CommandOutput, Module, Params, Scenario, Status};

#[derive(Default)]
pub struct FakeBackend {
    scenario: Scenario,
    modules: HashMap<String, Module>,
    running: Mutex<bool>,
    calls: Mutex<Vec<String>>,
    edits: Mutex<Vec<(usize, Params)>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeBackend {
    pub fn new(scenario: Value) -> Self {
        Self {
            scenario: serde_json::from_value(scenario).unwrap(),
            ..Self::default()
        }
    }

    pub fn with_module(mut self, name: &str, module: Value) -> Self {
        self.modules
            .insert(name.to_string(), serde_json::from_value(module).unwrap());
        self
    }

    pub fn running(self, running: bool) -> Self {
        *self.running.lock().unwrap() = running;
        self
    }

    /// Make every call whose description is `call` fail.
    pub fn fail(&self, call: &str) {
        self.failing.lock().unwrap().insert(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn edits(&self) -> Vec<(usize, Params)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock().unwrap()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(&call) {
            bail!("{call} failed: HTTP 500");
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    fn get_conf(&self) -> Result<Scenario> {
        self.record("GET /api/get_conf".to_string())?;
        Ok(self.scenario.clone())
    }

    fn status(&self) -> Result<Status> {
        self.record("GET /api/status".to_string())?;
        Ok(Status {
            status: self.is_running(),
        })
    }

    fn start(&self) -> Result<()> {
        self.record("GET /api/start".to_string())?;
        *self.running.lock().unwrap() = true;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.record("GET /api/stop".to_string())?;
        *self.running.lock().unwrap() = false;
        Ok(())
    }

    fn help(&self, module: &str) -> Result<Module> {
        self.record(format!("GET /api/help/{module}"))?;
        Ok(self.modules.get(module).cloned().unwrap_or_default())
    }

    fn cmd(&self, module: &str, cmd: &str) -> Result<CommandOutput> {
        self.record(format!("POST /api/cmd/{module}"))?;
        Ok(CommandOutput {
            response: format!("{module}: {cmd}"),
        })
    }

    fn edit(&self, index: usize, params: &Params) -> Result<Value> {
        self.record(format!("POST /api/edit/{index}"))?;
        self.edits.lock().unwrap().push((index, params.clone()));
        Ok(json!({"ok": true}))
    }
}

/// Two pipes, three steps; steps 0 and 2 share the `filter` module.
pub fn sample_scenario() -> Value {
    json!({
        "queue": [
            {"name": "filter", "params": {"pipe": 1, "count": 5, "label": "main"}},
            {"name": "merge", "params": {"pipe": 2, "on": true}},
            {"name": "filter", "params": {"pipe": 2, "shape": {"w": 2}}}
        ]
    })
}

pub fn sample_module() -> Value {
    json!({
        "seek": {"param_count": 1, "descr_param": "offset", "descr": "Seek"},
        "reset": {"param_count": 0, "descr_param": "", "descr": "Reset"}
    })
}
