//! Scenario data model: the step queue, per-step parameters, and the command
//! metadata a step's module exposes.
//!
//! Everything here mirrors the JSON the scenario runner serves. Only the
//! `current` selection and the `running` flag are client-local; they are
//! never read from or written to the backend.

pub mod params;

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A step's parameter map. Key order follows the backend's JSON.
pub type Params = Map<String, Value>;

/// Parameter that places a step into a horizontal lane (1-indexed).
pub const PIPE_PARAM: &str = "pipe";

// ---------------------------------------------------------------------------
// Scenario / Step
// ---------------------------------------------------------------------------

/// One configured unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Module identifier; also the key for module help lookups.
    pub name: String,
    #[serde(default)]
    pub params: Params,
}

impl Step {
    pub fn new(name: impl Into<String>, params: Params) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// The step's lane, if `pipe` holds a finite number.
    pub fn pipe(&self) -> Option<f64> {
        self.params
            .get(PIPE_PARAM)
            .and_then(Value::as_f64)
            .filter(|pipe| pipe.is_finite())
    }
}

/// The full client-visible state: step queue, selection, run flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Execution order and vertical layout order.
    #[serde(default)]
    pub queue: Vec<Step>,
    /// Index of the selected step in `queue`.
    #[serde(skip)]
    pub current: Option<usize>,
    /// Client-local record of the last start/stop the operator issued.
    #[serde(skip)]
    pub running: bool,
}

impl Scenario {
    pub fn new(queue: Vec<Step>) -> Self {
        Self {
            queue,
            current: None,
            running: false,
        }
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.queue.get(index)
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.queue.get_mut(index)
    }

    /// Select the step at `index`. Returns `false` (and keeps the previous
    /// selection) when no such step exists.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.queue.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// The selected step, looked up through its index.
    pub fn current_step(&self) -> Option<&Step> {
        self.current.and_then(|index| self.queue.get(index))
    }

    pub fn is_current(&self, index: usize) -> bool {
        self.current == Some(index)
    }
}

// ---------------------------------------------------------------------------
// Module / Command
// ---------------------------------------------------------------------------

/// One invocable action of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Number of free-text arguments; `0` hides the argument input.
    #[serde(default)]
    pub param_count: u32,
    /// Placeholder text for the argument input.
    #[serde(default)]
    pub descr_param: String,
    /// Label of the run control.
    #[serde(default)]
    pub descr: String,
}

/// The commands a step's module exposes, in the order the backend lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    commands: Vec<(String, Command)>,
}

impl Module {
    pub fn new(commands: Vec<(String, Command)>) -> Self {
        Self { commands }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands
            .iter()
            .map(|(name, command)| (name.as_str(), command))
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.iter()
            .find_map(|(candidate, command)| (candidate == name).then_some(command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'de> Deserialize<'de> for Module {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let commands = raw
            .into_iter()
            .map(|(name, value)| {
                serde_json::from_value::<Command>(value)
                    .map(|command| (name.clone(), command))
                    .map_err(|e| {
                        <D::Error as serde::de::Error>::custom(format!("command '{name}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { commands })
    }
}

impl Serialize for Module {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.commands.len()))?;
        for (name, command) in &self.commands {
            map.serialize_entry(name, command)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// `GET /api/status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub status: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status {
            write!(f, "running")
        } else {
            write!(f, "stopped")
        }
    }
}

/// `POST /api/cmd/<module>` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub cmd: String,
}

impl CommandRequest {
    /// Join a command name and its free-text arguments with a single space.
    /// The space is always present, even when `args` is empty.
    pub fn new(command: &str, args: &str) -> Self {
        Self {
            cmd: format!("{command} {args}"),
        }
    }
}

/// `POST /api/cmd/<module>` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub response: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_deserializes_with_local_state_cleared() {
        let scenario: Scenario = serde_json::from_value(json!({
            "queue": [
                {"name": "filter", "params": {"pipe": 1}},
                {"name": "merge", "params": {"pipe": 2, "window": 5}}
            ],
            "current": 1,
            "running": true
        }))
        .unwrap();

        assert_eq!(scenario.queue.len(), 2);
        assert_eq!(scenario.current, None);
        assert!(!scenario.running);
        assert_eq!(scenario.queue[1].pipe(), Some(2.0));
    }

    #[test]
    fn pipe_ignores_non_numeric_values() {
        let step: Step = serde_json::from_value(json!({
            "name": "x", "params": {"pipe": "2"}
        }))
        .unwrap();
        assert_eq!(step.pipe(), None);

        let step: Step = serde_json::from_value(json!({"name": "y"})).unwrap();
        assert_eq!(step.pipe(), None);
        assert!(step.params.is_empty());
    }

    #[test]
    fn select_rejects_out_of_range_index() {
        let mut scenario = Scenario::new(vec![Step::new("a", Params::new())]);
        assert!(scenario.select(0));
        assert!(!scenario.select(3));
        assert_eq!(scenario.current, Some(0));
        assert_eq!(scenario.current_step().map(|s| s.name.as_str()), Some("a"));
    }

    #[test]
    fn module_keeps_backend_order() {
        let module: Module = serde_json::from_str(
            r#"{
                "zeta": {"param_count": 1, "descr_param": "value", "descr": "Set zeta"},
                "alpha": {"param_count": 0, "descr_param": "", "descr": "Reset"}
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = module.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(module.get("alpha").unwrap().param_count, 0);

        let back = serde_json::to_string(&module).unwrap();
        assert!(back.find("zeta").unwrap() < back.find("alpha").unwrap());
    }

    #[test]
    fn module_rejects_malformed_command() {
        let result: Result<Module, _> =
            serde_json::from_str(r#"{"bad": {"param_count": "many"}}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("bad"));
    }

    #[test]
    fn command_request_always_inserts_separator() {
        assert_eq!(CommandRequest::new("reset", "").cmd, "reset ");
        assert_eq!(CommandRequest::new("seek", "42 fast").cmd, "seek 42 fast");
    }
}
