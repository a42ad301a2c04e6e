//! The panel controller: all client state, mutated only through
//! [`Panel::boot`], [`Panel::tick`], [`Panel::handle_event`] and
//! [`Panel::complete`].
//!
//! None of these perform I/O. Each returns [`Effects`]: backend requests to
//! issue and failures to report. Whoever drives the panel executes the
//! requests and feeds the completions back, in whatever order they finish.

pub mod cache;
pub mod requests;
pub mod runtime;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::schema::PanelConfig;
use crate::console::Failure;
use crate::render;
use crate::scenario::params::{NewParamKind, ParamEdit, ParamFormat};
use crate::scenario::{CommandRequest, Scenario};
use crate::view::Region;
use crate::view::document::{Document, PatchBatch, Snapshot};

pub use cache::ModuleCache;
pub use requests::{Completion, Request, StatusPurpose};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// An operator action forwarded from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Header loop toggle.
    Toggle,
    Select {
        step: usize,
    },
    RunCommand {
        module: String,
        command: String,
        #[serde(default)]
        args: String,
    },
    /// Overwrite `param` with the row's input text.
    ConfirmParam {
        step: usize,
        param: String,
        value: String,
    },
    DeleteParam {
        step: usize,
        param: String,
    },
    AddParam {
        step: usize,
        name: String,
        value: String,
        #[serde(default)]
        kind: NewParamKind,
    },
}

/// What a transition asks its driver to do.
#[derive(Debug, Default)]
pub struct Effects {
    pub requests: Vec<Request>,
    pub failures: Vec<Failure>,
}

impl Effects {
    fn request(request: Request) -> Self {
        Self {
            requests: vec![request],
            failures: Vec::new(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            requests: Vec::new(),
            failures: vec![failure],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSettings {
    pub step_height_px: u32,
    pub journal_capacity: usize,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self::from(&PanelConfig::default())
    }
}

impl From<&PanelConfig> for PanelSettings {
    fn from(config: &PanelConfig) -> Self {
        Self {
            step_height_px: config.step_height_px,
            journal_capacity: config.journal_capacity,
        }
    }
}

/// The step the options table currently shows, and the format each row
/// was rendered with.
#[derive(Debug, Clone, PartialEq)]
struct OptionsView {
    index: usize,
    formats: BTreeMap<String, ParamFormat>,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Panel {
    settings: PanelSettings,
    /// `None` until the initial configuration load succeeds.
    scenario: Option<Scenario>,
    /// Last run status read from the backend.
    status: Option<bool>,
    modules: ModuleCache,
    options: Option<OptionsView>,
    /// Command responses in arrival order.
    outputs: Vec<String>,
    document: Document,
}

impl Panel {
    pub fn new(settings: PanelSettings) -> Self {
        Self {
            settings,
            scenario: None,
            status: None,
            modules: ModuleCache::new(),
            options: None,
            outputs: Vec::new(),
            document: Document::new(settings.journal_capacity),
        }
    }

    /// Draw the header placeholder and request the scenario.
    pub fn boot(&mut self) -> Effects {
        self.render_header();
        Effects::request(Request::LoadScenario)
    }

    /// Recurring status poll. Runs whether or not the panel initialized.
    pub fn tick(&mut self) -> Effects {
        Effects::request(Request::FetchStatus(StatusPurpose::Header))
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Effects {
        if self.scenario.is_none() {
            return Effects::default();
        }

        match event {
            UiEvent::Toggle => Effects::request(Request::FetchStatus(StatusPurpose::Toggle)),
            UiEvent::Select { step } => self.select(step),
            UiEvent::RunCommand {
                module,
                command,
                args,
            } => Effects::request(Request::RunCommand {
                module,
                cmd: CommandRequest::new(&command, &args).cmd,
            }),
            UiEvent::ConfirmParam { step, param, value } => {
                let format = self
                    .options
                    .as_ref()
                    .filter(|view| view.index == step)
                    .and_then(|view| view.formats.get(&param).copied());
                match format {
                    Some(format) => self.edit(
                        step,
                        ParamEdit::Update {
                            param,
                            format,
                            text: value,
                        },
                    ),
                    None => Effects::default(),
                }
            }
            UiEvent::DeleteParam { step, param } => self.edit(step, ParamEdit::Delete { param }),
            UiEvent::AddParam {
                step,
                name,
                value,
                kind,
            } => self.edit(
                step,
                ParamEdit::Add {
                    param: name,
                    kind,
                    text: value,
                },
            ),
        }
    }

    /// Apply a finished request. Errors are reported and change nothing.
    pub fn complete(&mut self, completion: Completion) -> Effects {
        let request = completion.describe();

        match completion {
            Completion::ScenarioLoaded(result) => match result {
                Ok(loaded) => {
                    self.scenario = Some(Scenario::new(loaded.queue));
                    self.render_circuit();
                    Effects::request(Request::FetchStatus(StatusPurpose::Header))
                }
                Err(err) => Effects::failure(Failure::new(request, &err)),
            },

            Completion::Status { purpose, result } => {
                let status = match result {
                    Ok(status) => status,
                    Err(err) => {
                        let mut effects = Effects::failure(Failure::new(request, &err));
                        if purpose == StatusPurpose::Toggle {
                            effects
                                .requests
                                .push(Request::FetchStatus(StatusPurpose::Header));
                        }
                        return effects;
                    }
                };

                self.status = Some(status.status);
                self.render_header();

                match purpose {
                    StatusPurpose::Header => Effects::default(),
                    StatusPurpose::Toggle => {
                        if let Some(scenario) = self.scenario.as_mut() {
                            scenario.running = !status.status;
                        }
                        Effects::request(if status.status {
                            Request::Stop
                        } else {
                            Request::Start
                        })
                    }
                }
            }

            Completion::Switched { result, .. } => {
                let mut effects = Effects::request(Request::FetchStatus(StatusPurpose::Header));
                if let Err(err) = result {
                    effects.failures.push(Failure::new(request, &err));
                }
                effects
            }

            Completion::ModuleLoaded { name, result } => match result {
                Ok(module) => {
                    self.modules.insert(name.clone(), module);
                    let selected = self
                        .scenario
                        .as_ref()
                        .and_then(Scenario::current_step)
                        .is_some_and(|step| step.name == name);
                    if selected {
                        self.render_menu(&name);
                    }
                    Effects::default()
                }
                Err(err) => Effects::failure(Failure::new(request, &err)),
            },

            Completion::CommandRan { result, .. } => match result {
                Ok(output) => {
                    self.outputs.push(output.response);
                    self.document
                        .render(Region::Output, render::output::render(&self.outputs));
                    Effects::default()
                }
                Err(err) => Effects::failure(Failure::new(request, &err)),
            },

            Completion::ParamsSubmitted { index, result } => match result {
                Ok(_) => {
                    self.render_circuit();
                    let showing = self.options.as_ref().is_some_and(|view| view.index == index);
                    if showing {
                        self.render_options(index);
                    }
                    Effects::default()
                }
                Err(err) => Effects::failure(Failure::new(request, &err)),
            },
        }
    }

    // -- transitions --------------------------------------------------------

    fn select(&mut self, index: usize) -> Effects {
        let Some(scenario) = self.scenario.as_mut() else {
            return Effects::default();
        };
        if !scenario.select(index) {
            return Effects::default();
        }
        let name = match scenario.step(index) {
            Some(step) => step.name.clone(),
            None => return Effects::default(),
        };

        self.render_circuit();
        self.render_options(index);

        if self.modules.contains(&name) {
            self.render_menu(&name);
            Effects::default()
        } else {
            Effects::request(Request::FetchModule { name })
        }
    }

    /// Mutate the step locally, then post its whole parameter map.
    fn edit(&mut self, index: usize, edit: ParamEdit) -> Effects {
        let Some(step) = self
            .scenario
            .as_mut()
            .and_then(|scenario| scenario.step_mut(index))
        else {
            return Effects::default();
        };

        if let Err(err) = edit.apply(&mut step.params) {
            return Effects::failure(Failure::new(format!("POST /api/edit/{index}"), &err));
        }

        Effects::request(Request::SubmitParams {
            index,
            params: step.params.clone(),
        })
    }

    // -- rendering ----------------------------------------------------------

    fn render_header(&mut self) {
        self.document
            .render(Region::Header, render::header::render(self.status));
    }

    fn render_circuit(&mut self) {
        let Some(scenario) = self.scenario.as_ref() else {
            return;
        };
        let nodes = render::circuit::render(scenario, self.settings.step_height_px);
        self.document.render(Region::Circuit, nodes);
    }

    fn render_options(&mut self, index: usize) {
        let Some(step) = self.scenario.as_ref().and_then(|s| s.step(index)) else {
            return;
        };
        let rendered = render::options::render(step, index);
        self.options = Some(OptionsView {
            index,
            formats: rendered.formats,
        });
        self.document.render(Region::Options, rendered.rows);
    }

    fn render_menu(&mut self, name: &str) {
        let Some(module) = self.modules.get(name) else {
            return;
        };
        let nodes = render::menu::render(name, module);
        self.document.render(Region::Menu, nodes);
    }

    // -- accessors ----------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.scenario.is_some()
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn status(&self) -> Option<bool> {
        self.status
    }

    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn snapshot(&self) -> Snapshot {
        self.document.snapshot()
    }

    pub fn patches_since(&self, since: u64) -> PatchBatch {
        self.document.patches_since(since)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Module, Status, Step};
    use serde_json::json;

    fn loaded() -> Scenario {
        Scenario::new(vec![
            Step::new("source", json!({"pipe": 1}).as_object().unwrap().clone()),
            Step::new("filter", json!({"pipe": 2}).as_object().unwrap().clone()),
        ])
    }

    fn booted() -> Panel {
        let mut panel = Panel::new(PanelSettings::default());
        panel.boot();
        panel.complete(Completion::ScenarioLoaded(Ok(loaded())));
        panel
    }

    #[test]
    fn boot_requests_scenario() {
        let mut panel = Panel::new(PanelSettings::default());
        let effects = panel.boot();
        assert_eq!(effects.requests, vec![Request::LoadScenario]);
        assert!(!panel.is_initialized());
    }

    #[test]
    fn load_initializes_and_polls_status() {
        let mut panel = Panel::new(PanelSettings::default());
        panel.boot();
        let effects = panel.complete(Completion::ScenarioLoaded(Ok(loaded())));
        assert_eq!(
            effects.requests,
            vec![Request::FetchStatus(StatusPurpose::Header)]
        );
        let scenario = panel.scenario().unwrap();
        assert_eq!(scenario.current, None);
        assert!(!scenario.running);
        assert_eq!(panel.document().region(Region::Circuit).len(), 2);
    }

    #[test]
    fn uninitialized_panel_ignores_events() {
        let mut panel = Panel::new(PanelSettings::default());
        panel.boot();
        let effects = panel.complete(Completion::ScenarioLoaded(Err(anyhow::anyhow!("refused"))));
        assert_eq!(effects.failures.len(), 1);

        assert!(panel.handle_event(UiEvent::Toggle).requests.is_empty());
        assert!(
            panel
                .handle_event(UiEvent::Select { step: 0 })
                .requests
                .is_empty()
        );
        assert_eq!(
            panel.tick().requests,
            vec![Request::FetchStatus(StatusPurpose::Header)]
        );
    }

    #[test]
    fn toggle_stops_a_running_loop() {
        let mut panel = booted();
        let effects = panel.handle_event(UiEvent::Toggle);
        assert_eq!(
            effects.requests,
            vec![Request::FetchStatus(StatusPurpose::Toggle)]
        );

        let effects = panel.complete(Completion::Status {
            purpose: StatusPurpose::Toggle,
            result: Ok(Status { status: true }),
        });
        assert_eq!(effects.requests, vec![Request::Stop]);
        assert!(!panel.scenario().unwrap().running);

        let effects = panel.complete(Completion::Switched {
            start: false,
            result: Ok(()),
        });
        assert_eq!(
            effects.requests,
            vec![Request::FetchStatus(StatusPurpose::Header)]
        );
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut panel = booted();
        let effects = panel.handle_event(UiEvent::Select { step: 9 });
        assert!(effects.requests.is_empty());
        assert_eq!(panel.scenario().unwrap().current, None);
    }

    #[test]
    fn cached_module_renders_menu_without_fetch() {
        let mut panel = booted();
        panel.handle_event(UiEvent::Select { step: 1 });
        panel.complete(Completion::ModuleLoaded {
            name: "filter".to_string(),
            result: Ok(Module::default()),
        });

        let effects = panel.handle_event(UiEvent::Select { step: 1 });
        assert!(effects.requests.is_empty());
    }

    #[test]
    fn confirm_without_rendered_row_is_a_no_op() {
        let mut panel = booted();
        let effects = panel.handle_event(UiEvent::ConfirmParam {
            step: 0,
            param: "pipe".to_string(),
            value: "3".to_string(),
        });
        assert!(effects.requests.is_empty());
        assert!(effects.failures.is_empty());
    }

    #[test]
    fn command_line_always_has_separator() {
        let mut panel = booted();
        let effects = panel.handle_event(UiEvent::RunCommand {
            module: "filter".to_string(),
            command: "reset".to_string(),
            args: String::new(),
        });
        assert_eq!(
            effects.requests,
            vec![Request::RunCommand {
                module: "filter".to_string(),
                cmd: "reset ".to_string()
            }]
        );
    }

    #[test]
    fn events_decode_from_page_json() {
        let event: UiEvent = serde_json::from_str(
            r#"{"type":"add_param","step":1,"name":"gain","value":"3","kind":"num"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            UiEvent::AddParam {
                step: 1,
                name: "gain".to_string(),
                value: "3".to_string(),
                kind: NewParamKind::Num
            }
        );
    }
}
