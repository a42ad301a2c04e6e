//! CLI command implementations for switchboard.
//!
//! Provides subcommand handlers for:
//! - `switchboard status|start|stop|toggle`: the remote loop
//! - `switchboard show`: circuit layout of the loaded scenario
//! - `switchboard help <module>`: a module's commands
//! - `switchboard cmd <module> <command> [args...]`: run one command
//! - `switchboard edit <index> set|unset ...`: edit one step parameter
//! - `switchboard config show|init|set|reset`: configuration management
//! - `switchboard failures`: recently logged request failures

use anyhow::Result;
use colored::Colorize;

use crate::backend::Backend;
use crate::config;
use crate::console;
use crate::render::circuit;
use crate::scenario::params::{NewParamKind, ParamEdit, ParamFormat, display_value};
use crate::scenario::{CommandRequest, Module, Scenario};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// What `switchboard edit` does to the step's parameter map.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Overwrite or insert `key`. Without an explicit kind an existing key
    /// keeps its current format and a new key is stored as a string.
    Set {
        key: String,
        value: String,
        kind: Option<NewParamKind>,
    },
    Unset {
        key: String,
    },
}

// ---------------------------------------------------------------------------
// switchboard status / start / stop / toggle
// ---------------------------------------------------------------------------

pub fn run_status(backend: &dyn Backend) -> Result<()> {
    let status = backend.status()?;
    println!("{} {}", "Loop:".bold(), colorize_status(status.status));
    Ok(())
}

pub fn run_start(backend: &dyn Backend) -> Result<()> {
    backend.start()?;
    println!("{} Start requested", "✓".green().bold());
    run_status(backend)
}

pub fn run_stop(backend: &dyn Backend) -> Result<()> {
    backend.stop()?;
    println!("{} Stop requested", "✓".green().bold());
    run_status(backend)
}

/// Read the status, issue the opposite command, then read it again.
pub fn run_toggle(backend: &dyn Backend) -> Result<()> {
    if backend.status()?.status {
        run_stop(backend)
    } else {
        run_start(backend)
    }
}

// ---------------------------------------------------------------------------
// switchboard show
// ---------------------------------------------------------------------------

/// Print the scenario's steps with their circuit placement.
pub fn run_show(backend: &dyn Backend, format: OutputFormat, step_height: u32) -> Result<()> {
    let scenario = backend.get_conf()?;

    if scenario.queue.is_empty() {
        println!("{}", "The scenario has no steps.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_show_json(&scenario, step_height)?,
        OutputFormat::Table => print_show_table(&scenario, step_height),
    }
    Ok(())
}

fn print_show_table(scenario: &Scenario, step_height: u32) {
    let placements = circuit::layout(&scenario.queue, step_height);

    println!("{}", "Scenario Circuit".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:>3} {:<20} {:>6} {:>8} {:>8} {:>7}",
        "#", "Step", "Pipe", "Left", "Width", "Top"
    );
    println!("  {}", "-".repeat(58));

    for (i, (step, place)) in scenario.queue.iter().zip(&placements).enumerate() {
        let pipe = step
            .pipe()
            .map(|p| display_value(&serde_json::json!(p)))
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "  {:>3} {:<20} {:>6} {:>7.1}% {:>7.1}% {:>5}px",
            i,
            truncate(&step.name, 20),
            pipe,
            place.left_pct,
            place.width_pct,
            place.top_px,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_show_json(scenario: &Scenario, step_height: u32) -> Result<()> {
    let placements = circuit::layout(&scenario.queue, step_height);
    let value = serde_json::json!({
        "lane_width_pct": circuit::lane_width(&scenario.queue),
        "steps": scenario.queue.iter().zip(&placements).map(|(step, place)| serde_json::json!({
            "name": step.name,
            "params": step.params,
            "placement": place,
        })).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// switchboard help / cmd
// ---------------------------------------------------------------------------

pub fn run_help(backend: &dyn Backend, module: &str, format: OutputFormat) -> Result<()> {
    let commands = backend.help(module)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&commands)?),
        OutputFormat::Table => print_help_table(module, &commands),
    }
    Ok(())
}

fn print_help_table(module: &str, commands: &Module) {
    println!("{} {}", "Commands of".bold().cyan(), module.bold());
    if commands.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }
    for (name, command) in commands.iter() {
        let args = if command.param_count == 0 {
            String::new()
        } else {
            format!("<{}>", command.descr_param)
        };
        println!(
            "  {:<16} {:<20} {}",
            name.bold(),
            args,
            command.descr.dimmed()
        );
    }
}

/// Run `command` with the space-joined `args` and print the response.
pub fn run_cmd(backend: &dyn Backend, module: &str, command: &str, args: &[String]) -> Result<()> {
    let request = CommandRequest::new(command, &args.join(" "));
    let output = backend.cmd(module, &request.cmd)?;
    println!("{}", output.response);
    Ok(())
}

// ---------------------------------------------------------------------------
// switchboard edit
// ---------------------------------------------------------------------------

/// Fetch the scenario, edit one step's parameters, and post them back.
pub fn run_edit(backend: &dyn Backend, index: usize, action: EditAction) -> Result<()> {
    let mut scenario = backend.get_conf()?;
    let Some(step) = scenario.step_mut(index) else {
        println!(
            "{}",
            format!("No step at index {index}; nothing to edit.").yellow()
        );
        return Ok(());
    };

    let Some(edit) = param_edit(&step.params, action) else {
        println!(
            "{}",
            "Boolean parameters cannot be edited without --type.".yellow()
        );
        return Ok(());
    };
    edit.apply(&mut step.params)?;

    backend.edit(index, &step.params)?;
    println!(
        "{} Updated step {} ({})",
        "✓".green().bold(),
        index,
        step.name.bold()
    );
    Ok(())
}

/// Translate a CLI edit into the panel's edit operation. `None` when the
/// existing value's format has no parser.
fn param_edit(params: &crate::scenario::Params, action: EditAction) -> Option<ParamEdit> {
    match action {
        EditAction::Unset { key } => Some(ParamEdit::Delete { param: key }),
        EditAction::Set {
            key,
            value,
            kind: Some(kind),
        } => Some(ParamEdit::Add {
            param: key,
            kind,
            text: value,
        }),
        EditAction::Set {
            key,
            value,
            kind: None,
        } => match params.get(&key).map(ParamFormat::of) {
            Some(ParamFormat::Boolean) => None,
            Some(format) => Some(ParamEdit::Update {
                param: key,
                format,
                text: value,
            }),
            None => Some(ParamEdit::Add {
                param: key,
                kind: NewParamKind::Str,
                text: value,
            }),
        },
    }
}

// ---------------------------------------------------------------------------
// switchboard config
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective switchboard configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let exists = |path: Option<std::path::PathBuf>| path.map(|p| p.exists()).unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(
        exists(config::global_config_file()),
        "~/.switchboard/config.toml",
    );
    print_source(exists(config::project_config_file()), ".switchboard.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "SWITCHBOARD_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(found: bool, label: &str) {
    if found {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// switchboard failures
// ---------------------------------------------------------------------------

pub fn run_failures(limit: usize) -> Result<()> {
    let Some(path) = console::failure_log_path() else {
        println!("{}", "No home directory; failure log unavailable.".yellow());
        return Ok(());
    };

    let entries = console::read_recent(&path, limit);
    if entries.is_empty() {
        println!("{}", "No request failures logged.".green());
        return Ok(());
    }

    println!("{}", "Recent request failures".bold().cyan());
    for entry in entries {
        println!(
            "  {} {} {}",
            entry.timestamp.dimmed(),
            entry.request.bold(),
            entry.error.red()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn colorize_status(running: bool) -> colored::ColoredString {
    if running {
        "running".green().bold()
    } else {
        "stopped".yellow().bold()
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
