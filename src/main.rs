use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use switchboard::backend::HttpBackend;
use switchboard::cli::{self, EditAction, OutputFormat};
use switchboard::config;
use switchboard::console::Reporter;
use switchboard::panel::{Panel, PanelSettings, runtime};
use switchboard::scenario::params::NewParamKind;
use switchboard::server;

#[derive(Debug, Parser)]
#[command(name = "switchboard")]
#[command(about = "Control panel for a remote scenario runner")]
#[command(disable_help_subcommand = true)]
struct App {
    /// Backend base URL (overrides config)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the interactive panel in a browser
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        listen: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_browser: bool,
    },
    /// Show whether the remote loop is running
    Status,
    /// Start the remote loop
    Start,
    /// Stop the remote loop
    Stop,
    /// Start the loop if stopped, stop it if running
    Toggle,
    /// Show the scenario's steps and their circuit placement
    Show {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the commands a module exposes
    Help {
        module: String,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Run one command against a module
    Cmd {
        module: String,
        command: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Edit one parameter of the step at INDEX and post the step back
    Edit {
        index: usize,
        #[command(subcommand)]
        action: EditCommand,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Show recently logged request failures
    Failures {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum EditCommand {
    /// Set KEY to VALUE
    Set {
        key: String,
        value: String,
        /// Value type: json, str, num (default: keep the existing type)
        #[arg(long = "type")]
        kind: Option<NewParamKind>,
    },
    /// Remove KEY
    Unset { key: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `panel.status_poll_ms 500`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();
    if let Some(url) = app.backend {
        cfg.backend.url = url;
    }
    let backend = HttpBackend::from_config(&cfg.backend);

    match app.command {
        Commands::Serve { listen, no_browser } => {
            let addr = listen.unwrap_or_else(|| cfg.panel.listen.clone());
            let panel = Panel::new(PanelSettings::from(&cfg.panel));
            let handle = runtime::spawn(
                panel,
                Arc::new(backend),
                Duration::from_millis(cfg.panel.status_poll_ms.max(1)),
                Reporter::from_config(&cfg.logging),
            );
            server::serve(&addr, handle, cfg.panel.open_browser && !no_browser)
        }
        Commands::Status => cli::run_status(&backend),
        Commands::Start => cli::run_start(&backend),
        Commands::Stop => cli::run_stop(&backend),
        Commands::Toggle => cli::run_toggle(&backend),
        Commands::Show { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_show(&backend, fmt, cfg.panel.step_height_px)
        }
        Commands::Help { module, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_help(&backend, &module, fmt)
        }
        Commands::Cmd {
            module,
            command,
            args,
        } => cli::run_cmd(&backend, &module, &command, &args),
        Commands::Edit { index, action } => {
            let action = match action {
                EditCommand::Set { key, value, kind } => EditAction::Set { key, value, kind },
                EditCommand::Unset { key } => EditAction::Unset { key },
            };
            cli::run_edit(&backend, index, action)
        }
        Commands::Config { action } => match action {
            ConfigCommand::Show => cli::run_config_show(),
            ConfigCommand::Init { force } => cli::run_config_init(force),
            ConfigCommand::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommand::Reset => cli::run_config_reset(),
        },
        Commands::Failures { limit } => cli::run_failures(limit),
    }
}
