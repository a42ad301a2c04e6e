//! switchboard: a control panel for a remote scenario runner.

pub mod backend;
pub mod cli;
pub mod config;
pub mod console;
pub mod panel;
pub mod render;
pub mod scenario;
pub mod server;
pub mod view;
