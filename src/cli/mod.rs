//! CLI module
//!
//! Command-line interface for the console chat client.

pub mod args;
pub mod config;
pub mod console;

pub use args::CliArgs;
pub use config::Settings;
pub use console::ConsoleUi;
