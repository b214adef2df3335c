//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the chat client
#[derive(Debug, Default, Parser)]
#[command(name = "lanchat")]
#[command(about = "Serverless chat and file sharing for the local network", long_about = None)]
pub struct CliArgs {
    /// Nick to use in the chat (1-10 letters)
    #[arg(short, long)]
    pub nick: Option<String>,

    /// Directory for received files
    #[arg(short, long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Port for incoming private chat messages
    #[arg(short, long)]
    pub private_port: Option<u16>,

    /// Disable private chat
    #[arg(long)]
    pub no_private_chat: bool,

    /// Forget a file offer when it could not be sent
    #[arg(long)]
    pub rollback_failed_offers: bool,

    /// JSON settings file, overridden by the other flags
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}
