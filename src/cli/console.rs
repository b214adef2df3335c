//! Console front end
//!
//! Prints chat output to stdout and records the user's wish to quit.

use crate::peer::Peer;
use crate::transfer::FileTransfer;
use crate::ui::{MessageSink, UserInterface};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Prefix for system lines
const SYSTEM_PREFIX: &str = "*** ";

/// Terminal front end for the chat
#[derive(Debug, Default)]
pub struct ConsoleUi {
    /// Set once the user asked to quit
    shutdown: AtomicBool,
}

impl ConsoleUi {
    /// Create a new console front end
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `/quit` has been issued
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Prompt for the next line
    pub fn print_prompt(&self) -> io::Result<()> {
        print!("> ");
        io::stdout().flush()
    }

    fn system_text(text: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", SYSTEM_PREFIX, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl MessageSink for ConsoleUi {
    fn show_system_line(&self, text: &str) {
        println!("{}", Self::system_text(text));
    }

    fn show_own_chat(&self, text: &str) {
        println!("<me> {}", text);
    }

    fn show_own_private(&self, peer: &Peer, text: &str) {
        println!("<me -> {}> {}", peer.nick, text);
    }
}

impl UserInterface for ConsoleUi {
    fn refresh_topic_display(&self) {
        debug!("Topic display refresh requested");
    }

    fn clear_display(&self) {
        // Clear screen and move the cursor home
        print!("\x1b[2J\x1b[1;1H");
        let _ = io::stdout().flush();
    }

    fn request_shutdown(&self) {
        debug!("Shutdown requested");
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn notify_transfer_created(&self, transfer: &Arc<FileTransfer>) {
        debug!("Transfer #{} of '{}' created", transfer.id(), transfer.file_name());
    }
}
