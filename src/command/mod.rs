//! Command module
//!
//! Classifies `/verb args` lines and executes them against the chat state.

pub mod format;
pub mod interpreter;
pub mod verb;

pub use interpreter::CommandInterpreter;
pub use verb::{classify, help_text, Command, Verb, COMMAND_MARKER};
