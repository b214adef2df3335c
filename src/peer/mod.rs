//! Peer management module
//!
//! Holds peer records and the directory they live in.

pub mod directory;
pub mod state;

// Re-export main types
pub use directory::PeerDirectory;
pub use state::{is_valid_nick, Peer, SessionCode, MAX_NICK_LENGTH};
