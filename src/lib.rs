//! lanchat
//!
//! Command interpreter and file transfer coordinator for a serverless
//! chat on the local network.

pub mod chat;
pub mod cli;
pub mod command;
pub mod error;
pub mod net;
pub mod peer;
pub mod transfer;
pub mod ui;

#[cfg(test)]
mod testing;

/// Product name shown in help and about output
pub const APP_NAME: &str = "LanChat";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub use error::{ChatError, Result};

pub use chat::{SharedTopic, Topic};
pub use cli::{CliArgs, ConsoleUi, Settings};
pub use command::{CommandInterpreter, Verb};
pub use net::{EventApplier, NetworkEvent, NetworkGateway, OfflineGateway};
pub use peer::{Peer, PeerDirectory, SessionCode};
pub use transfer::{
    AcceptOutcome, CancelOutcome, FileTransfer, FileTransferCoordinator, TransferDirection, TransferId,
    TransferRegistry, TransferStatus,
};
pub use ui::{MessageSink, UserInterface};
