//! Network gateway abstraction
//!
//! The chat core never touches sockets. Every outgoing network action goes
//! through this trait, so the transport can be swapped or faked without the
//! interpreter knowing.

use async_trait::async_trait;

use crate::error::Result;
use crate::peer::Peer;
use crate::transfer::FileTransfer;

/// Outgoing network actions
///
/// Implementations either fail fast or hand the work to the transport and
/// return; callers never wait for delivery.
#[async_trait]
pub trait NetworkGateway: Send + Sync {
    // ==================== File Transfers ====================

    /// Offer a file to a peer
    async fn offer_file(&self, peer: &Peer, transfer: &FileTransfer) -> Result<()>;

    /// Retract an offer the peer has not answered yet
    async fn abort_file(&self, peer: &Peer, file_key: &str, file_name: &str) -> Result<()>;

    // ==================== Messages ====================

    /// Send a line to the main chat
    async fn send_chat(&self, text: &str) -> Result<()>;

    /// Send a private line to one peer
    async fn send_private(&self, text: &str, peer: &Peer) -> Result<()>;

    // ==================== Announcements ====================

    /// Announce a new topic; empty text removes it
    async fn announce_topic(&self, text: &str) -> Result<()>;

    /// Announce our new nick
    async fn announce_nick(&self, nick: &str) -> Result<()>;

    /// Announce that we went away
    async fn announce_away(&self, message: &str) -> Result<()>;

    /// Announce that we are back
    async fn announce_back(&self) -> Result<()>;
}
