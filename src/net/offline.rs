//! Gateway used when no transport is attached
//!
//! Logs every action it is asked to perform. Private messages and file
//! offers fail because nobody could ever receive them.

use async_trait::async_trait;
use tracing::info;

use crate::error::{ChatError, Result};
use crate::net::NetworkGateway;
use crate::peer::Peer;
use crate::transfer::FileTransfer;

/// Gateway without a network behind it
#[derive(Debug, Default)]
pub struct OfflineGateway;

impl OfflineGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NetworkGateway for OfflineGateway {
    async fn offer_file(&self, peer: &Peer, transfer: &FileTransfer) -> Result<()> {
        Err(ChatError::network_error_with_peer(
            format!("Can not offer '{}' while offline", transfer.file_name()),
            peer.nick.clone(),
        ))
    }

    async fn abort_file(&self, peer: &Peer, file_key: &str, file_name: &str) -> Result<()> {
        info!("offline: abort '{}' ({}) for {}", file_name, file_key, peer.nick);
        Ok(())
    }

    async fn send_chat(&self, text: &str) -> Result<()> {
        info!("offline: chat '{}'", text);
        Ok(())
    }

    async fn send_private(&self, _text: &str, peer: &Peer) -> Result<()> {
        Err(ChatError::network_error_with_peer(
            "Can not send private messages while offline",
            peer.nick.clone(),
        ))
    }

    async fn announce_topic(&self, text: &str) -> Result<()> {
        info!("offline: topic '{}'", text);
        Ok(())
    }

    async fn announce_nick(&self, nick: &str) -> Result<()> {
        info!("offline: nick '{}'", nick);
        Ok(())
    }

    async fn announce_away(&self, message: &str) -> Result<()> {
        info!("offline: away '{}'", message);
        Ok(())
    }

    async fn announce_back(&self) -> Result<()> {
        info!("offline: back");
        Ok(())
    }
}
