//! Network event path
//!
//! The transport decodes incoming traffic into `NetworkEvent`s and hands
//! them to an `EventApplier`, which is the only writer of peer presence,
//! remote topic changes and inbound offers. It runs on its own tasks,
//! concurrently with the command interpreter.

use crate::chat::{SharedTopic, Topic};
use crate::error::{ChatError, Result};
use crate::peer::{Peer, PeerDirectory, SessionCode};
use crate::transfer::{FileTransfer, TransferId, TransferRegistry};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something the network told us
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A peer announced itself
    PeerJoined(Peer),
    /// A peer logged off or timed out
    PeerLeft(SessionCode),
    NickChanged { peer: SessionCode, nick: String },
    /// `None` means the peer came back
    AwayChanged { peer: SessionCode, message: Option<String> },
    WritingChanged { peer: SessionCode, writing: bool },
    TopicChanged(Topic),
    /// A peer offers us a file
    FileOffered { peer: SessionCode, file_name: String, size: u64 },
    /// A peer withdrew an offer it made to us
    FileOfferWithdrawn { peer: SessionCode, file_name: String },
    /// A peer accepted one of our offers
    OfferAccepted { peer: SessionCode, id: TransferId },
    /// A peer refused one of our offers
    OfferRejected { peer: SessionCode, id: TransferId },
    TransferProgress { peer: SessionCode, id: TransferId, percent: u8, bytes_per_sec: u64 },
    TransferFinished { peer: SessionCode, id: TransferId, success: bool },
}

/// Applies network events to the shared registries
pub struct EventApplier {
    peers: Arc<PeerDirectory>,
    transfers: Arc<TransferRegistry>,
    topic: Arc<SharedTopic>,
    /// Where inbound files are saved
    download_dir: PathBuf,
}

impl EventApplier {
    pub fn new(
        peers: Arc<PeerDirectory>,
        transfers: Arc<TransferRegistry>,
        topic: Arc<SharedTopic>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            peers,
            transfers,
            topic,
            download_dir,
        }
    }

    /// Apply one event. Events about unknown peers or transfers are errors
    /// the caller may log and drop.
    pub async fn apply(&self, event: NetworkEvent) -> Result<()> {
        debug!("Applying network event: {:?}", event);

        match event {
            NetworkEvent::PeerJoined(peer) => {
                if peer.code == self.peers.local_code() {
                    return Ok(());
                }
                self.peers.add(peer).await
            }
            NetworkEvent::PeerLeft(code) => {
                let peer = self.peers.remove(code).await.ok_or_else(|| unknown_peer(code))?;
                for transfer in self.transfers.remove_peer(code).await {
                    transfer.finish(false);
                }
                info!("{} left the chat", peer.nick);
                Ok(())
            }
            NetworkEvent::NickChanged { peer, nick } => {
                self.peers.rename(peer, &nick).await?;
                Ok(())
            }
            NetworkEvent::AwayChanged { peer, message } => {
                self.peers
                    .update(peer, |p| match message {
                        Some(message) => p.go_away(message),
                        None => p.come_back(),
                    })
                    .await
                    .ok_or_else(|| unknown_peer(peer))?;
                Ok(())
            }
            NetworkEvent::WritingChanged { peer, writing } => {
                self.peers
                    .update(peer, |p| {
                        p.writing = writing;
                        p.last_idle = Some(Utc::now());
                    })
                    .await
                    .ok_or_else(|| unknown_peer(peer))?;
                Ok(())
            }
            NetworkEvent::TopicChanged(topic) => {
                self.topic.set(topic).await;
                Ok(())
            }
            NetworkEvent::FileOffered { peer, file_name, size } => {
                self.register_offer(peer, &file_name, size).await.map(|_| ())
            }
            NetworkEvent::FileOfferWithdrawn { peer, file_name } => {
                let transfers = self.transfers.all().await;
                let withdrawn = transfers
                    .iter()
                    .find(|t| t.peer() == peer && t.is_waiting() && t.file_name() == file_name)
                    .ok_or_else(|| ChatError::transfer_error(format!("No pending offer of '{}'", file_name)))?;
                withdrawn.cancel();
                self.transfers.remove(withdrawn).await;
                Ok(())
            }
            NetworkEvent::OfferAccepted { peer, id } => self.outbound(peer, id).await?.accept(),
            NetworkEvent::OfferRejected { peer, id } => {
                let transfer = self.outbound(peer, id).await?;
                transfer.reject()?;
                self.transfers.remove(&transfer).await;
                Ok(())
            }
            NetworkEvent::TransferProgress { peer, id, percent, bytes_per_sec } => {
                let transfer = self
                    .transfers
                    .find(peer, id)
                    .await
                    .ok_or_else(|| unknown_transfer(id))?;
                transfer.update_progress(percent, bytes_per_sec);
                Ok(())
            }
            NetworkEvent::TransferFinished { peer, id, success } => {
                let transfers = self.transfers.all().await;
                let transfer = transfers
                    .iter()
                    .find(|t| t.peer() == peer && t.id() == id)
                    .ok_or_else(|| unknown_transfer(id))?;
                transfer.finish(success);
                self.transfers.remove(transfer).await;
                Ok(())
            }
        }
    }

    /// Register an inbound offer, returning the new transfer
    pub async fn register_offer(&self, peer: SessionCode, file_name: &str, size: u64) -> Result<Arc<FileTransfer>> {
        let sender = self.peers.get(peer).await.ok_or_else(|| unknown_peer(peer))?;

        // Only the last path component is trusted
        let name = std::path::Path::new(file_name)
            .file_name()
            .ok_or_else(|| ChatError::transfer_error(format!("Invalid file name '{}'", file_name)))?;

        let transfer = self
            .transfers
            .register_inbound(&sender, self.download_dir.join(name), size)
            .await;
        info!("{} offers '{}' (#{})", sender.nick, transfer.file_name(), transfer.id());

        Ok(transfer)
    }

    async fn outbound(&self, peer: SessionCode, id: TransferId) -> Result<Arc<FileTransfer>> {
        self.transfers.find_outbound(peer, id).await.ok_or_else(|| {
            warn!("Event for unknown outbound transfer #{} with {}", id, peer);
            unknown_transfer(id)
        })
    }
}

fn unknown_peer(code: SessionCode) -> ChatError {
    ChatError::network_error_with_peer("Event from unknown peer", code.to_string())
}

fn unknown_transfer(id: TransferId) -> ChatError {
    ChatError::transfer_error_with_id("No such transfer", id)
}
