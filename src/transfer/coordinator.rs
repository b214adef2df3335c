//! File transfer coordinator
//!
//! Drives the transfer state machine:
//!
//! ```text
//! OFFERED --receive--> ACCEPTED --cancel--> CANCELLED (stays registered)
//! OFFERED --reject---> REJECTED
//! OFFERED --cancel---> CANCELLED, purged, abort notice sent (outbound only)
//! ```
//!
//! Byte transport is not handled here; the coordinator only changes the
//! metadata the transport watches.

use crate::error::{ChatError, Result};
use crate::net::NetworkGateway;
use crate::peer::{Peer, PeerDirectory};
use crate::transfer::naming::incremented_path;
use crate::transfer::{FileTransfer, TransferDirection, TransferRegistry, TransferStatus};
use crate::ui::UserInterface;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// What accepting an offer did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Accepted with the offered file name
    Accepted,
    /// The destination existed, so the file will be saved under a new name
    Renamed { from: String, to: String },
}

/// What cancelling a transfer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// An unanswered offer of ours was withdrawn and purged
    Retracted {
        /// Whether the abort notice reached the gateway
        notified: bool,
    },
    /// A running transfer was stopped; the transport finishes the teardown
    Stopped,
    /// The transfer had already ended with this status
    AlreadyEnded(TransferStatus),
}

/// Owns the lifecycle of file transfers
pub struct FileTransferCoordinator {
    peers: Arc<PeerDirectory>,
    transfers: Arc<TransferRegistry>,
    gateway: Arc<dyn NetworkGateway>,
    ui: Arc<dyn UserInterface>,
    /// Purge a transfer whose offer could not be sent
    rollback_failed_offers: bool,
}

impl FileTransferCoordinator {
    /// Create a new coordinator
    pub fn new(
        peers: Arc<PeerDirectory>,
        transfers: Arc<TransferRegistry>,
        gateway: Arc<dyn NetworkGateway>,
        ui: Arc<dyn UserInterface>,
    ) -> Self {
        Self {
            peers,
            transfers,
            gateway,
            ui,
            rollback_failed_offers: false,
        }
    }

    /// Choose whether failed offers are purged from the registry
    pub fn with_rollback_failed_offers(mut self, rollback: bool) -> Self {
        self.rollback_failed_offers = rollback;
        self
    }

    /// Offer `file` to `peer`.
    ///
    /// The transfer is registered before the offer goes out. When the offer
    /// fails it stays registered unless rollback is enabled.
    pub async fn initiate_send(&self, peer: &Peer, file: &Path) -> Result<Arc<FileTransfer>> {
        if self.peers.is_local(peer) {
            return Err(ChatError::command_error("Can not send a file to yourself"));
        }

        if self.peers.get(peer.code).await.is_none() {
            return Err(Self::peer_gone(peer));
        }

        let metadata = fs::metadata(file).await.map_err(|e| {
            ChatError::storage_error_full("No such file", file.display().to_string(), e.to_string())
        })?;

        if !metadata.is_file() {
            return Err(ChatError::storage_error_with_path("Not a regular file", file.display().to_string()));
        }

        let transfer = self
            .transfers
            .register_outbound(peer, file.to_path_buf(), metadata.len())
            .await;

        // The peer may have left while the file was checked
        if self.peers.get(peer.code).await.is_none() {
            transfer.cancel();
            self.transfers.remove(&transfer).await;
            return Err(Self::peer_gone(peer));
        }

        if let Err(e) = self.gateway.offer_file(peer, &transfer).await {
            warn!("Failed to offer '{}' to {}: {}", transfer.file_name(), peer.nick, e);

            if self.rollback_failed_offers {
                transfer.cancel();
                self.transfers.remove(&transfer).await;
            } else {
                self.ui.notify_transfer_created(&transfer);
            }

            return Err(e);
        }

        info!("Offered '{}' (#{}) to {}", transfer.file_name(), transfer.id(), peer.nick);
        self.ui.notify_transfer_created(&transfer);

        Ok(transfer)
    }

    /// Accept an offer, renaming the destination if it already exists
    pub async fn accept(&self, transfer: &Arc<FileTransfer>) -> Result<AcceptOutcome> {
        Self::require_inbound(transfer)?;

        let file = transfer.file();
        let mut outcome = AcceptOutcome::Accepted;

        if fs::try_exists(&file).await.unwrap_or(false) {
            let renamed = incremented_path(&file).await;
            let from = transfer.file_name();
            transfer.set_file(renamed)?;
            let to = transfer.file_name();
            debug!("Destination '{}' exists, saving as '{}'", from, to);
            outcome = AcceptOutcome::Renamed { from, to };
        }

        transfer.accept()?;
        info!("Accepted '{}' (#{}) from {}", transfer.file_name(), transfer.id(), transfer.peer_nick());

        Ok(outcome)
    }

    /// Refuse an offer
    pub async fn reject(&self, transfer: &Arc<FileTransfer>) -> Result<()> {
        Self::require_inbound(transfer)?;
        transfer.reject()?;
        self.transfers.remove(transfer).await;
        info!("Rejected '{}' (#{}) from {}", transfer.file_name(), transfer.id(), transfer.peer_nick());
        Ok(())
    }

    /// Cancel a transfer in any state. Safe to call more than once.
    pub async fn cancel(&self, transfer: &Arc<FileTransfer>) -> CancelOutcome {
        let previous = transfer.cancel();

        match (transfer.direction(), previous) {
            (TransferDirection::Outbound, TransferStatus::Offered) => {
                self.transfers.remove(transfer).await;
                let notified = self.send_abort(transfer).await;
                info!("Retracted offer of '{}' to {}", transfer.file_name(), transfer.peer_nick());
                CancelOutcome::Retracted { notified }
            }
            (_, TransferStatus::Offered) | (_, TransferStatus::Accepted) => {
                info!("Cancelled transfer of '{}' with {}", transfer.file_name(), transfer.peer_nick());
                CancelOutcome::Stopped
            }
            (_, status) => {
                debug!("Transfer #{} already {}, nothing to cancel", transfer.id(), status);
                CancelOutcome::AlreadyEnded(status)
            }
        }
    }

    async fn send_abort(&self, transfer: &FileTransfer) -> bool {
        let Some(peer) = self.peers.get(transfer.peer()).await else {
            warn!("Can not retract '{}': {} is gone", transfer.file_name(), transfer.peer_nick());
            return false;
        };

        match self
            .gateway
            .abort_file(&peer, transfer.file_key(), &transfer.file_name())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send abort notice for '{}' to {}: {}", transfer.file_name(), peer.nick, e);
                false
            }
        }
    }

    fn peer_gone(peer: &Peer) -> ChatError {
        warn!("Can not offer a file to {}: no longer in the chat", peer.nick);
        ChatError::command_error(format!("{} is no longer in the chat", peer.nick))
    }

    fn require_inbound(transfer: &FileTransfer) -> Result<()> {
        if transfer.direction() == TransferDirection::Inbound {
            Ok(())
        } else {
            Err(ChatError::transfer_error_with_id(
                "Only incoming transfers can be answered",
                transfer.id(),
            ))
        }
    }
}
