//! Transfer registry module
//!
//! Owns the list of file transfers and hands out ids. Lookups only see live
//! transfers: once a transfer is rejected, cancelled or finished it is no
//! longer offered to commands, even while the transport still holds it.

use crate::peer::{Peer, SessionCode};
use crate::transfer::{FileTransfer, TransferDirection, TransferId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, trace};

/// Registry of file transfers
#[derive(Default)]
pub struct TransferRegistry {
    /// Transfers in the order they were registered
    transfers: RwLock<Vec<Arc<FileTransfer>>>,
    /// Next id per counterparty, shared by both directions
    next_ids: RwLock<HashMap<SessionCode, TransferId>>,
}

impl TransferRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    async fn next_id(&self, peer: SessionCode) -> TransferId {
        let mut next_ids = self.next_ids.write().await;
        let next = next_ids.entry(peer).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    /// Register a file we offer to `peer`
    pub async fn register_outbound(&self, peer: &Peer, file: PathBuf, size: u64) -> Arc<FileTransfer> {
        let id = self.next_id(peer.code).await;
        let transfer = Arc::new(FileTransfer::outbound(id, peer, file, size));
        self.insert(transfer.clone()).await;
        transfer
    }

    /// Register a file `peer` offers to us
    pub async fn register_inbound(&self, peer: &Peer, file: PathBuf, size: u64) -> Arc<FileTransfer> {
        let id = self.next_id(peer.code).await;
        let transfer = Arc::new(FileTransfer::inbound(id, peer, file, size));
        self.insert(transfer.clone()).await;
        transfer
    }

    async fn insert(&self, transfer: Arc<FileTransfer>) {
        let mut transfers = self.transfers.write().await;
        debug!(
            "Registered {:?} transfer #{} of '{}' with {} (total: {})",
            transfer.direction(),
            transfer.id(),
            transfer.file_name(),
            transfer.peer_nick(),
            transfers.len() + 1
        );
        transfers.push(transfer);
    }

    /// Remove a transfer. Returns false if it was not registered.
    pub async fn remove(&self, transfer: &Arc<FileTransfer>) -> bool {
        let mut transfers = self.transfers.write().await;
        let before = transfers.len();
        transfers.retain(|t| !Arc::ptr_eq(t, transfer));
        let removed = transfers.len() < before;

        if removed {
            info!("Removed transfer #{} of '{}' (remaining: {})", transfer.id(), transfer.file_name(), transfers.len());
        } else {
            trace!("Transfer #{} was not registered", transfer.id());
        }

        removed
    }

    /// Remove every transfer with `peer`, returning them
    pub async fn remove_peer(&self, peer: SessionCode) -> Vec<Arc<FileTransfer>> {
        let mut transfers = self.transfers.write().await;
        let (gone, kept): (Vec<_>, Vec<_>) = transfers.drain(..).partition(|t| t.peer() == peer);
        *transfers = kept;
        gone
    }

    /// Live transfer with `peer` and `id`, in either direction
    pub async fn find(&self, peer: SessionCode, id: TransferId) -> Option<Arc<FileTransfer>> {
        let transfers = self.transfers.read().await;
        transfers
            .iter()
            .find(|t| t.peer() == peer && t.id() == id && !t.status().is_terminal())
            .cloned()
    }

    /// Live transfer offered to us by `peer`
    pub async fn find_inbound(&self, peer: SessionCode, id: TransferId) -> Option<Arc<FileTransfer>> {
        self.find(peer, id)
            .await
            .filter(|t| t.direction() == TransferDirection::Inbound)
    }

    /// Live transfer we offered to `peer`
    pub async fn find_outbound(&self, peer: SessionCode, id: TransferId) -> Option<Arc<FileTransfer>> {
        self.find(peer, id)
            .await
            .filter(|t| t.direction() == TransferDirection::Outbound)
    }

    /// Live transfers going one way, in registration order
    pub async fn list(&self, direction: TransferDirection) -> Vec<Arc<FileTransfer>> {
        let transfers = self.transfers.read().await;
        transfers
            .iter()
            .filter(|t| t.direction() == direction && !t.status().is_terminal())
            .cloned()
            .collect()
    }

    /// Every registered transfer, live or not
    pub async fn all(&self) -> Vec<Arc<FileTransfer>> {
        self.transfers.read().await.clone()
    }

    /// Number of registered transfers
    pub async fn len(&self) -> usize {
        self.transfers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transfers.read().await.is_empty()
    }
}
