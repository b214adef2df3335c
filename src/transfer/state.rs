//! Transfer state module
//!
//! A `FileTransfer` is shared between the registry, the coordinator and the
//! transport layer. Its mutable part lives in a watch channel so the
//! transport can wait for the user to accept, reject or cancel.

use crate::error::{ChatError, Result};
use crate::peer::{Peer, SessionCode};
use sha1::{Digest, Sha1};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, trace};

/// Transfer id, unique per counterparty peer
pub type TransferId = u32;

/// Which way the file travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    /// We are the sender
    Outbound,
    /// We are the receiver
    Inbound,
}

impl TransferDirection {
    /// Word placed before the counterparty nick in listings
    pub fn preposition(&self) -> &'static str {
        match self {
            TransferDirection::Outbound => "to",
            TransferDirection::Inbound => "from",
        }
    }
}

/// Lifecycle of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Offered, waiting for the receiver to answer
    Offered,
    /// Accepted; bytes are (or are about to be) moving
    Accepted,
    /// Refused by the receiver
    Rejected,
    /// Stopped by the user
    Cancelled,
    /// All bytes arrived
    Completed,
    /// The transport gave up
    Failed,
}

impl TransferStatus {
    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Rejected | TransferStatus::Cancelled | TransferStatus::Completed | TransferStatus::Failed
        )
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            TransferStatus::Offered => "offered",
            TransferStatus::Accepted => "accepted",
            TransferStatus::Rejected => "rejected",
            TransferStatus::Cancelled => "cancelled",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
        };
        write!(f, "{}", word)
    }
}

/// Mutable part of a transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferState {
    pub status: TransferStatus,
    /// Source file for outbound, destination file for inbound
    pub file: PathBuf,
    /// 0 to 100
    pub percent: u8,
    pub bytes_per_sec: u64,
}

/// One file exchange with a remote peer
#[derive(Debug)]
pub struct FileTransfer {
    id: TransferId,
    direction: TransferDirection,
    peer: SessionCode,
    /// Counterparty nick when the transfer was created
    peer_nick: String,
    size: u64,
    /// Identifier of the file used when retracting an offer
    file_key: String,
    state: watch::Sender<TransferState>,
}

impl FileTransfer {
    /// A file we offer to `peer`
    pub fn outbound(id: TransferId, peer: &Peer, file: PathBuf, size: u64) -> Self {
        Self::new(id, TransferDirection::Outbound, peer, file, size)
    }

    /// A file `peer` offers to us, to be saved at `file`
    pub fn inbound(id: TransferId, peer: &Peer, file: PathBuf, size: u64) -> Self {
        Self::new(id, TransferDirection::Inbound, peer, file, size)
    }

    fn new(id: TransferId, direction: TransferDirection, peer: &Peer, file: PathBuf, size: u64) -> Self {
        let file_key = file_key(&file);
        let (state, _) = watch::channel(TransferState {
            status: TransferStatus::Offered,
            file,
            percent: 0,
            bytes_per_sec: 0,
        });

        Self {
            id,
            direction,
            peer: peer.code,
            peer_nick: peer.nick.clone(),
            size,
            file_key,
            state,
        }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// Session code of the counterparty
    pub fn peer(&self) -> SessionCode {
        self.peer
    }

    pub fn peer_nick(&self) -> &str {
        &self.peer_nick
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn status(&self) -> TransferStatus {
        self.state.borrow().status
    }

    pub fn file(&self) -> PathBuf {
        self.state.borrow().file.clone()
    }

    /// File name without directories
    pub fn file_name(&self) -> String {
        let state = self.state.borrow();
        state
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| state.file.display().to_string())
    }

    pub fn percent(&self) -> u8 {
        self.state.borrow().percent
    }

    pub fn bytes_per_sec(&self) -> u64 {
        self.state.borrow().bytes_per_sec
    }

    /// Whether the receiver has accepted the transfer
    pub fn is_accepted(&self) -> bool {
        self.status() == TransferStatus::Accepted
    }

    /// Whether the receiver has yet to answer
    pub fn is_waiting(&self) -> bool {
        self.status() == TransferStatus::Offered
    }

    /// Watch every state change
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state.subscribe()
    }

    /// OFFERED -> ACCEPTED
    pub fn accept(&self) -> Result<()> {
        self.transition(TransferStatus::Accepted)
    }

    /// OFFERED -> REJECTED
    pub fn reject(&self) -> Result<()> {
        self.transition(TransferStatus::Rejected)
    }

    fn transition(&self, to: TransferStatus) -> Result<()> {
        let mut from = TransferStatus::Offered;
        let changed = self.state.send_if_modified(|state| {
            from = state.status;
            if state.status == TransferStatus::Offered {
                state.status = to;
                true
            } else {
                false
            }
        });

        if changed {
            debug!("Transfer #{} with {} is now {}", self.id, self.peer_nick, to);
            Ok(())
        } else {
            Err(ChatError::transfer_error_with_id(
                format!("Can not mark '{}' as {}: it is already {}", self.file_name(), to, from),
                self.id,
            ))
        }
    }

    /// Cancel the transfer unless it already ended. Returns the status it
    /// had before, so calling it twice is harmless.
    pub fn cancel(&self) -> TransferStatus {
        let mut previous = TransferStatus::Offered;
        self.state.send_if_modified(|state| {
            previous = state.status;
            if state.status.is_terminal() {
                false
            } else {
                state.status = TransferStatus::Cancelled;
                true
            }
        });

        trace!("Transfer #{} cancelled (was {})", self.id, previous);
        previous
    }

    /// Point the transfer at another file. Only allowed before acceptance.
    pub fn set_file(&self, file: PathBuf) -> Result<()> {
        let mut status = TransferStatus::Offered;
        let changed = self.state.send_if_modified(|state| {
            status = state.status;
            if state.status == TransferStatus::Offered {
                state.file = file;
                true
            } else {
                false
            }
        });

        if changed {
            Ok(())
        } else {
            Err(ChatError::transfer_error_with_id(
                format!("Can not change the file of a transfer that is {}", status),
                self.id,
            ))
        }
    }

    /// Record transport progress. Ignored unless the transfer is accepted.
    pub fn update_progress(&self, percent: u8, bytes_per_sec: u64) -> bool {
        self.state.send_if_modified(|state| {
            if state.status != TransferStatus::Accepted {
                return false;
            }
            state.percent = percent.min(100);
            state.bytes_per_sec = bytes_per_sec;
            true
        })
    }

    /// Mark the transfer as done. Returns false if it had already ended.
    pub fn finish(&self, success: bool) -> bool {
        self.state.send_if_modified(|state| {
            if state.status.is_terminal() {
                return false;
            }
            if success {
                state.status = TransferStatus::Completed;
                state.percent = 100;
            } else {
                state.status = TransferStatus::Failed;
            }
            state.bytes_per_sec = 0;
            true
        })
    }
}

/// Stable identifier for a file, derived from its path
fn file_key(path: &Path) -> String {
    let mut hasher = Sha1::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> Peer {
        Peer::new("bob", SessionCode(2))
    }

    fn offered() -> FileTransfer {
        FileTransfer::inbound(1, &bob(), PathBuf::from("/tmp/downloads/photo.jpg"), 2048)
    }

    #[test]
    fn test_new_transfer_is_offered() {
        let transfer = offered();
        assert_eq!(transfer.status(), TransferStatus::Offered);
        assert!(transfer.is_waiting());
        assert!(!transfer.is_accepted());
        assert_eq!(transfer.file_name(), "photo.jpg");
        assert_eq!(transfer.peer(), SessionCode(2));
        assert_eq!(transfer.peer_nick(), "bob");
        assert_eq!(transfer.direction().preposition(), "from");
    }

    #[test]
    fn test_file_key_is_stable_hex() {
        let a = offered();
        let b = offered();
        assert_eq!(a.file_key(), b.file_key());
        assert_eq!(a.file_key().len(), 40);
    }

    #[test]
    fn test_accept_only_once() {
        let transfer = offered();
        transfer.accept().unwrap();
        assert!(transfer.is_accepted());
        assert!(transfer.accept().is_err());
        assert!(transfer.reject().is_err());
        assert_eq!(transfer.status(), TransferStatus::Accepted);
    }

    #[test]
    fn test_rejected_is_terminal() {
        let transfer = offered();
        transfer.reject().unwrap();
        assert!(transfer.accept().is_err());
        assert_eq!(transfer.cancel(), TransferStatus::Rejected);
        assert_eq!(transfer.status(), TransferStatus::Rejected);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let transfer = offered();
        transfer.accept().unwrap();
        assert_eq!(transfer.cancel(), TransferStatus::Accepted);
        assert_eq!(transfer.cancel(), TransferStatus::Cancelled);
        assert_eq!(transfer.status(), TransferStatus::Cancelled);
    }

    #[test]
    fn test_set_file_only_before_accept() {
        let transfer = offered();
        transfer.set_file(PathBuf::from("/tmp/downloads/photo_1.jpg")).unwrap();
        assert_eq!(transfer.file_name(), "photo_1.jpg");

        transfer.accept().unwrap();
        assert!(transfer.set_file(PathBuf::from("/tmp/other.jpg")).is_err());
    }

    #[test]
    fn test_progress_requires_acceptance() {
        let transfer = offered();
        assert!(!transfer.update_progress(50, 1024));

        transfer.accept().unwrap();
        assert!(transfer.update_progress(150, 1024));
        assert_eq!(transfer.percent(), 100);
        assert_eq!(transfer.bytes_per_sec(), 1024);
    }

    #[test]
    fn test_finish() {
        let transfer = offered();
        transfer.accept().unwrap();
        assert!(transfer.finish(true));
        assert_eq!(transfer.status(), TransferStatus::Completed);
        assert!(!transfer.finish(false));
    }

    #[tokio::test]
    async fn test_subscriber_sees_acceptance() {
        let transfer = offered();
        let mut rx = transfer.subscribe();

        transfer.accept().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, TransferStatus::Accepted);
    }
}
