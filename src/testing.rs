//! Recording doubles for the collaborator traits, shared by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ChatError, Result};
use crate::net::NetworkGateway;
use crate::peer::Peer;
use crate::transfer::{FileTransfer, TransferId};
use crate::ui::{MessageSink, UserInterface};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    OfferFile { peer: String, file_name: String, id: TransferId },
    AbortFile { peer: String, file_key: String, file_name: String },
    SendChat(String),
    SendPrivate { peer: String, text: String },
    AnnounceTopic(String),
    AnnounceNick(String),
    AnnounceAway(String),
    AnnounceBack,
}

/// Gateway that records calls and can be told to fail
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    failing: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChatError::network_error("Not connected to the network"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl NetworkGateway for RecordingGateway {
    async fn offer_file(&self, peer: &Peer, transfer: &FileTransfer) -> Result<()> {
        self.record(GatewayCall::OfferFile {
            peer: peer.nick.clone(),
            file_name: transfer.file_name(),
            id: transfer.id(),
        })
    }

    async fn abort_file(&self, peer: &Peer, file_key: &str, file_name: &str) -> Result<()> {
        self.record(GatewayCall::AbortFile {
            peer: peer.nick.clone(),
            file_key: file_key.to_string(),
            file_name: file_name.to_string(),
        })
    }

    async fn send_chat(&self, text: &str) -> Result<()> {
        self.record(GatewayCall::SendChat(text.to_string()))
    }

    async fn send_private(&self, text: &str, peer: &Peer) -> Result<()> {
        self.record(GatewayCall::SendPrivate {
            peer: peer.nick.clone(),
            text: text.to_string(),
        })
    }

    async fn announce_topic(&self, text: &str) -> Result<()> {
        self.record(GatewayCall::AnnounceTopic(text.to_string()))
    }

    async fn announce_nick(&self, nick: &str) -> Result<()> {
        self.record(GatewayCall::AnnounceNick(nick.to_string()))
    }

    async fn announce_away(&self, message: &str) -> Result<()> {
        self.record(GatewayCall::AnnounceAway(message.to_string()))
    }

    async fn announce_back(&self) -> Result<()> {
        self.record(GatewayCall::AnnounceBack)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkLine {
    System(String),
    OwnChat(String),
    OwnPrivate { peer: String, text: String },
}

#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<SinkLine>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<SinkLine> {
        self.lines.lock().unwrap().clone()
    }

    pub fn system_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| match line {
                SinkLine::System(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The only line recorded; panics unless exactly one exists
    pub fn single_line(&self) -> String {
        let lines = self.system_lines();
        assert_eq!(lines.len(), 1, "expected one system line, got {:?}", lines);
        lines[0].clone()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl MessageSink for RecordingSink {
    fn show_system_line(&self, text: &str) {
        self.lines.lock().unwrap().push(SinkLine::System(text.to_string()));
    }

    fn show_own_chat(&self, text: &str) {
        self.lines.lock().unwrap().push(SinkLine::OwnChat(text.to_string()));
    }

    fn show_own_private(&self, peer: &Peer, text: &str) {
        self.lines.lock().unwrap().push(SinkLine::OwnPrivate {
            peer: peer.nick.clone(),
            text: text.to_string(),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    RefreshTopic,
    Clear,
    Shutdown,
    TransferCreated(TransferId),
}

#[derive(Default)]
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl UserInterface for RecordingUi {
    fn refresh_topic_display(&self) {
        self.calls.lock().unwrap().push(UiCall::RefreshTopic);
    }

    fn clear_display(&self) {
        self.calls.lock().unwrap().push(UiCall::Clear);
    }

    fn request_shutdown(&self) {
        self.calls.lock().unwrap().push(UiCall::Shutdown);
    }

    fn notify_transfer_created(&self, transfer: &Arc<FileTransfer>) {
        self.calls.lock().unwrap().push(UiCall::TransferCreated(transfer.id()));
    }
}

/// Scratch directory under the system temp dir, emptied first
pub async fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("lanchat_test_{}", name));
    let _ = tokio::fs::remove_dir_all(&dir).await;
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}
