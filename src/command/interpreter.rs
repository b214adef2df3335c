//! Command interpreter
//!
//! Turns one line of user input into validated side effects on the peer
//! directory, the transfer registry and the topic. Every handler checks its
//! preconditions before it touches shared state or the network, and every
//! outcome ends up as a line in the message sink; nothing is returned to
//! the caller.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

use crate::chat::{SharedTopic, Topic};
use crate::cli::Settings;
use crate::command::format::{format_bytes, format_elapsed, format_speed, format_topic_time};
use crate::command::verb::{classify, help_text, Command, Verb, COMMAND_MARKER};
use crate::error::{ChatError, Result};
use crate::net::NetworkGateway;
use crate::peer::{is_valid_nick, Peer, PeerDirectory};
use crate::transfer::{
    AcceptOutcome, CancelOutcome, FileTransfer, FileTransferCoordinator, TransferDirection, TransferId,
    TransferRegistry,
};
use crate::ui::{MessageSink, UserInterface};
use crate::{APP_DESCRIPTION, APP_NAME, APP_VERSION};

/// Parses and executes chat commands
pub struct CommandInterpreter {
    peers: Arc<PeerDirectory>,
    transfers: Arc<TransferRegistry>,
    topic: Arc<SharedTopic>,
    coordinator: FileTransferCoordinator,
    gateway: Arc<dyn NetworkGateway>,
    sink: Arc<dyn MessageSink>,
    ui: Arc<dyn UserInterface>,
    /// Cleared when private chat is disabled in the settings
    private_chat_enabled: bool,
}

impl CommandInterpreter {
    /// Create an interpreter over the shared state and its collaborators
    pub fn new(
        peers: Arc<PeerDirectory>,
        transfers: Arc<TransferRegistry>,
        topic: Arc<SharedTopic>,
        gateway: Arc<dyn NetworkGateway>,
        sink: Arc<dyn MessageSink>,
        ui: Arc<dyn UserInterface>,
    ) -> Self {
        let coordinator =
            FileTransferCoordinator::new(peers.clone(), transfers.clone(), gateway.clone(), ui.clone());

        Self {
            peers,
            transfers,
            topic,
            coordinator,
            gateway,
            sink,
            ui,
            private_chat_enabled: true,
        }
    }

    /// Apply the settings that affect command behaviour
    pub fn with_settings(self, settings: &Settings) -> Self {
        Self {
            coordinator: self
                .coordinator
                .with_rollback_failed_offers(settings.rollback_failed_offers),
            private_chat_enabled: !settings.no_private_chat,
            ..self
        }
    }

    /// Route a line typed by the user: commands to `parse`, anything else
    /// to the main chat
    pub async fn handle_line(&self, line: &str) {
        if line.starts_with(COMMAND_MARKER) {
            self.parse(line).await;
        } else if !line.trim().is_empty() {
            self.send_chat(line).await;
        }
    }

    /// Parse a command line and execute it
    pub async fn parse(&self, line: &str) {
        match classify(line) {
            Command::Run(verb, args) => {
                debug!("Running /{} with args '{}'", verb.name(), args);
                self.run(verb, args).await;
            }
            Command::Escaped(text) => self.send_chat(text).await,
            Command::Unknown(verb) => self.cmd_unknown(verb),
        }
    }

    async fn run(&self, verb: Verb, args: &str) {
        match verb {
            Verb::About => self.cmd_about(),
            Verb::Away => self.cmd_away(args).await,
            Verb::Back => self.cmd_back().await,
            Verb::Cancel => self.cmd_cancel(args).await,
            Verb::Clear => self.ui.clear_display(),
            Verb::Help => self.report(help_text(APP_NAME)),
            Verb::Msg => self.cmd_msg(args).await,
            Verb::Nick => self.cmd_nick(args).await,
            Verb::Quit => self.ui.request_shutdown(),
            Verb::Receive => self.cmd_receive(args).await,
            Verb::Reject => self.cmd_reject(args).await,
            Verb::Send => self.cmd_send(args).await,
            Verb::Topic => self.cmd_topic(args).await,
            Verb::Transfers => self.cmd_transfers().await,
            Verb::Users => self.cmd_users().await,
            Verb::Whois => self.cmd_whois(args).await,
        }
    }

    fn report(&self, text: impl AsRef<str>) {
        self.sink.show_system_line(text.as_ref());
    }

    fn report_error(&self, error: ChatError) {
        warn!("Command failed: {}", error);
        self.report(error.to_string());
    }

    /// Command: `/topic <optional new topic>`.
    ///
    /// Without arguments, shows the topic. A lone space removes it.
    async fn cmd_topic(&self, args: &str) {
        if !args.is_empty() {
            if let Err(e) = self.fix_topic(args).await {
                self.report_error(e);
            }
            return;
        }

        let topic = self.topic.get().await;

        if topic.is_set() {
            self.report(format!(
                "Topic is: {} (set by {} at {})",
                topic.text(),
                topic.nick(),
                format_topic_time(topic.time())
            ));
        } else {
            self.report("No topic set");
        }
    }

    /// Change the topic. Empty text removes it; unchanged text does nothing.
    pub async fn fix_topic(&self, new_topic: &str) -> Result<()> {
        let trimmed = new_topic.trim();

        if self.topic.get().await.matches(trimmed) {
            debug!("Topic unchanged, nothing to do");
            return Ok(());
        }

        self.gateway.announce_topic(trimmed).await?;

        let me = self.peers.local_user().await;
        self.topic.set(Topic::new(trimmed, me.nick, Utc::now())).await;

        if trimmed.is_empty() {
            self.report("You removed the topic");
        } else {
            self.report(format!("You changed the topic to: {}", trimmed));
        }

        self.ui.refresh_topic_display();
        Ok(())
    }

    /// Command: `/away <away message>`.
    async fn cmd_away(&self, args: &str) {
        let me = self.peers.local_user().await;

        if me.away {
            self.report(format!("/away - you are already away: '{}'", me.away_message));
            return;
        }

        let message = args.trim();

        if message.is_empty() {
            self.report("/away - missing argument <away message>");
            return;
        }

        let result: Result<Peer> = async {
            self.gateway.announce_away(message).await?;
            self.peers
                .update(me.code, |p| p.go_away(message))
                .await
                .ok_or_else(|| ChatError::command_error("The local user is missing"))
        }
        .await;

        match result {
            Ok(_) => self.report(format!("You went away: {}", message)),
            Err(e) => self.report_error(e),
        }
    }

    /// Command: `/back`.
    async fn cmd_back(&self) {
        let me = self.peers.local_user().await;

        if !me.away {
            self.report("/back - you are not away");
            return;
        }

        let result: Result<Peer> = async {
            self.gateway.announce_back().await?;
            self.peers
                .update(me.code, |p| p.come_back())
                .await
                .ok_or_else(|| ChatError::command_error("The local user is missing"))
        }
        .await;

        match result {
            Ok(_) => self.report("You came back"),
            Err(e) => self.report_error(e),
        }
    }

    /// Command: `/whois <nick>`.
    async fn cmd_whois(&self, args: &str) {
        let Some(nick) = args.split_whitespace().next() else {
            self.report("/whois - missing argument <nick>");
            return;
        };

        let Some(user) = self.peers.resolve(nick).await else {
            self.report(format!("/whois - no such user '{}'", nick));
            return;
        };

        let mut info = format!("/whois - {}", user.nick);

        if user.away {
            info.push_str(" (Away)");
        }

        let address = user
            .ip_address
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info.push_str(&format!(":\nIP address: {}", address));

        if let Some(host) = &user.host_name {
            info.push_str(&format!("\nHost name: {}", host));
        }

        info.push_str(&format!(
            "\nClient: {}\nOperating System: {}\nOnline: {}",
            user.client,
            user.operating_system,
            format_elapsed(user.logon_time)
        ));

        if user.away {
            info.push_str(&format!("\nAway message: {}", user.away_message));
        }

        self.report(info);
    }

    /// Command: `/send <nick> <file>`. The file name may contain spaces.
    async fn cmd_send(&self, args: &str) {
        let Some((nick, file)) = split_target(args) else {
            self.report("/send - missing arguments <nick> <file>");
            return;
        };

        let Some(user) = self.peers.resolve(nick).await else {
            self.report(format!("/send - no such user '{}'", nick));
            return;
        };

        if self.peers.is_local(&user) {
            self.report("/send - no point in doing that!");
            return;
        }

        let path = Path::new(file);

        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => self.send_file(&user, path).await,
            _ => self.report(format!("/send - no such file '{}'", file)),
        }
    }

    /// Offer a file to a peer and report the attempt
    pub async fn send_file(&self, peer: &Peer, file: &Path) {
        match self.coordinator.initiate_send(peer, file).await {
            Ok(transfer) => self.report(format!(
                "Trying to send the file {} (#{}) [{}] to {}",
                transfer.file_name(),
                transfer.id(),
                format_bytes(transfer.size()),
                peer.nick
            )),
            Err(e) => self.report_error(e),
        }
    }

    /// Shared validation for `/receive`, `/reject` and `/cancel`:
    /// exactly two arguments, a known remote peer, a numeric id.
    async fn transfer_target(&self, verb: Verb, args: &str) -> Option<(Peer, TransferId)> {
        let name = verb.name();
        let tokens: Vec<&str> = args.split_whitespace().collect();

        if tokens.len() != 2 {
            self.report(format!("/{} - wrong number of arguments: <nick> <id>", name));
            return None;
        }

        let nick = tokens[0];

        let Some(user) = self.peers.resolve(nick).await else {
            self.report(format!("/{} - no such user '{}'", name, nick));
            return None;
        };

        if self.peers.is_local(&user) {
            self.report(format!("/{} - no point in doing that!", name));
            return None;
        }

        let Ok(id) = tokens[1].parse::<TransferId>() else {
            self.report(format!("/{} - invalid file id argument: '{}'", name, tokens[1]));
            return None;
        };

        Some((user, id))
    }

    /// Command: `/receive <nick> <id>`.
    async fn cmd_receive(&self, args: &str) {
        let Some((user, id)) = self.transfer_target(Verb::Receive, args).await else {
            return;
        };

        let Some(transfer) = self.transfers.find_inbound(user.code, id).await else {
            self.report(format!("/receive - no file with id {} offered by {}", id, user.nick));
            return;
        };

        if transfer.is_accepted() {
            self.report(format!(
                "/receive - already receiving '{}' from {}",
                transfer.file_name(),
                user.nick
            ));
            return;
        }

        match self.coordinator.accept(&transfer).await {
            Ok(AcceptOutcome::Accepted) => self.report(format!(
                "/receive - accepted '{}' from {}",
                transfer.file_name(),
                user.nick
            )),
            Ok(AcceptOutcome::Renamed { from, to }) => self.report(format!(
                "/receive - file '{}' already exists - renaming to '{}'",
                from, to
            )),
            Err(e) => self.report_error(e),
        }
    }

    /// Command: `/reject <nick> <id>`.
    async fn cmd_reject(&self, args: &str) {
        let Some((user, id)) = self.transfer_target(Verb::Reject, args).await else {
            return;
        };

        let Some(transfer) = self.transfers.find_inbound(user.code, id).await else {
            self.report(format!("/reject - no file with id {} offered by {}", id, user.nick));
            return;
        };

        if transfer.is_accepted() {
            self.report(format!(
                "/reject - already receiving '{}' from {}",
                transfer.file_name(),
                user.nick
            ));
            return;
        }

        match self.coordinator.reject(&transfer).await {
            Ok(()) => self.report(format!("/reject - rejected '{}' from {}", transfer.file_name(), user.nick)),
            Err(e) => self.report_error(e),
        }
    }

    /// Command: `/cancel <nick> <id>`.
    ///
    /// Incoming offers that were never accepted must be rejected instead.
    async fn cmd_cancel(&self, args: &str) {
        let Some((user, id)) = self.transfer_target(Verb::Cancel, args).await else {
            return;
        };

        let Some(transfer) = self.transfers.find(user.code, id).await else {
            self.report(format!("/cancel - no file transfer with id {} going on with {}", id, user.nick));
            return;
        };

        if transfer.direction() == TransferDirection::Inbound && !transfer.is_accepted() {
            self.report(format!(
                "/cancel - transfer of '{}' from {} has not started yet",
                transfer.file_name(),
                user.nick
            ));
            return;
        }

        self.cancel_file_transfer(&transfer).await;
    }

    /// Cancel a transfer, even one the other side has not answered yet,
    /// and report the result
    pub async fn cancel_file_transfer(&self, transfer: &Arc<FileTransfer>) {
        let nick = self
            .peers
            .get(transfer.peer())
            .await
            .map(|p| p.nick)
            .unwrap_or_else(|| transfer.peer_nick().to_string());
        let name = transfer.file_name();
        let preposition = transfer.direction().preposition();

        match self.coordinator.cancel(transfer).await {
            CancelOutcome::Retracted { notified: true } => {
                self.report(format!("You cancelled sending of {} to {}", name, nick));
            }
            CancelOutcome::Retracted { notified: false } => {
                self.report(format!(
                    "You cancelled sending of {} to {}, but {} could not be notified",
                    name, nick, nick
                ));
            }
            CancelOutcome::Stopped => {
                self.report(format!("You cancelled the transfer of {} {} {}", name, preposition, nick));
            }
            CancelOutcome::AlreadyEnded(status) => {
                self.report(format!("The transfer of {} {} {} is already {}", name, preposition, nick, status));
            }
        }
    }

    /// Command: `/msg <nick> <msg>`.
    async fn cmd_msg(&self, args: &str) {
        let Some((nick, text)) = split_target(args) else {
            self.report("/msg - missing arguments <nick> <msg>");
            return;
        };

        let Some(user) = self.peers.resolve(nick).await else {
            self.report(format!("/msg - no such user '{}'", nick));
            return;
        };

        if self.peers.is_local(&user) {
            self.report("/msg - no point in doing that!");
        } else if !self.private_chat_enabled {
            self.report("/msg - can't send private chat message when private chat is disabled");
        } else if !user.supports_private_chat() {
            self.report(format!("/msg - {} can't receive private chat messages", user.nick));
        } else {
            match self.gateway.send_private(text, &user).await {
                Ok(()) => self.sink.show_own_private(&user, text),
                Err(e) => self.report_error(e),
            }
        }
    }

    /// Command: `/nick <new nick>`.
    async fn cmd_nick(&self, args: &str) {
        let Some(nick) = args.split_whitespace().next() else {
            self.report("/nick - missing argument <nick>");
            return;
        };

        let me = self.peers.local_user().await;

        if nick == me.nick {
            self.report(format!("/nick - you are already called '{}'", nick));
        } else if self.peers.is_nick_taken(nick).await {
            self.report(format!("/nick - '{}' is in use by someone else", nick));
        } else if !is_valid_nick(nick) {
            self.report(format!("/nick - '{}' is not a valid nick name. (1-10 letters)", nick));
        } else {
            let result: Result<Peer> = async {
                self.gateway.announce_nick(nick).await?;
                self.peers.rename(me.code, nick).await
            }
            .await;

            match result {
                Ok(renamed) => {
                    self.report(format!("You changed nick to {}", renamed.nick));
                    self.ui.refresh_topic_display();
                }
                Err(e) => self.report_error(e),
            }
        }
    }

    /// Command: `/users`.
    async fn cmd_users(&self) {
        let nicks: Vec<String> = self.peers.all().await.into_iter().map(|p| p.nick).collect();
        self.report(format!("Users: {}", nicks.join(", ")));
    }

    /// Command: `/transfers`.
    async fn cmd_transfers(&self) {
        let sending = self.transfers.list(TransferDirection::Outbound).await;
        let receiving = self.transfers.list(TransferDirection::Inbound).await;

        let mut info = String::new();

        if !sending.is_empty() {
            info.push_str("\n- Sending:");
            for transfer in &sending {
                info.push_str(&self.transfer_line(transfer).await);
            }
        }

        if !receiving.is_empty() {
            info.push_str("\n- Receiving:");
            for transfer in &receiving {
                info.push_str(&self.transfer_line(transfer).await);
            }
        }

        if info.is_empty() {
            info.push_str(" no active file transfers");
        }

        self.report(format!("File transfers:{}", info));
    }

    async fn transfer_line(&self, transfer: &FileTransfer) -> String {
        let nick = self
            .peers
            .get(transfer.peer())
            .await
            .map(|p| p.nick)
            .unwrap_or_else(|| transfer.peer_nick().to_string());

        format!(
            "\n  #{} {} [{}] ({}%, {}) {} {}",
            transfer.id(),
            transfer.file_name(),
            format_bytes(transfer.size()),
            transfer.percent(),
            format_speed(transfer.bytes_per_sec()),
            transfer.direction().preposition(),
            nick
        )
    }

    /// Command: `/about`.
    fn cmd_about(&self) {
        self.report(format!("{} v{} - {}", APP_NAME, APP_VERSION, APP_DESCRIPTION));
    }

    /// Send a line to the main chat and echo it locally
    pub async fn send_chat(&self, text: &str) {
        match self.gateway.send_chat(text).await {
            Ok(()) => self.sink.show_own_chat(text),
            Err(e) => self.report_error(e),
        }
    }

    /// Command: anything unrecognized.
    fn cmd_unknown(&self, verb: &str) {
        debug!("Unknown command '{}'", verb);
        self.report(format!(
            "Unknown command '{}'. Type {}help for a list of commands",
            verb, COMMAND_MARKER
        ));
    }
}

/// Split `<nick> <rest>` at the first whitespace. The rest is trimmed at
/// both ends but keeps its inner spacing.
fn split_target(args: &str) -> Option<(&str, &str)> {
    let args = args.trim_start();
    let end = args.find(char::is_whitespace)?;
    let rest = args[end..].trim();

    if rest.is_empty() {
        None
    } else {
        Some((&args[..end], rest))
    }
}
