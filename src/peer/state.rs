//! Peer state module
//!
//! Defines the chat participant record and its session identity.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;

/// Longest nick the chat accepts
pub const MAX_NICK_LENGTH: usize = 10;

/// Stable identity of a peer's session, independent of its nick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionCode(pub u32);

impl SessionCode {
    /// Generate a random session code
    pub fn random() -> Self {
        SessionCode(rand::random::<u32>())
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check a nick against the naming rule: 1 to 10 letters
pub fn is_valid_nick(nick: &str) -> bool {
    let count = nick.chars().count();
    (1..=MAX_NICK_LENGTH).contains(&count) && nick.chars().all(char::is_alphabetic)
}

/// A chat participant, remote or local
#[derive(Debug, Clone)]
pub struct Peer {
    /// Session identity
    pub code: SessionCode,
    /// Current nick, unique in the directory
    pub nick: String,
    /// Network address, when known
    pub ip_address: Option<IpAddr>,
    /// Resolved host name, when known
    pub host_name: Option<String>,
    /// Away flag
    pub away: bool,
    /// Away message, empty when not away
    pub away_message: String,
    /// Peer is typing
    pub writing: bool,
    /// Last time the peer reported activity
    pub last_idle: Option<DateTime<Utc>>,
    /// Port for private chat, 0 when unsupported
    pub private_chat_port: u16,
    /// Client description
    pub client: String,
    /// Operating system description
    pub operating_system: String,
    /// When the peer logged on
    pub logon_time: DateTime<Utc>,
    /// Marks the local user
    pub is_local: bool,
}

impl Peer {
    /// Create a new remote peer
    pub fn new(nick: impl Into<String>, code: SessionCode) -> Self {
        Self {
            code,
            nick: nick.into(),
            ip_address: None,
            host_name: None,
            away: false,
            away_message: String::new(),
            writing: false,
            last_idle: None,
            private_chat_port: 0,
            client: String::new(),
            operating_system: String::new(),
            logon_time: Utc::now(),
            is_local: false,
        }
    }

    /// Create the record for the local user
    pub fn local(nick: impl Into<String>, code: SessionCode) -> Self {
        Self {
            is_local: true,
            ..Self::new(nick, code)
        }
    }

    /// Set the network address
    pub fn with_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(ip_address);
        self
    }

    /// Set the private chat port
    pub fn with_private_chat_port(mut self, port: u16) -> Self {
        self.private_chat_port = port;
        self
    }

    /// Set client and operating system descriptions
    pub fn with_client(mut self, client: impl Into<String>, operating_system: impl Into<String>) -> Self {
        self.client = client.into();
        self.operating_system = operating_system.into();
        self
    }

    /// Whether the peer can receive private messages
    pub fn supports_private_chat(&self) -> bool {
        self.private_chat_port > 0
    }

    /// Mark the peer as away
    pub fn go_away(&mut self, message: impl Into<String>) {
        self.away = true;
        self.away_message = message.into();
    }

    /// Clear the away state
    pub fn come_back(&mut self) {
        self.away = false;
        self.away_message.clear();
    }

    /// Display ordering: nicks compared without regard to case
    pub fn display_cmp(&self, other: &Peer) -> Ordering {
        self.nick.to_lowercase().cmp(&other.nick.to_lowercase())
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nick)
    }
}
