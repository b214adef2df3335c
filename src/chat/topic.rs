//! Topic module
//!
//! The current shared subject of the chat.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// A chat topic. An empty text means there is no topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Topic text, stored trimmed
    text: String,
    /// Nick of whoever set it
    nick: String,
    /// When it was set
    time: DateTime<Utc>,
}

impl Topic {
    /// Create a topic, trimming the text
    pub fn new(text: &str, nick: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            text: text.trim().to_string(),
            nick: nick.into(),
            time,
        }
    }

    /// The "no topic" value
    pub fn empty() -> Self {
        Self::new("", "", Utc::now())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Whether a topic is set
    pub fn is_set(&self) -> bool {
        !self.text.is_empty()
    }

    /// Whether `text` would leave the topic unchanged
    pub fn matches(&self, text: &str) -> bool {
        self.text.trim() == text.trim()
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::empty()
    }
}

/// Holder for the current topic, shared between the interpreter and the
/// network-event path
#[derive(Debug, Default)]
pub struct SharedTopic {
    inner: RwLock<Topic>,
}

impl SharedTopic {
    /// Snapshot of the current topic
    pub async fn get(&self) -> Topic {
        self.inner.read().await.clone()
    }

    /// Replace the topic wholesale
    pub async fn set(&self, topic: Topic) {
        debug!("Topic set to '{}' by {}", topic.text(), topic.nick());
        *self.inner.write().await = topic;
    }
}
