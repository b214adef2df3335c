//! Error types for the chat core
//!
//! Every failure here is recoverable: command handlers turn an error into a
//! single system line and leave shared state untouched.

use std::fmt;

/// Result alias used throughout the chat core
pub type Result<T> = std::result::Result<T, ChatError>;

/// Recoverable error raised while executing a command
#[derive(Debug, Clone)]
pub enum ChatError {
    /// A command could not be carried out
    CommandError {
        message: String,
    },

    /// The network gateway refused or failed an action
    NetworkError {
        message: String,
        peer: Option<String>,
    },

    /// Local file system problems
    StorageError {
        message: String,
        path: Option<String>,
        source: Option<String>,
    },

    /// Settings problems
    ConfigError {
        message: String,
        field: Option<String>,
    },

    /// A transfer is no longer in a state that permits the request
    TransferError {
        message: String,
        id: Option<u32>,
    },
}

impl ChatError {
    /// Create a new CommandError
    pub fn command_error(message: impl Into<String>) -> Self {
        ChatError::CommandError {
            message: message.into(),
        }
    }

    /// Create a new NetworkError
    pub fn network_error(message: impl Into<String>) -> Self {
        ChatError::NetworkError {
            message: message.into(),
            peer: None,
        }
    }

    /// Create a new NetworkError naming the peer involved
    pub fn network_error_with_peer(message: impl Into<String>, peer: impl Into<String>) -> Self {
        ChatError::NetworkError {
            message: message.into(),
            peer: Some(peer.into()),
        }
    }

    /// Create a new StorageError with path
    pub fn storage_error_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        ChatError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a new StorageError with path and source
    pub fn storage_error_full(message: impl Into<String>, path: impl Into<String>, source: impl Into<String>) -> Self {
        ChatError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new ConfigError with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ChatError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new TransferError
    pub fn transfer_error(message: impl Into<String>) -> Self {
        ChatError::TransferError {
            message: message.into(),
            id: None,
        }
    }

    /// Create a new TransferError for a specific transfer id
    pub fn transfer_error_with_id(message: impl Into<String>, id: u32) -> Self {
        ChatError::TransferError {
            message: message.into(),
            id: Some(id),
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::CommandError { message } => write!(f, "{}", message),
            ChatError::NetworkError { message, peer } => {
                if let Some(p) = peer {
                    write!(f, "Network error: {} (peer: {})", message, p)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            ChatError::StorageError { message, path, source } => {
                match (path, source) {
                    (Some(p), Some(s)) => write!(f, "Storage error: {} (path: {}, source: {})", message, p, s),
                    (Some(p), None) => write!(f, "Storage error: {} (path: {})", message, p),
                    (None, Some(s)) => write!(f, "Storage error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Storage error: {}", message),
                }
            }
            ChatError::ConfigError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
            ChatError::TransferError { message, id } => {
                if let Some(id) = id {
                    write!(f, "Transfer error: {} (#{})", message, id)
                } else {
                    write!(f, "Transfer error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for ChatError {}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::storage_error_full(err.to_string(), "unknown".to_string(), err.kind().to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::ConfigError {
            message: format!("Failed to parse JSON data: {}", err),
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_is_plain_message() {
        let err = ChatError::command_error("You can not go away while not connected");
        assert_eq!(err.to_string(), "You can not go away while not connected");
    }

    #[test]
    fn test_network_error_with_peer() {
        let err = ChatError::network_error_with_peer("Offer refused", "bob");
        assert!(err.to_string().contains("Network error"));
        assert!(err.to_string().contains("Offer refused"));
        assert!(err.to_string().contains("bob"));
    }

    #[test]
    fn test_storage_error_with_path() {
        let err = ChatError::storage_error_with_path("File not found", "/path/to/file");
        assert!(err.to_string().contains("Storage error"));
        assert!(err.to_string().contains("/path/to/file"));
    }

    #[test]
    fn test_transfer_error_with_id() {
        let err = ChatError::transfer_error_with_id("Transfer is gone", 7);
        assert_eq!(err.to_string(), "Transfer error: Transfer is gone (#7)");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ChatError = io_err.into();
        assert!(matches!(err, ChatError::StorageError { .. }));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nick").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(err.to_string().starts_with("Config error: Failed to parse JSON data"));
    }

    #[test]
    fn test_config_error_with_field() {
        let err = ChatError::config_error_with_field("Invalid value", "nick");
        assert!(err.to_string().contains("Config error"));
        assert!(err.to_string().contains("nick"));
    }
}
