//! CLI configuration module
//!
//! Settings for the chat client, built from the command line and an
//! optional JSON file.

use crate::cli::args::CliArgs;
use crate::error::{ChatError, Result};
use crate::peer::is_valid_nick;
use crate::{APP_NAME, APP_VERSION};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default port for incoming private chat messages
pub const DEFAULT_PRIVATE_CHAT_PORT: u16 = 50050;

/// Settings for the chat client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nick of the local user
    pub nick: String,
    /// Directory for received files
    pub download_dir: PathBuf,
    /// Port for incoming private chat messages
    pub private_chat_port: u16,
    /// Private chat turned off
    pub no_private_chat: bool,
    /// Client description shown in /whois
    pub client: String,
    /// Purge a transfer whose offer could not be sent
    pub rollback_failed_offers: bool,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            download_dir: PathBuf::from("./downloads"),
            private_chat_port: DEFAULT_PRIVATE_CHAT_PORT,
            no_private_chat: false,
            client: format!("{} v{}", APP_NAME, APP_VERSION),
            rollback_failed_offers: false,
            verbose: false,
            quiet: false,
        }
    }
}

/// Login name if it makes a valid nick, else a fixed fallback
fn default_nick() -> String {
    std::env::var("USER")
        .ok()
        .filter(|name| is_valid_nick(name))
        .unwrap_or_else(|| "Anonymous".to_string())
}

impl Settings {
    /// Create settings from CLI arguments, on top of the `--config` file if given
    pub fn from_args(args: &CliArgs) -> anyhow::Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(nick) = &args.nick {
            settings.nick = nick.clone();
        }
        if let Some(dir) = &args.download_dir {
            settings.download_dir = dir.clone();
        }
        if let Some(port) = args.private_port {
            settings.private_chat_port = port;
        }

        settings.no_private_chat |= args.no_private_chat;
        settings.rollback_failed_offers |= args.rollback_failed_offers;
        settings.verbose |= args.verbose;
        settings.quiet |= args.quiet;

        Ok(settings)
    }

    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        debug!("Loading settings from {}", path.display());

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        serde_json::from_str(&text).with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if !is_valid_nick(&self.nick) {
            return Err(ChatError::config_error_with_field(
                format!("'{}' is not a valid nick name. (1-10 letters)", self.nick),
                "nick",
            ));
        }

        if self.download_dir.as_os_str().is_empty() {
            return Err(ChatError::config_error_with_field("Download directory cannot be empty", "download_dir"));
        }

        if self.private_chat_enabled() && self.private_chat_port == 0 {
            return Err(ChatError::config_error_with_field(
                "Port cannot be 0 when private chat is enabled",
                "private_chat_port",
            ));
        }

        Ok(())
    }

    pub fn private_chat_enabled(&self) -> bool {
        !self.no_private_chat
    }

    /// Port to advertise to other peers, 0 when private chat is off
    pub fn advertised_private_port(&self) -> u16 {
        if self.private_chat_enabled() {
            self.private_chat_port
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        Settings {
            nick: "kou".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        let settings = Settings::default();
        assert!(is_valid_nick(&settings.nick));
        assert!(!settings.rollback_failed_offers);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_args_overrides() {
        let args = CliArgs {
            nick: Some("kou".to_string()),
            download_dir: Some(PathBuf::from("/tmp/files")),
            private_port: Some(4242),
            rollback_failed_offers: true,
            ..CliArgs::default()
        };

        let settings = Settings::from_args(&args).unwrap();

        assert_eq!(settings.nick, "kou");
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/files"));
        assert_eq!(settings.private_chat_port, 4242);
        assert!(settings.rollback_failed_offers);
        assert!(settings.private_chat_enabled());
    }

    #[test]
    fn test_validate_rejects_bad_nick() {
        let settings = Settings {
            nick: "r2d2".to_string(),
            ..valid()
        };

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("field: nick"));
    }

    #[test]
    fn test_validate_rejects_empty_download_dir() {
        let settings = Settings {
            download_dir: PathBuf::new(),
            ..valid()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_port_only_matters_with_private_chat() {
        let mut settings = Settings {
            private_chat_port: 0,
            ..valid()
        };
        assert!(settings.validate().is_err());

        settings.no_private_chat = true;
        assert!(settings.validate().is_ok());
        assert_eq!(settings.advertised_private_port(), 0);
    }

    #[test]
    fn test_load_partial_file_and_override() {
        let path = std::env::temp_dir().join("lanchat_test_settings.json");
        std::fs::write(&path, r#"{ "nick": "alice", "no_private_chat": true }"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.nick, "alice");
        assert!(loaded.no_private_chat);
        assert_eq!(loaded.private_chat_port, DEFAULT_PRIVATE_CHAT_PORT);

        let args = CliArgs {
            nick: Some("bob".to_string()),
            config: Some(path.clone()),
            ..CliArgs::default()
        };
        let settings = Settings::from_args(&args).unwrap();
        assert_eq!(settings.nick, "bob");
        assert!(settings.no_private_chat);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_bad_json() {
        let path = std::env::temp_dir().join("lanchat_test_settings_bad.json");
        std::fs::write(&path, "{ nick").unwrap();

        assert!(Settings::load(&path).is_err());

        let _ = std::fs::remove_file(path);
    }
}
