//! User interface seams
//!
//! The interpreter reports through `MessageSink` and asks the front end for
//! display changes through `UserInterface`. Both are implemented by whatever
//! front end hosts the chat.

use std::sync::Arc;

use crate::peer::Peer;
use crate::transfer::FileTransfer;

/// Destination for result lines and echoed messages
pub trait MessageSink: Send + Sync {
    /// A status or result line; may span several lines of text
    fn show_system_line(&self, text: &str);

    /// Echo of a chat line we sent
    fn show_own_chat(&self, text: &str);

    /// Echo of a private line we sent to `peer`
    fn show_own_private(&self, peer: &Peer, text: &str);
}

/// Display requests passed through to the front end
pub trait UserInterface: Send + Sync {
    /// Topic or nick changed; redraw the title
    fn refresh_topic_display(&self);

    /// Wipe the chat view
    fn clear_display(&self);

    /// The user asked to quit
    fn request_shutdown(&self);

    /// A new outbound transfer was registered
    fn notify_transfer_created(&self, transfer: &Arc<FileTransfer>);
}
