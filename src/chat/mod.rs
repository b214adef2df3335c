//! Chat state module
//!
//! Shared chat-wide state that is not tied to a single peer.

pub mod topic;

pub use topic::{SharedTopic, Topic};
