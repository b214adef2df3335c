//! Network module
//!
//! The outgoing gateway seam and the incoming event path.

pub mod events;
pub mod gateway;
pub mod offline;

pub use events::{EventApplier, NetworkEvent};
pub use gateway::NetworkGateway;
pub use offline::OfflineGateway;
