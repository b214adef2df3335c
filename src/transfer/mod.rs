//! File transfer module
//!
//! Transfer records, the registry that owns them, and the coordinator that
//! moves them through their lifecycle.

pub mod coordinator;
pub mod naming;
pub mod registry;
pub mod state;

// Re-export main types
pub use coordinator::{AcceptOutcome, CancelOutcome, FileTransferCoordinator};
pub use registry::TransferRegistry;
pub use state::{FileTransfer, TransferDirection, TransferId, TransferState, TransferStatus};
