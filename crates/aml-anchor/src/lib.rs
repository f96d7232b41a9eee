//! Best-effort external anchoring for sealed audit blocks.
//!
//! The local chain is the source of truth; anchoring mirrors each sealed
//! record to an external evaluation store for independent verification.
//! Failures here never block or unwind sealing.

pub mod error;
pub mod network;
pub mod publisher;

pub use error::{AnchorError, AnchorResult};
pub use network::{AnchorNetwork, MemoryAnchorNetwork};
pub use publisher::{AnchorPublisher, PublisherConfig, ReconcileReport};
