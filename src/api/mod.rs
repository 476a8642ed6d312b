//! Hosting interfaces: snapshot intake, processing ticks and publication
//!
//! The transport side hands raw JSON to [`UwbManager::receive_message`]; a separate
//! thread calls [`UwbManager::tick`] on a fixed interval.

pub mod mailbox;
pub mod manager;
pub mod publisher;

pub use mailbox::SnapshotMailbox;
pub use manager::{TickOutcome, UwbManager};
pub use publisher::{ChannelPublisher, LinePublisher, SnapshotPublisher};
