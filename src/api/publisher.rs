//! Publication sinks for processed snapshots

use std::io::Write;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::core::types::Network;
use crate::validation::error::PositioningError;

/// Destination for published snapshots
pub trait SnapshotPublisher: Send {
    fn publish(&mut self, network: &Network) -> Result<(), PositioningError>;
}

/// Writes each snapshot as one line of JSON
pub struct LinePublisher<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> LinePublisher<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SnapshotPublisher for LinePublisher<W> {
    fn publish(&mut self, network: &Network) -> Result<(), PositioningError> {
        let payload = network.to_json()?;
        log::debug!("Publishing JSON payload: {}", payload);

        writeln!(self.writer, "{}", payload)
            .and_then(|_| self.writer.flush())
            .map_err(|e| PositioningError::Publish { reason: e.to_string() })
    }
}

/// Hands snapshots to another thread over a channel
pub struct ChannelPublisher {
    sender: Sender<Network>,
}

impl ChannelPublisher {
    pub fn new(sender: Sender<Network>) -> Self {
        Self { sender }
    }

    /// Publisher plus the receiving end of its channel
    pub fn channel() -> (Self, Receiver<Network>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

impl SnapshotPublisher for ChannelPublisher {
    fn publish(&mut self, network: &Network) -> Result<(), PositioningError> {
        self.sender
            .send(network.clone())
            .map_err(|_| PositioningError::Publish {
                reason: "receiver disconnected".to_string(),
            })
    }
}
