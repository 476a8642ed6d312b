//! Single-slot snapshot mailbox
//!
//! The receiving thread posts, the ticking thread takes. A newer snapshot replaces one
//! that has not been taken yet, so the solver only ever sees the latest state.

use std::sync::Mutex;

use crate::core::types::Network;

#[derive(Debug, Default)]
pub struct SnapshotMailbox {
    slot: Mutex<Option<Network>>,
}

impl SnapshotMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `network`, returning true when an untaken snapshot was overwritten
    pub fn post(&self, network: Network) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => slot.replace(network).is_some(),
            Err(poisoned) => poisoned.into_inner().replace(network).is_some(),
        }
    }

    /// Remove and return the pending snapshot, if any
    pub fn take(&self) -> Option<Network> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}
