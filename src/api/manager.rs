//! Hosting glue between the transport and the solver
//!
//! `receive_message` runs on the transport thread and only parses and posts into the
//! mailbox. `tick` runs on the processing thread: it takes the newest snapshot, solves
//! it, and publishes the filtered result. A tick that finds a cycle already running
//! returns immediately instead of waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::mailbox::SnapshotMailbox;
use crate::api::publisher::SnapshotPublisher;
use crate::core::types::{Network, UwbNode};
use crate::processing::solver::{CycleReport, PositionSolver};
use crate::utils::monitor::HealthMonitor;
use crate::validation::error::PositioningError;

/// Result of one processing tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No snapshot waiting
    Idle,
    /// A cycle was already running
    Busy,
    /// Snapshot solved and published
    Processed(CycleReport),
    /// Cycle could not run; the last published output stands
    Failed(PositioningError),
}

/// Clears the busy flag when dropped
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct UwbManager {
    solver: PositionSolver,
    mailbox: SnapshotMailbox,
    publisher: Mutex<Box<dyn SnapshotPublisher>>,
    busy: AtomicBool,
    last_good: Mutex<Option<Network>>,
    health: Arc<HealthMonitor>,
}

impl UwbManager {
    pub fn new(solver: PositionSolver, publisher: Box<dyn SnapshotPublisher>, health: Arc<HealthMonitor>) -> Self {
        if solver.beacons().is_empty() {
            log::info!(
                "No beacons configured, expecting anchors in the snapshots with positionKnown = true and latLonAlt set"
            );
        } else {
            log::info!("Initialized {} beacons from configuration", solver.beacons().len());
        }

        Self {
            solver,
            mailbox: SnapshotMailbox::new(),
            publisher: Mutex::new(publisher),
            busy: AtomicBool::new(false),
            last_good: Mutex::new(None),
            health,
        }
    }

    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn solver(&self) -> &PositionSolver {
        &self.solver
    }

    /// Parse a JSON snapshot and queue it for the next tick
    pub fn receive_message(&self, payload: &str) -> Result<(), PositioningError> {
        let network = Network::from_json(payload).map_err(|e| {
            log::error!("Failed to parse message into UWB network: {}", e);
            e
        })?;

        log::info!("Parsed message into UWB network. Found {} UWBs.", network.len());
        if log::log_enabled!(log::Level::Debug) {
            for node in &network.uwbs {
                log::debug!("  {}", describe_node(node));
            }
        }

        self.receive(network);
        Ok(())
    }

    /// Queue an already-parsed snapshot for the next tick
    pub fn receive(&self, network: Network) {
        if self.mailbox.post(network) {
            log::debug!("Replaced an unprocessed snapshot with a newer one");
            self.health.record_dropped_snapshot();
        }
    }

    /// True while a received snapshot is waiting for a tick
    pub fn has_pending(&self) -> bool {
        !self.mailbox.is_empty()
    }

    /// Process the pending snapshot, if any
    pub fn tick(&self) -> TickOutcome {
        let Some(_guard) = self.try_begin() else {
            log::debug!("Cycle already running, skipping tick");
            self.health.record_busy_skip();
            return TickOutcome::Busy;
        };

        let Some(mut network) = self.mailbox.take() else {
            return TickOutcome::Idle;
        };

        match self.solver.run(&mut network) {
            Ok(report) => {
                self.health.record_cycle(network.len());
                self.health.set_beacon_count(network.known_count());

                let outgoing = network.publishable();
                log::info!("Sending network with {} UWBs.", outgoing.len());
                if let Err(e) = self.publish(&outgoing) {
                    log::error!("{}", e);
                }

                self.store_last_good(network);
                TickOutcome::Processed(report)
            }
            Err(e) => {
                self.health.record_failure();
                TickOutcome::Failed(e)
            }
        }
    }

    /// Full network from the last successful cycle
    pub fn last_good(&self) -> Option<Network> {
        match self.last_good.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard { flag: &self.busy })
    }

    fn publish(&self, network: &Network) -> Result<(), PositioningError> {
        let mut publisher = self.publisher.lock().map_err(|_| PositioningError::Publish {
            reason: "publisher lock poisoned".to_string(),
        })?;
        publisher.publish(network)
    }

    fn store_last_good(&self, network: Network) {
        match self.last_good.lock() {
            Ok(mut guard) => *guard = Some(network),
            Err(poisoned) => *poisoned.into_inner() = Some(network),
        }
    }
}

/// One-line summary of a node for debug output
fn describe_node(node: &UwbNode) -> String {
    let lat_lon_alt = match node.lat_lon_alt.as_deref() {
        Some([lat, lon, alt, ..]) => format!("{:.6}, {:.6}, {:.2}", lat, lon, alt),
        _ => "null".to_string(),
    };

    let edges = if node.edges.is_empty() {
        "no edges".to_string()
    } else {
        node.edges
            .iter()
            .map(|edge| {
                let other = if edge.end0 == node.id { &edge.end1 } else { &edge.end0 };
                format!("{}:{:.2}m", other, edge.distance)
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Node {}: positionKnown={}, latLonAlt=[{}], edges=[{}]",
        node.id, node.position_known, lat_lon_alt, edges
    )
}
