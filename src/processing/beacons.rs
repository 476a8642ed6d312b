//! Configured beacon table
//!
//! Built once at startup from the configuration and shared read-only with the solver.
//! Every incoming snapshot is overlaid with it before the cycle starts.

use std::collections::HashMap;

use crate::core::types::{LatLonAlt, Network};
use crate::utils::config::BeaconConfig;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeaconTable {
    beacons: HashMap<String, LatLonAlt>,
}

impl BeaconTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration. Entries without an id are ignored and a repeated id
    /// keeps its last position.
    pub fn from_config(beacons: &[BeaconConfig]) -> Self {
        let mut table = Self::new();
        for beacon in beacons {
            if beacon.id.is_empty() {
                log::warn!("Ignoring configured beacon without an id");
                continue;
            }
            if table.beacons.insert(beacon.id.clone(), beacon.lat_lon_alt()).is_some() {
                log::warn!("Beacon {} configured more than once, using the last entry", beacon.id);
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LatLonAlt> {
        self.beacons.get(id)
    }

    /// Force every listed node to a known position. Returns the number of nodes overlaid.
    pub fn apply(&self, network: &mut Network) -> usize {
        if self.beacons.is_empty() {
            return 0;
        }

        let mut applied = 0;
        for node in network.uwbs.iter_mut().filter(|node| !node.id.is_empty()) {
            if let Some(lla) = self.beacons.get(&node.id) {
                node.position_known = true;
                node.lat_lon_alt = Some(lla.to_vec());
                applied += 1;
            }
        }
        applied
    }
}
