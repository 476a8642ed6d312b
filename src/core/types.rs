//! Network snapshot model exchanged with the transport
//!
//! The wire schema is `{ "uwbs": [ { "id", "positionKnown", "latLonAlt", "edges",
//! "positionAccuracy", ... } ] }`. Fields the engine does not interpret are kept in
//! `extra` and written back out untouched.

use std::collections::{BTreeSet, HashMap};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::constants::ACCURACY_NOT_COMPUTED;
use crate::validation::error::PositioningError;

/// Geodetic triple as carried on the wire: degrees, degrees, metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonAlt {
    pub lat: f64,
    pub lon: f64,
    /// Altitude in metres
    pub alt: f64,
}

impl LatLonAlt {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// Read a wire `latLonAlt` array. Anything but exactly three finite numbers is rejected.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [lat, lon, alt] if values.iter().all(|v| v.is_finite()) => Some(Self::new(*lat, *lon, *alt)),
            _ => None,
        }
    }

    pub fn to_vec(self) -> Vec<f64> {
        vec![self.lat, self.lon, self.alt]
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.alt.is_finite()
    }
}

/// Range measurement between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub end0: String,
    #[serde(default)]
    pub end1: String,
    /// Measured distance in metres
    #[serde(default)]
    pub distance: f64,
}

impl Edge {
    pub fn new(end0: impl Into<String>, end1: impl Into<String>, distance: f64) -> Self {
        Self {
            end0: end0.into(),
            end1: end1.into(),
            distance,
        }
    }

    /// Id at the far end of this edge as seen from `id`, or `None` when `id` is not an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.end0 == id {
            Some(self.end1.as_str())
        } else if self.end1 == id {
            Some(self.end0.as_str())
        } else {
            None
        }
    }
}

fn accuracy_not_computed() -> f64 {
    ACCURACY_NOT_COMPUTED
}

/// A single UWB radio in the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UwbNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub position_known: bool,
    /// Wire `[lat, lon, altMetres]`; may be malformed on input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lon_alt: Option<Vec<f64>>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// RMS range residual in metres, -1 when not computed
    #[serde(default = "accuracy_not_computed")]
    pub position_accuracy: f64,
    /// Position in the cycle's shared local frame (metres)
    #[serde(skip, default = "Vector3::zeros")]
    pub position: Vector3<f64>,
    /// Cycle in which `position` was last resolved
    #[serde(skip)]
    pub last_updated: Option<u64>,
    /// Opaque passthrough fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UwbNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position_known: false,
            lat_lon_alt: None,
            edges: Vec::new(),
            position_accuracy: ACCURACY_NOT_COMPUTED,
            position: Vector3::zeros(),
            last_updated: None,
            extra: Map::new(),
        }
    }

    /// Node with a trusted geodetic position
    pub fn anchor(id: impl Into<String>, lat: f64, lon: f64, alt: f64) -> Self {
        Self::new(id)
            .with_lat_lon_alt(LatLonAlt::new(lat, lon, alt))
            .with_position_known(true)
    }

    pub fn with_position_known(mut self, known: bool) -> Self {
        self.position_known = known;
        self
    }

    pub fn with_lat_lon_alt(mut self, lla: LatLonAlt) -> Self {
        self.lat_lon_alt = Some(lla.to_vec());
        self
    }

    /// Add a range measurement from this node to `other`
    pub fn with_edge(mut self, other: impl Into<String>, distance: f64) -> Self {
        let edge = Edge::new(self.id.clone(), other, distance);
        self.edges.push(edge);
        self
    }

    /// Parsed geodetic triple, if the wire value is well formed
    pub fn geodetic(&self) -> Option<LatLonAlt> {
        self.lat_lon_alt.as_deref().and_then(LatLonAlt::from_slice)
    }

    /// A known node whose triple can seed the local frame
    pub fn is_usable_anchor(&self) -> bool {
        self.position_known
            && self
                .geodetic()
                .map(|lla| lla.lat != 0.0 && lla.lon != 0.0)
                .unwrap_or(false)
    }

    pub fn is_placed(&self, cycle: u64) -> bool {
        self.last_updated == Some(cycle)
    }

    /// True when the node carries what publication requires
    pub fn is_publishable(&self) -> bool {
        self.lat_lon_alt.as_ref().map(|v| v.len() == 3).unwrap_or(false)
            && self.position_accuracy != ACCURACY_NOT_COMPUTED
    }
}

/// Snapshot of the whole UWB network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub uwbs: Vec<UwbNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Network {
    pub fn new(uwbs: Vec<UwbNode>) -> Self {
        Self {
            uwbs,
            extra: Map::new(),
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, PositioningError> {
        serde_json::from_str(payload).map_err(|e| PositioningError::MalformedSnapshot {
            reason: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, PositioningError> {
        serde_json::to_string(self).map_err(|e| PositioningError::MalformedSnapshot {
            reason: e.to_string(),
        })
    }

    /// Build a snapshot from bare `(end0, end1, distance)` triples.
    ///
    /// Nodes are created in sorted id order and every edge is attached to both endpoints.
    pub fn from_edge_list(edges: &[(String, String, f64)]) -> Self {
        let ids: BTreeSet<&str> = edges
            .iter()
            .flat_map(|(a, b, _)| [a.as_str(), b.as_str()])
            .collect();

        let mut uwbs: Vec<UwbNode> = ids.into_iter().map(UwbNode::new).collect();
        let index: HashMap<String, usize> = uwbs
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        for (end0, end1, distance) in edges {
            let edge = Edge::new(end0.clone(), end1.clone(), *distance);
            if let Some(&i) = index.get(end0) {
                uwbs[i].edges.push(edge.clone());
            }
            if end1 != end0 {
                if let Some(&i) = index.get(end1) {
                    uwbs[i].edges.push(edge);
                }
            }
        }

        Self::new(uwbs)
    }

    pub fn len(&self) -> usize {
        self.uwbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uwbs.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&UwbNode> {
        self.uwbs.iter().find(|node| node.id == id)
    }

    /// Map from node id to its position in `uwbs`. Nodes with empty ids are not indexed.
    pub fn index(&self) -> HashMap<String, usize> {
        self.uwbs
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.id.is_empty())
            .map(|(i, node)| (node.id.clone(), i))
            .collect()
    }

    /// Index of the node at the far end of `edge` from node `from`.
    /// Edges that do not touch `from`, or whose other id is absent, resolve to `None`.
    pub fn other_end(&self, index: &HashMap<String, usize>, edge: &Edge, from: usize) -> Option<usize> {
        let id = self.uwbs.get(from)?.id.as_str();
        if id.is_empty() {
            return None;
        }
        let other = edge.other_end(id)?;
        if other.is_empty() {
            return None;
        }
        index.get(other).copied()
    }

    /// Copy containing only nodes that carry a full triple and a computed accuracy
    pub fn publishable(&self) -> Network {
        Network {
            uwbs: self
                .uwbs
                .iter()
                .filter(|node| node.is_publishable())
                .cloned()
                .collect(),
            extra: self.extra.clone(),
        }
    }

    pub fn known_count(&self) -> usize {
        self.uwbs.iter().filter(|node| node.position_known).count()
    }
}
