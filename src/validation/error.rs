use serde::Serialize;
use thiserror::Error;

/// Error classification for the positioning engine.
///
/// Only `EmptyNetwork` and `InsufficientAnchors` end a cycle. The remaining variants are
/// node-local or transport-side and are reported as diagnostics alongside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PositioningError {
    #[error("network snapshot is empty")]
    EmptyNetwork,

    #[error("not enough usable anchors: {available} of {required} required ({anchor_ids:?})")]
    InsufficientAnchors {
        available: usize,
        required: usize,
        anchor_ids: Vec<String>,
    },

    /// Reference triple is collinear or coincident
    #[error("cannot trilaterate {node} from {references:?}: reference nodes are collinear or too close (j = {j:e})")]
    DegenerateGeometry {
        node: String,
        references: [String; 3],
        j: f64,
    },

    /// First reference node has no geodetic triple to estimate from
    #[error("reference {reference} has invalid latLonAlt, skipping {node}")]
    MissingReference { node: String, reference: String },

    /// Known node whose triple cannot seed the local frame
    #[error("node {node} is marked positionKnown but its latLonAlt is unusable ({reason})")]
    InvalidAnchor { node: String, reason: String },

    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("failed to publish snapshot: {reason}")]
    Publish { reason: String },
}

/// How bad an error is for the running process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorSeverity {
    /// Node-local, the cycle continues
    Warning,
    /// Input or output dropped, the process continues
    Medium,
    /// Cycle aborted
    High,
}

impl PositioningError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PositioningError::DegenerateGeometry { .. }
            | PositioningError::MissingReference { .. }
            | PositioningError::InvalidAnchor { .. } => ErrorSeverity::Warning,
            PositioningError::MalformedSnapshot { .. } | PositioningError::Publish { .. } => {
                ErrorSeverity::Medium
            }
            PositioningError::EmptyNetwork | PositioningError::InsufficientAnchors { .. } => {
                ErrorSeverity::High
            }
        }
    }

    /// True when the error ends the current cycle
    pub fn is_cycle_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::High
    }

    /// Node the error is about, if any
    pub fn node(&self) -> Option<&str> {
        match self {
            PositioningError::DegenerateGeometry { node, .. }
            | PositioningError::MissingReference { node, .. }
            | PositioningError::InvalidAnchor { node, .. } => Some(node),
            _ => None,
        }
    }
}
