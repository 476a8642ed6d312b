//! UWB Positioning Engine
//!
//! Estimates latitude, longitude and altitude for ultra-wideband radio nodes from
//! pairwise range measurements, given at least three nodes with surveyed positions.
//! Each network snapshot is placed in a shared local frame through WGS84 geodesy,
//! multilaterated outward from the anchors, refined, and converted back to geodetic
//! coordinates for publication.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{Edge, LatLonAlt, Network, UwbNode, ACCURACY_NOT_COMPUTED};
pub use algorithms::geodesy::{GeodesyEngine, GeodeticPoint};
pub use algorithms::refinement::{RefinementOutcome, RefinementParams};
pub use processing::{BeaconTable, CycleReport, PositionSolver, SolverParams};
pub use validation::PositioningError;
pub use utils::config::{AppConfig, ConfigError, ConfigurationManager};
pub use utils::monitor::{HealthMonitor, HealthReport};
pub use api::{ChannelPublisher, LinePublisher, SnapshotPublisher, TickOutcome, UwbManager};
