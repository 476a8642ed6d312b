//! Physical constants and system parameters

/// WGS84 semi-major axis (km)
pub const WGS84_SEMI_MAJOR_AXIS_KM: f64 = 6378.137;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257223563;

/// `positionAccuracy` value meaning "not computed"
pub const ACCURACY_NOT_COMPUTED: f64 = -1.0;

/// Minimum number of usable anchors before a cycle may proceed
pub const MIN_ANCHORS: usize = 3;

/// Below this `|j|` or `d` (m) a reference triple is treated as collinear or coincident
pub const COLLINEARITY_EPSILON: f64 = 1e-6;

/// Horizontal ECEF radius (km) under which a point is treated as on the pole
pub const POLE_EPSILON_KM: f64 = 1e-10;

/// Convergence threshold for the ECEF to geodetic latitude iteration (degrees)
pub const LATITUDE_CONVERGENCE_DEG: f64 = 1e-12;

/// Iteration cap for the ECEF to geodetic inversion
pub const ECEF_MAX_ITERATIONS: usize = 5;

/// Default number of refinement passes
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default refinement step size
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default processing tick interval (ms)
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 10;

/// A cycle older than this marks the process degraded (seconds)
pub const HEALTHY_CYCLE_AGE_SECS: f64 = 60.0;
