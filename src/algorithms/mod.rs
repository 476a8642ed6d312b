//! Core positioning algorithms

pub mod vector;
pub mod geodesy;
pub mod trilateration;
pub mod refinement;

pub use geodesy::{GeodesyEngine, GeodeticPoint};
pub use refinement::{refine, RefinementOutcome, RefinementParams};
pub use trilateration::{trilaterate, TrilaterationBasis, TrilaterationError};
pub use vector::Vec3;
