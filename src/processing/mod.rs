//! Per-cycle processing: beacon overlay and the position solver

pub mod beacons;
pub mod solver;

pub use beacons::BeaconTable;
pub use solver::{CycleReport, PositionSolver, ResidualStats, SolverParams};
