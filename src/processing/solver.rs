//! Position solver
//!
//! One call to [`PositionSolver::run`] is one cycle over a snapshot:
//! 1. overlay the configured beacons
//! 2. pick the usable anchors, put the first at the origin and the rest relative to it
//! 3. sweep the network placing every node that has three placed neighbours, until a
//!    sweep places nothing
//! 4. optionally refine the placed nodes
//! 5. fill in accuracies and geodetic coordinates and summarise
//!
//! The snapshot is mutated in place. Nothing but the cycle counter carries over from one
//! call to the next.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use nalgebra::Vector2;
use serde::Serialize;

use crate::algorithms::geodesy::{GeodesyEngine, GeodeticPoint};
use crate::algorithms::refinement::{self, RefinementOutcome, RefinementParams};
use crate::algorithms::trilateration::{TrilaterationBasis, TrilaterationError};
use crate::algorithms::vector::{distance, Vec3};
use crate::core::constants::{ACCURACY_NOT_COMPUTED, MIN_ANCHORS};
use crate::core::types::{LatLonAlt, Network, UwbNode};
use crate::processing::beacons::BeaconTable;
use crate::utils::config::{AlgorithmConfig, AppConfig};
use crate::validation::error::PositioningError;

/// Per-cycle solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub refinement_enabled: bool,
    pub refinement: RefinementParams,
    /// Use the metres-per-degree estimate for geodetic output
    pub linear_estimate: bool,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            refinement_enabled: true,
            refinement: RefinementParams::default(),
            linear_estimate: false,
        }
    }
}

impl From<&AlgorithmConfig> for SolverParams {
    fn from(config: &AlgorithmConfig) -> Self {
        Self {
            refinement_enabled: config.refinement_enabled,
            refinement: config.refinement_params(),
            linear_estimate: config.linear_geodetic_estimate,
        }
    }
}

/// Residual statistics over every edge between two placed nodes, counted from each end
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub edges: usize,
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub cycle: u64,
    pub total_nodes: usize,
    pub anchors_placed: usize,
    /// Non-anchor nodes placed this cycle
    pub nodes_placed: usize,
    /// Non-anchor nodes left without a position
    pub unplaced: Vec<String>,
    /// Full propagation sweeps, including the final one that placed nothing
    pub sweeps: usize,
    /// `None` when refinement is disabled
    pub refinement: Option<RefinementOutcome>,
    pub residuals: ResidualStats,
    /// Node-local problems met during the cycle
    pub diagnostics: Vec<PositioningError>,
    pub elapsed_ms: f64,
}

/// Frame origin for a cycle
struct Origin {
    geodetic: GeodeticPoint,
}

/// Resolves unknown node positions from range measurements
#[derive(Debug)]
pub struct PositionSolver {
    geodesy: GeodesyEngine,
    beacons: Arc<BeaconTable>,
    params: SolverParams,
    cycle: AtomicU64,
}

impl PositionSolver {
    pub fn new(geodesy: GeodesyEngine, beacons: Arc<BeaconTable>, params: SolverParams) -> Self {
        Self {
            geodesy,
            beacons,
            params,
            cycle: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let [x, z] = config.frame.north;
        Self::new(
            GeodesyEngine::new(Vector2::new(x, z)),
            Arc::new(BeaconTable::from_config(&config.beacons)),
            SolverParams::from(&config.algorithm),
        )
    }

    pub fn geodesy(&self) -> &GeodesyEngine {
        &self.geodesy
    }

    pub fn beacons(&self) -> &Arc<BeaconTable> {
        &self.beacons
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Run one cycle over `network`.
    ///
    /// Fails only when the cycle cannot start: an empty snapshot or fewer than three
    /// usable anchors. Accuracies are reset in both cases where nodes exist.
    pub fn run(&self, network: &mut Network) -> Result<CycleReport, PositioningError> {
        let started = Instant::now();

        if network.is_empty() {
            log::error!("Network snapshot is empty, nothing to position");
            return Err(PositioningError::EmptyNetwork);
        }

        let cycle = self.cycle.fetch_add(1, Ordering::Relaxed) + 1;
        for node in network.uwbs.iter_mut() {
            node.position_accuracy = ACCURACY_NOT_COMPUTED;
            node.position = Vec3::zeros();
            node.last_updated = None;
        }

        let injected = self.beacons.apply(network);
        if injected > 0 {
            log::debug!("Applied {} configured beacons", injected);
        }

        let mut diagnostics = Vec::new();
        let index = network.index();

        let (origin, anchors) = self.place_anchors(network, cycle, &mut diagnostics)?;
        let is_anchor: HashSet<usize> = anchors.iter().copied().collect();

        let (nodes_placed, sweeps) = self.propagate(network, &index, &is_anchor, cycle, &mut diagnostics);

        let refinement = if self.params.refinement_enabled {
            Some(refinement::refine(network, &index, cycle, &is_anchor, &self.params.refinement))
        } else {
            None
        };

        let residuals = self.report_positions(network, &index, &is_anchor, &origin, cycle);

        let unplaced: Vec<String> = network
            .uwbs
            .iter()
            .enumerate()
            .filter(|(i, node)| !is_anchor.contains(i) && !node.is_placed(cycle))
            .map(|(_, node)| node.id.clone())
            .collect();

        let report = CycleReport {
            cycle,
            total_nodes: network.len(),
            anchors_placed: anchors.len(),
            nodes_placed,
            unplaced,
            sweeps,
            refinement,
            residuals,
            diagnostics,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        };

        log::info!(
            "UWB to GPS conversion completed. Updated {}/{} positions. Average error: {:.2}m (min: {:.2}m, max: {:.2}m, edges: {}).",
            report.nodes_placed,
            report.total_nodes,
            report.residuals.average,
            report.residuals.min,
            report.residuals.max,
            report.residuals.edges
        );
        if report.nodes_placed + MIN_ANCHORS < report.total_nodes && !report.unplaced.is_empty() {
            log::warn!("Could not triangulate nodes: {}", report.unplaced.join(", "));
        }

        Ok(report)
    }

    /// Choose the usable anchors and place them in the local frame.
    /// Returns the frame origin and the anchor indices in snapshot order.
    fn place_anchors(
        &self,
        network: &mut Network,
        cycle: u64,
        diagnostics: &mut Vec<PositioningError>,
    ) -> Result<(Origin, Vec<usize>), PositioningError> {
        let mut anchors = Vec::new();
        for (i, node) in network.uwbs.iter().enumerate() {
            if !node.position_known {
                continue;
            }
            if node.is_usable_anchor() {
                anchors.push(i);
            } else {
                let error = PositioningError::InvalidAnchor {
                    node: node.id.clone(),
                    reason: unusable_anchor_reason(node).to_string(),
                };
                log::warn!("{}", error);
                diagnostics.push(error);
            }
        }

        let origin = match anchors.first().and_then(|&i| network.uwbs[i].geodetic()) {
            Some(lla) if anchors.len() >= MIN_ANCHORS => Origin {
                geodetic: GeodeticPoint::from(lla),
            },
            _ => {
                let error = PositioningError::InsufficientAnchors {
                    available: anchors.len(),
                    required: MIN_ANCHORS,
                    anchor_ids: anchors.iter().map(|&i| network.uwbs[i].id.clone()).collect(),
                };
                log::error!(
                    "Not enough known nodes for triangulation. You need {} beacons with positionKnown = true and lat/lon/alts set ({})",
                    MIN_ANCHORS,
                    error
                );
                return Err(error);
            }
        };

        let zero = Vec3::zeros();
        for &i in &anchors {
            let node = &mut network.uwbs[i];
            if let Some(lla) = node.geodetic() {
                node.position = self
                    .geodesy
                    .to_local_position(&origin.geodetic, &GeodeticPoint::from(lla), &zero);
                node.last_updated = Some(cycle);
            }
        }

        Ok((origin, anchors))
    }

    /// Fixed-point sweep placing nodes from their first three placed neighbours.
    /// Returns the number of nodes placed and the number of sweeps run.
    fn propagate(
        &self,
        network: &mut Network,
        index: &HashMap<String, usize>,
        is_anchor: &HashSet<usize>,
        cycle: u64,
        diagnostics: &mut Vec<PositioningError>,
    ) -> (usize, usize) {
        let mut placed = 0;
        let mut sweeps = 0;
        let mut reported: HashSet<(usize, [usize; 3])> = HashSet::new();

        loop {
            sweeps += 1;
            let mut progress = false;

            for i in 0..network.len() {
                if is_anchor.contains(&i) || network.uwbs[i].is_placed(cycle) {
                    continue;
                }

                let Some((refs, ranges)) = placed_neighbours(network, index, i, cycle) else {
                    continue;
                };

                match self.locate(network, i, refs, ranges) {
                    Ok((position, lla)) => {
                        let node = &mut network.uwbs[i];
                        node.position = position;
                        node.lat_lon_alt = Some(lla.to_vec());
                        node.last_updated = Some(cycle);
                        placed += 1;
                        progress = true;
                    }
                    Err(error) => {
                        if reported.insert((i, refs)) {
                            log::warn!("{}", error);
                            diagnostics.push(error);
                        }
                    }
                }
            }

            if !progress {
                break;
            }
        }

        (placed, sweeps)
    }

    /// Trilaterate node `target` from `refs` and estimate its geodetic position from `refs[0]`
    fn locate(
        &self,
        network: &Network,
        target: usize,
        refs: [usize; 3],
        ranges: [f64; 3],
    ) -> Result<(Vec3, LatLonAlt), PositioningError> {
        let node = &network.uwbs[target];
        let [r0, r1, r2] = refs.map(|r| &network.uwbs[r]);

        let reference = r0.geodetic().ok_or_else(|| PositioningError::MissingReference {
            node: node.id.clone(),
            reference: r0.id.clone(),
        })?;

        let basis = TrilaterationBasis::new(&r0.position, &r1.position, &r2.position).map_err(
            |TrilaterationError::Degenerate { j }| PositioningError::DegenerateGeometry {
                node: node.id.clone(),
                references: [r0.id.clone(), r1.id.clone(), r2.id.clone()],
                j,
            },
        )?;

        let position = basis.solve(ranges);
        let lla = self.estimate(&GeodeticPoint::from(reference), &r0.position, &position);
        Ok((position, lla))
    }

    fn estimate(&self, reference: &GeodeticPoint, reference_local: &Vec3, target_local: &Vec3) -> LatLonAlt {
        if self.params.linear_estimate {
            self.geodesy
                .estimate_geodetic_linear(reference, reference_local, target_local)
        } else {
            self.geodesy.estimate_geodetic(reference, reference_local, target_local)
        }
    }

    /// Set accuracies, recompute geodetic output for placed non-anchors and gather
    /// residual statistics.
    fn report_positions(
        &self,
        network: &mut Network,
        index: &HashMap<String, usize>,
        is_anchor: &HashSet<usize>,
        origin: &Origin,
        cycle: u64,
    ) -> ResidualStats {
        let zero = Vec3::zeros();

        for i in 0..network.len() {
            if !network.uwbs[i].is_placed(cycle) {
                continue;
            }
            let accuracy = refinement::node_residual(network, index, i, cycle)
                .rms()
                .unwrap_or(ACCURACY_NOT_COMPUTED);

            let lla = if is_anchor.contains(&i) {
                None
            } else {
                Some(self.estimate(&origin.geodetic, &zero, &network.uwbs[i].position))
            };

            let node = &mut network.uwbs[i];
            node.position_accuracy = accuracy;
            if let Some(lla) = lla {
                node.lat_lon_alt = Some(lla.to_vec());
            }
        }

        residual_stats(network, index, cycle)
    }
}

/// First three edges of node `node` whose far end is placed, in edge order
fn placed_neighbours(
    network: &Network,
    index: &HashMap<String, usize>,
    node: usize,
    cycle: u64,
) -> Option<([usize; 3], [f64; 3])> {
    let mut refs = [0usize; 3];
    let mut ranges = [0.0; 3];
    let mut found = 0;

    for edge in &network.uwbs[node].edges {
        let Some(other) = network.other_end(index, edge, node) else {
            continue;
        };
        if other == node || !network.uwbs[other].is_placed(cycle) {
            continue;
        }
        refs[found] = other;
        ranges[found] = edge.distance;
        found += 1;
        if found == 3 {
            return Some((refs, ranges));
        }
    }
    None
}

fn unusable_anchor_reason(node: &UwbNode) -> &'static str {
    match (&node.lat_lon_alt, node.geodetic()) {
        (None, _) => "latLonAlt missing",
        (Some(_), None) => "latLonAlt must hold exactly three finite numbers",
        (Some(_), Some(_)) => "latitude and longitude must be non-zero",
    }
}

fn residual_stats(network: &Network, index: &HashMap<String, usize>, cycle: u64) -> ResidualStats {
    let mut total = 0.0;
    let mut stats = ResidualStats {
        min: f64::INFINITY,
        ..ResidualStats::default()
    };

    for (i, node) in network.uwbs.iter().enumerate() {
        if !node.is_placed(cycle) {
            continue;
        }
        for edge in &node.edges {
            let Some(other) = network.other_end(index, edge, i) else {
                continue;
            };
            let neighbour = &network.uwbs[other];
            if !neighbour.is_placed(cycle) {
                continue;
            }
            let error = (distance(&node.position, &neighbour.position) - edge.distance).abs();
            total += error;
            stats.edges += 1;
            stats.max = stats.max.max(error);
            stats.min = stats.min.min(error);
        }
    }

    if stats.edges == 0 {
        stats.min = 0.0;
    } else {
        stats.average = total / stats.edges as f64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::BeaconConfig;
    use approx::assert_abs_diff_eq;

    const ANCHORS: [(&str, f64, f64, f64); 3] = [
        ("A", 53.485, -2.192, 0.0),
        ("B", 53.486, -2.193, 0.0),
        ("C", 53.4855, -2.1945, 0.0),
    ];

    fn solver() -> PositionSolver {
        PositionSolver::new(GeodesyEngine::default(), Arc::new(BeaconTable::new()), SolverParams::default())
    }

    /// Local position relative to the first anchor
    fn local(engine: &GeodesyEngine, lla: LatLonAlt) -> Vec3 {
        let (_, lat, lon, alt) = ANCHORS[0];
        let origin = GeodeticPoint::from(LatLonAlt::new(lat, lon, alt));
        engine.to_local_position(&origin, &GeodeticPoint::from(lla), &Vec3::zeros())
    }

    /// Anchor nodes plus a tag at `truth` with exact ranges to every anchor
    fn network_with_tag(truth: LatLonAlt) -> Network {
        let engine = GeodesyEngine::default();
        let tag_local = local(&engine, truth);

        let mut uwbs: Vec<UwbNode> = ANCHORS
            .iter()
            .map(|(id, lat, lon, alt)| UwbNode::anchor(*id, *lat, *lon, *alt))
            .collect();

        let mut tag = UwbNode::new("T1");
        for (id, lat, lon, alt) in ANCHORS {
            let anchor_local = local(&engine, LatLonAlt::new(lat, lon, alt));
            tag = tag.with_edge(id, distance(&tag_local, &anchor_local));
        }
        uwbs.push(tag);
        Network::new(uwbs)
    }

    #[test]
    fn test_empty_network() {
        let mut network = Network::default();
        assert!(matches!(solver().run(&mut network), Err(PositioningError::EmptyNetwork)));
    }

    #[test]
    fn test_exact_recovery() {
        let truth = LatLonAlt::new(53.4853, -2.1931, 0.0);
        let mut network = network_with_tag(truth);

        let report = solver().run(&mut network).unwrap();

        assert_eq!(report.anchors_placed, 3);
        assert_eq!(report.nodes_placed, 1);
        assert!(report.unplaced.is_empty());
        assert!(report.diagnostics.is_empty());

        let tag = network.find("T1").unwrap();
        let lla = tag.geodetic().unwrap();
        assert_abs_diff_eq!(lla.lat, truth.lat, epsilon = 1e-7);
        assert_abs_diff_eq!(lla.lon, truth.lon, epsilon = 1e-7);
        assert_abs_diff_eq!(lla.alt, truth.alt, epsilon = 0.01);
        assert_abs_diff_eq!(tag.position_accuracy, 0.0, epsilon = 1e-3);

        // Anchors list no edges of their own, so there is nothing to score them on
        let anchor = network.find("A").unwrap();
        assert_eq!(anchor.position_accuracy, ACCURACY_NOT_COMPUTED);
    }

    #[test]
    fn test_first_anchor_is_origin() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        solver().run(&mut network).unwrap();

        assert_eq!(network.find("A").unwrap().position, Vec3::zeros());
        assert!(network.find("B").unwrap().position.norm() > 100.0);
    }

    #[test]
    fn test_insufficient_anchors() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        network.uwbs[2].position_known = false;
        network.uwbs[3].position_accuracy = 0.5;

        match solver().run(&mut network) {
            Err(PositioningError::InsufficientAnchors {
                available,
                required,
                anchor_ids,
            }) => {
                assert_eq!(available, 2);
                assert_eq!(required, 3);
                assert_eq!(anchor_ids, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected InsufficientAnchors, got {:?}", other),
        }
        assert!(network.uwbs.iter().all(|n| n.position_accuracy == ACCURACY_NOT_COMPUTED));
    }

    #[test]
    fn test_invalid_known_node_is_treated_as_tag() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        network.uwbs[3].position_known = true;
        network.uwbs[3].lat_lon_alt = Some(vec![0.0, 0.0, 0.0]);

        let report = solver().run(&mut network).unwrap();

        assert_eq!(report.anchors_placed, 3);
        assert_eq!(report.nodes_placed, 1);
        assert!(matches!(
            &report.diagnostics[..],
            [PositioningError::InvalidAnchor { node, .. }] if node == "T1"
        ));
        let tag = network.find("T1").unwrap();
        assert!(tag.is_publishable());
        assert_ne!(tag.lat_lon_alt, Some(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_degenerate_triples_are_isolated() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        // D coincides with A
        network.uwbs.push(UwbNode::anchor("D", ANCHORS[0].1, ANCHORS[0].2, ANCHORS[0].3));
        network.uwbs.push(UwbNode::new("T2").with_edge("A", 10.0).with_edge("D", 10.0).with_edge("B", 80.0));
        network.uwbs.push(UwbNode::new("T3").with_edge("A", 10.0).with_edge("B", 80.0).with_edge("D", 10.0));

        let report = solver().run(&mut network).unwrap();

        assert_eq!(report.anchors_placed, 4);
        assert_eq!(report.nodes_placed, 1);
        assert_eq!(report.unplaced, vec!["T2".to_string(), "T3".to_string()]);

        let degenerate: Vec<(&str, &[String; 3])> = report
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                PositioningError::DegenerateGeometry { node, references, .. } => Some((node.as_str(), references)),
                _ => None,
            })
            .collect();
        assert_eq!(degenerate.len(), 2);
        assert_eq!(degenerate[0].0, "T2");
        assert_eq!(degenerate[0].1, &["A".to_string(), "D".to_string(), "B".to_string()]);
        assert_eq!(degenerate[1].0, "T3");

        for id in ["T2", "T3"] {
            assert_eq!(network.find(id).unwrap().position_accuracy, ACCURACY_NOT_COMPUTED);
        }
        assert!(network.find("T1").unwrap().position_accuracy >= 0.0);
    }

    #[test]
    fn test_edgeless_node_keeps_sentinel() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        network.uwbs.push(UwbNode::new("lonely"));

        let report = solver().run(&mut network).unwrap();

        assert_eq!(report.unplaced, vec!["lonely".to_string()]);
        let lonely = network.find("lonely").unwrap();
        assert_eq!(lonely.position_accuracy, ACCURACY_NOT_COMPUTED);
        assert!(!lonely.is_publishable());
    }

    #[test]
    fn test_propagation_through_placed_tags() {
        let engine = GeodesyEngine::default();
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        let t1 = local(&engine, LatLonAlt::new(53.4853, -2.1931, 0.0));
        let t2 = local(&engine, LatLonAlt::new(53.4857, -2.1925, 1.0));
        let a = local(&engine, LatLonAlt::new(ANCHORS[0].1, ANCHORS[0].2, ANCHORS[0].3));
        let b = local(&engine, LatLonAlt::new(ANCHORS[1].1, ANCHORS[1].2, ANCHORS[1].3));

        // T2 is listed first but can only be placed once T1 is
        let t2_node = UwbNode::new("T2")
            .with_edge("T1", distance(&t2, &t1))
            .with_edge("A", distance(&t2, &a))
            .with_edge("B", distance(&t2, &b));
        network.uwbs.insert(0, t2_node);

        let report = solver().run(&mut network).unwrap();

        assert_eq!(report.nodes_placed, 2);
        assert!(report.sweeps >= 3);
        assert!(network.find("T2").unwrap().is_publishable());
    }

    #[test]
    fn test_idempotent_on_consistent_input() {
        let solver = solver();
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));

        solver.run(&mut network).unwrap();
        let first = network.clone();
        solver.run(&mut network).unwrap();

        for (a, b) in first.uwbs.iter().zip(&network.uwbs) {
            assert_eq!(a.lat_lon_alt, b.lat_lon_alt);
            assert_eq!(a.position, b.position);
            assert_eq!(a.position_accuracy, b.position_accuracy);
        }
    }

    #[test]
    fn test_refinement_disabled() {
        let params = SolverParams {
            refinement_enabled: false,
            ..SolverParams::default()
        };
        let solver = PositionSolver::new(GeodesyEngine::default(), Arc::new(BeaconTable::new()), params);
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));

        let report = solver.run(&mut network).unwrap();
        assert!(report.refinement.is_none());
        assert!(network.find("T1").unwrap().is_publishable());
    }

    #[test]
    fn test_beacon_overlay_supplies_anchors() {
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        for node in network.uwbs.iter_mut().take(3) {
            node.position_known = false;
            node.lat_lon_alt = None;
        }

        let beacons: Vec<BeaconConfig> = ANCHORS
            .iter()
            .map(|(id, lat, lon, alt)| BeaconConfig::new(*id, *lat, *lon, *alt))
            .collect();
        let solver = PositionSolver::new(
            GeodesyEngine::default(),
            Arc::new(BeaconTable::from_config(&beacons)),
            SolverParams::default(),
        );

        let report = solver.run(&mut network).unwrap();
        assert_eq!(report.anchors_placed, 3);
        assert_eq!(report.nodes_placed, 1);
    }

    #[test]
    fn test_linear_estimate_close_to_exact() {
        let truth = LatLonAlt::new(53.4853, -2.1931, 0.0);
        let params = SolverParams {
            linear_estimate: true,
            ..SolverParams::default()
        };
        let solver = PositionSolver::new(GeodesyEngine::default(), Arc::new(BeaconTable::new()), params);
        let mut network = network_with_tag(truth);

        solver.run(&mut network).unwrap();

        let lla = network.find("T1").unwrap().geodetic().unwrap();
        assert_abs_diff_eq!(lla.lat, truth.lat, epsilon = 1e-5);
        assert_abs_diff_eq!(lla.lon, truth.lon, epsilon = 1e-5);
    }

    #[test]
    fn test_cycle_counter_advances() {
        let solver = solver();
        let mut network = network_with_tag(LatLonAlt::new(53.4853, -2.1931, 0.0));
        let first = solver.run(&mut network).unwrap().cycle;
        let second = solver.run(&mut network).unwrap().cycle;
        assert_eq!(second, first + 1);
    }
}
