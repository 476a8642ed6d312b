//! Per-node greedy refinement of multilaterated positions
//!
//! Each pass walks the network in order and nudges every movable node down the gradient of
//! its own range residual. A move is kept only if that node's squared residual strictly
//! drops. This is not a joint least-squares solve: nodes are adjusted one at a time against
//! neighbours' current positions.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::algorithms::vector::{distance, normalize, Vec3};
use crate::core::constants::{DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS};
use crate::core::types::Network;

/// Refinement parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementParams {
    /// Upper bound on full passes over the network
    pub max_iterations: u32,
    /// Step size applied to the residual gradient
    pub learning_rate: f64,
}

impl Default for RefinementParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

/// What a refinement run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOutcome {
    pub passes: u32,
    pub accepted_moves: usize,
}

/// Residual of one node against its placed neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeResidual {
    pub sum_squared: f64,
    pub edges: usize,
}

impl NodeResidual {
    /// Root mean square residual, `None` when no edge contributed
    pub fn rms(&self) -> Option<f64> {
        if self.edges == 0 {
            None
        } else {
            Some((self.sum_squared / self.edges as f64).sqrt())
        }
    }
}

/// Squared range residual of node `node` if it were at `position`.
///
/// Only edges whose other end is placed in `cycle` count.
pub fn residual_at(
    network: &Network,
    index: &HashMap<String, usize>,
    node: usize,
    position: &Vec3,
    cycle: u64,
) -> NodeResidual {
    let mut residual = NodeResidual::default();
    for edge in &network.uwbs[node].edges {
        let Some(other) = network.other_end(index, edge, node) else {
            continue;
        };
        let neighbour = &network.uwbs[other];
        if !neighbour.is_placed(cycle) {
            continue;
        }
        let error = distance(position, &neighbour.position) - edge.distance;
        residual.sum_squared += error * error;
        residual.edges += 1;
    }
    residual
}

/// Residual of node `node` at its current position
pub fn node_residual(network: &Network, index: &HashMap<String, usize>, node: usize, cycle: u64) -> NodeResidual {
    residual_at(network, index, node, &network.uwbs[node].position, cycle)
}

fn gradient(network: &Network, index: &HashMap<String, usize>, node: usize, cycle: u64) -> Vec3 {
    let current = &network.uwbs[node];
    let mut gradient = Vec3::zeros();
    for edge in &current.edges {
        let Some(other) = network.other_end(index, edge, node) else {
            continue;
        };
        let neighbour = &network.uwbs[other];
        if !neighbour.is_placed(cycle) {
            continue;
        }
        let error = distance(&current.position, &neighbour.position) - edge.distance;
        gradient += normalize(&(current.position - neighbour.position)) * error;
    }
    gradient
}

/// Refine the positions of nodes placed in `cycle`. Nodes in `fixed` never move.
pub fn refine(
    network: &mut Network,
    index: &HashMap<String, usize>,
    cycle: u64,
    fixed: &HashSet<usize>,
    params: &RefinementParams,
) -> RefinementOutcome {
    let movable: Vec<usize> = network
        .uwbs
        .iter()
        .enumerate()
        .filter(|(i, node)| node.is_placed(cycle) && !fixed.contains(i))
        .map(|(i, _)| i)
        .collect();

    let mut outcome = RefinementOutcome::default();
    if movable.is_empty() {
        return outcome;
    }

    for _ in 0..params.max_iterations {
        outcome.passes += 1;
        let mut accepted = 0;

        for &node in &movable {
            let step = gradient(network, index, node, cycle) * params.learning_rate;
            let candidate = network.uwbs[node].position - step;

            let before = node_residual(network, index, node, cycle).sum_squared;
            let after = residual_at(network, index, node, &candidate, cycle).sum_squared;

            if after < before {
                network.uwbs[node].position = candidate;
                accepted += 1;
            }
        }

        outcome.accepted_moves += accepted;
        if accepted == 0 {
            break;
        }
    }

    log::debug!(
        "Refinement: {} passes, {} accepted moves over {} nodes",
        outcome.passes,
        outcome.accepted_moves,
        movable.len()
    );
    outcome
}
