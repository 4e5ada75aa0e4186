//! Kamada-Kawai layout by stress majorization.
//!
//! Embeds a graph so that geometric distances track graph distances:
//! all-pairs shortest-path hop counts are computed by BFS per node, then the
//! stress function
//!
//! ```text
//! Σ_ij w_ij (|p_i - p_j| - d_ij)²     with w_ij = 1/d_ij²
//! ```
//!
//! is minimized by majorization sweeps until the largest node movement in a
//! sweep falls below the tolerance or the iteration cap is hit.
//!
//! The method needs finite graph distances, so a disconnected graph is laid
//! out one connected component at a time, each starting from a deterministic
//! circle and normalized to its own unit box, with the boxes placed on a
//! padded grid so components never overlap. The whole procedure is
//! deterministic.
//!
//! ## References
//!
//! Kamada & Kawai (1989). "An algorithm for drawing general undirected
//! graphs." Information Processing Letters 31(1).
//! Gansner, Koren & North (2004). "Graph drawing by stress majorization."

use std::collections::{HashMap, VecDeque};
use std::f64::consts::TAU;

use tracing::warn;

use super::traits::LayoutAlgorithm;
use super::{fit_unit_box, Positioning};
use crate::error::Result;
use crate::graph::{Network, NodeKey};

/// Gap between component bounding boxes on the grid.
const GRID_GAP: f64 = 0.5;

/// Kamada-Kawai stress majorization layout.
#[derive(Debug, Clone)]
pub struct KamadaKawai {
    /// Sweep movement below which the layout counts as converged.
    tolerance: f64,
    /// Maximum majorization sweeps per component.
    max_iterations: usize,
}

impl KamadaKawai {
    /// Create a new Kamada-Kawai layout with default settings.
    pub fn new() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 500,
        }
    }

    /// Set the convergence tolerance on per-sweep movement.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of majorization sweeps per component.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Majorize one component given its internal adjacency; returns unit-box
    /// coordinates per component-local index.
    fn layout_component(&self, adj: &[Vec<usize>]) -> Vec<(f64, f64)> {
        let size = adj.len();
        if size == 1 {
            return vec![(0.5, 0.5)];
        }

        // All-pairs hop distances by BFS from every node.
        let mut dist = vec![vec![0usize; size]; size];
        for (source, row) in dist.iter_mut().enumerate() {
            let mut seen = vec![false; size];
            let mut queue = VecDeque::new();
            seen[source] = true;
            queue.push_back(source);
            while let Some(node) = queue.pop_front() {
                for &neighbor in &adj[node] {
                    if !seen[neighbor] {
                        seen[neighbor] = true;
                        row[neighbor] = row[node] + 1;
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        // Deterministic circle start.
        let mut pos: Vec<(f64, f64)> = (0..size)
            .map(|i| {
                let angle = TAU * i as f64 / size as f64;
                (0.5 + 0.5 * angle.cos(), 0.5 + 0.5 * angle.sin())
            })
            .collect();

        let mut converged = false;
        for _sweep in 0..self.max_iterations {
            let mut max_movement = 0.0f64;
            for i in 0..size {
                let (mut num_x, mut num_y, mut den) = (0.0, 0.0, 0.0);
                for j in 0..size {
                    if i == j {
                        continue;
                    }
                    let d = dist[i][j] as f64;
                    let weight = 1.0 / (d * d);
                    let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                    let length = (dx * dx + dy * dy).sqrt().max(1e-9);
                    num_x += weight * (pos[j].0 + d * dx / length);
                    num_y += weight * (pos[j].1 + d * dy / length);
                    den += weight;
                }
                let next = (num_x / den, num_y / den);
                let moved =
                    ((next.0 - pos[i].0).powi(2) + (next.1 - pos[i].1).powi(2)).sqrt();
                max_movement = max_movement.max(moved);
                pos[i] = next;
            }
            if max_movement < self.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                max_iterations = self.max_iterations,
                "kamada-kawai hit the sweep cap before converging"
            );
        }

        fit_unit_box(&mut pos);
        pos
    }
}

impl Default for KamadaKawai {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAlgorithm for KamadaKawai {
    fn layout<K: NodeKey>(&self, network: &Network<K>) -> Result<Positioning<K>> {
        let n = network.node_count();
        if n == 0 {
            return Ok(Positioning::empty());
        }
        let keys = network.key_vec();
        let adjacency = network.adjacency();

        // Connected components in order of their lowest dense index.
        let mut component_of = vec![usize::MAX; n];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for start in 0..n {
            if component_of[start] != usize::MAX {
                continue;
            }
            let id = components.len();
            let mut nodes = vec![start];
            component_of[start] = id;
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for &(neighbor, _) in &adjacency[node] {
                    if component_of[neighbor] == usize::MAX {
                        component_of[neighbor] = id;
                        nodes.push(neighbor);
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(nodes);
        }

        // Each component gets its own unit box, placed on a padded grid.
        let columns = (components.len() as f64).sqrt().ceil() as usize;
        let mut positions = vec![(0.0, 0.0); n];
        for (id, nodes) in components.iter().enumerate() {
            let local_index: HashMap<usize, usize> = nodes
                .iter()
                .enumerate()
                .map(|(local, &node)| (node, local))
                .collect();
            let local_adj: Vec<Vec<usize>> = nodes
                .iter()
                .map(|&node| {
                    adjacency[node]
                        .iter()
                        .map(|&(neighbor, _)| local_index[&neighbor])
                        .collect()
                })
                .collect();

            let local = self.layout_component(&local_adj);
            let cell = 1.0 + GRID_GAP;
            let offset_x = (id % columns) as f64 * cell;
            let offset_y = (id / columns) as f64 * cell;
            for (&node, &(x, y)) in nodes.iter().zip(local.iter()) {
                positions[node] = (x + offset_x, y + offset_y);
            }
        }

        Ok(Positioning::from_dense(&keys, &positions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounding_box<K: NodeKey>(
        positions: &Positioning<K>,
        nodes: &[K],
    ) -> (f64, f64, f64, f64) {
        let mut bounds = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for node in nodes {
            let (x, y) = positions.position_of(node).unwrap();
            bounds.0 = bounds.0.min(x);
            bounds.1 = bounds.1.max(x);
            bounds.2 = bounds.2.min(y);
            bounds.3 = bounds.3.max(y);
        }
        bounds
    }

    #[test]
    fn test_kamada_kawai_path_preserves_order() {
        let net = Network::from_edges(vec![(0, 1), (1, 2), (2, 3)]).unwrap();
        let positions = KamadaKawai::new().layout(&net).unwrap();
        assert_eq!(positions.len(), 4);
        // A path embeds close to a line: consecutive nodes sit nearer than
        // the endpoints.
        let p0 = positions.position_of(&0).unwrap();
        let p1 = positions.position_of(&1).unwrap();
        let p3 = positions.position_of(&3).unwrap();
        let near = ((p0.0 - p1.0).powi(2) + (p0.1 - p1.1).powi(2)).sqrt();
        let far = ((p0.0 - p3.0).powi(2) + (p0.1 - p3.1).powi(2)).sqrt();
        assert!(near < far);
    }

    #[test]
    fn test_kamada_kawai_is_deterministic() {
        let net = Network::from_edges(vec![(0, 1), (1, 2), (0, 2), (2, 3), (3, 4)]).unwrap();
        let first = KamadaKawai::new().layout(&net).unwrap();
        let second = KamadaKawai::new().layout(&net).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_kamada_kawai_disconnected_components_do_not_overlap() {
        // One component of two nodes, one of three.
        let net = Network::from_edges(vec![(1, 2), (3, 4), (4, 5), (3, 5)]).unwrap();
        let positions = KamadaKawai::new().layout(&net).unwrap();
        assert_eq!(positions.len(), 5);
        for (_, (x, y)) in positions.iter() {
            assert!(x.is_finite() && y.is_finite());
        }

        let (min_ax, max_ax, min_ay, max_ay) = bounding_box(&positions, &[1, 2]);
        let (min_bx, max_bx, min_by, max_by) = bounding_box(&positions, &[3, 4, 5]);
        let disjoint_x = max_ax < min_bx || max_bx < min_ax;
        let disjoint_y = max_ay < min_by || max_by < min_ay;
        assert!(disjoint_x || disjoint_y);
    }

    #[test]
    fn test_kamada_kawai_single_node() {
        let net = Network::from_parts(vec!["only"], vec![]).unwrap();
        let positions = KamadaKawai::new().layout(&net).unwrap();
        assert_eq!(positions.position_of(&"only"), Some((0.5, 0.5)));
    }

    #[test]
    fn test_kamada_kawai_distances_track_hops() {
        // On a 5-path the embedded distance grows with hop count.
        let net = Network::from_edges(vec![(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let positions = KamadaKawai::new().layout(&net).unwrap();
        let p0 = positions.position_of(&0).unwrap();
        let mut previous = 0.0;
        for hop in [1, 2, 3, 4] {
            let p = positions.position_of(&hop).unwrap();
            let d = ((p.0 - p0.0).powi(2) + (p.1 - p0.1).powi(2)).sqrt();
            assert!(d > previous);
            previous = d;
        }
    }
}
