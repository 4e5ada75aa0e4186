//! Force-directed spring layout.
//!
//! Fruchterman-Reingold style: nodes repel each other with a force
//! proportional to `k²/d` while edges pull their endpoints together with a
//! force proportional to `d²/k` scaled by edge weight, where `k` is the
//! optimal pairwise distance for the unit plane. A linearly cooling
//! temperature bounds per-step displacement, and the result is recentered
//! into the unit box.
//!
//! Initialization is uniform random over the unit square unless a seed or
//! explicit starting positions are supplied; identical seeds reproduce
//! identical coordinates. Disconnected graphs need no special handling,
//! repulsion alone separates the components.
//!
//! ## References
//!
//! Fruchterman & Reingold (1991). "Graph drawing by force-directed
//! placement." Software: Practice and Experience 21(11).

use rand::prelude::*;
use rayon::prelude::*;
use tracing::warn;

use super::traits::LayoutAlgorithm;
use super::{fit_unit_box, Positioning};
use crate::error::Result;
use crate::graph::{Network, NodeKey};

/// Mean per-node movement below which the layout counts as settled.
const SETTLE_THRESHOLD: f64 = 1e-4;

/// Fruchterman-Reingold force-directed layout.
#[derive(Debug, Clone)]
pub struct SpringLayout {
    /// Number of force iterations.
    iterations: usize,
    /// Random seed for the initial placement.
    seed: Option<u64>,
}

impl SpringLayout {
    /// Create a new spring layout with default settings.
    pub fn new() -> Self {
        Self {
            iterations: 50,
            seed: None,
        }
    }

    /// Set the number of force iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Seed the initial placement for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Lay out `network` starting from caller-supplied positions.
    ///
    /// Nodes missing from `initial` are placed randomly; keys in `initial`
    /// that the network does not contain are ignored.
    pub fn layout_from<K: NodeKey>(
        &self,
        network: &Network<K>,
        initial: &Positioning<K>,
    ) -> Result<Positioning<K>> {
        self.run(network, Some(initial))
    }

    fn run<K: NodeKey>(
        &self,
        network: &Network<K>,
        initial: Option<&Positioning<K>>,
    ) -> Result<Positioning<K>> {
        let n = network.node_count();
        if n == 0 {
            return Ok(Positioning::empty());
        }
        let keys = network.key_vec();
        if n == 1 {
            return Ok(Positioning::from_dense(&keys, &[(0.5, 0.5)]));
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        };
        let mut pos: Vec<(f64, f64)> = keys
            .iter()
            .map(|key| {
                initial
                    .and_then(|p| p.position_of(key))
                    .unwrap_or_else(|| (rng.random::<f64>(), rng.random::<f64>()))
            })
            .collect();

        let edges = network.edge_list();
        let k = (1.0 / n as f64).sqrt();

        let mut temperature = 0.1;
        let cooling = temperature / (self.iterations + 1) as f64;
        let mut settled = false;

        for _iter in 0..self.iterations {
            // Repulsion between all pairs, computed per node against a
            // read-only snapshot of the positions.
            let mut disp: Vec<(f64, f64)> = pos
                .par_iter()
                .enumerate()
                .map(|(i, &(xi, yi))| {
                    let mut d = (0.0, 0.0);
                    for (j, &(xj, yj)) in pos.iter().enumerate() {
                        if i == j {
                            continue;
                        }
                        let (dx, dy) = (xi - xj, yi - yj);
                        let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
                        let force = k * k / dist;
                        d.0 += dx / dist * force;
                        d.1 += dy / dist * force;
                    }
                    d
                })
                .collect();

            // Attraction along edges, scaled by weight.
            for &(u, v, weight) in &edges {
                let (dx, dy) = (pos[u].0 - pos[v].0, pos[u].1 - pos[v].1);
                let dist = (dx * dx + dy * dy).sqrt().max(1e-9);
                let force = dist * dist / k * weight;
                disp[u].0 -= dx / dist * force;
                disp[u].1 -= dy / dist * force;
                disp[v].0 += dx / dist * force;
                disp[v].1 += dy / dist * force;
            }

            // Displace, capped at the current temperature.
            let mut total_movement = 0.0;
            for (point, &(dx, dy)) in pos.iter_mut().zip(disp.iter()) {
                let length = (dx * dx + dy * dy).sqrt();
                if length <= 0.0 {
                    continue;
                }
                let step = length.min(temperature);
                point.0 += dx / length * step;
                point.1 += dy / length * step;
                total_movement += step;
            }

            temperature -= cooling;

            if total_movement / n as f64 < SETTLE_THRESHOLD {
                settled = true;
                break;
            }
        }

        if !settled && self.iterations > 0 {
            warn!(
                iterations = self.iterations,
                "spring layout hit the iteration cap before settling"
            );
        }

        fit_unit_box(&mut pos);
        Ok(Positioning::from_dense(&keys, &pos))
    }
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAlgorithm for SpringLayout {
    fn layout<K: NodeKey>(&self, network: &Network<K>) -> Result<Positioning<K>> {
        self.run(network, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_coordinates_are_finite_and_total() {
        let net = Network::from_edges(vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]).unwrap();
        let positions = SpringLayout::new().with_seed(5).layout(&net).unwrap();
        assert_eq!(positions.len(), 4);
        for (_, (x, y)) in positions.iter() {
            assert!(x.is_finite() && y.is_finite());
            assert!((-1e-9..=1.0 + 1e-9).contains(&x));
            assert!((-1e-9..=1.0 + 1e-9).contains(&y));
        }
    }

    #[test]
    fn test_spring_seeded_runs_are_identical() {
        let net = Network::from_edges(vec![(0, 1), (1, 2), (0, 2), (2, 3)]).unwrap();
        let first = SpringLayout::new().with_seed(42).layout(&net).unwrap();
        let second = SpringLayout::new().with_seed(42).layout(&net).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_spring_tolerates_disconnection() {
        let net = Network::from_edges(vec![(0, 1), (2, 3)]).unwrap();
        let positions = SpringLayout::new().with_seed(8).layout(&net).unwrap();
        assert_eq!(positions.len(), 4);
        // Repulsion keeps the two pairs apart.
        let a = positions.position_of(&0).unwrap();
        let c = positions.position_of(&2).unwrap();
        assert!(a != c);
    }

    #[test]
    fn test_spring_single_node_at_center() {
        let net = Network::from_parts(vec![9], vec![]).unwrap();
        let positions = SpringLayout::new().layout(&net).unwrap();
        assert_eq!(positions.position_of(&9), Some((0.5, 0.5)));
    }

    #[test]
    fn test_spring_respects_initial_positions() {
        let net = Network::from_edges(vec![("a", "b")]).unwrap();
        let initial = Positioning::from_coords(
            [("a", (0.0, 0.0)), ("b", (1.0, 1.0))].into_iter().collect(),
        );
        let frozen = SpringLayout::new().with_iterations(0);
        let positions = frozen.layout_from(&net, &initial).unwrap();
        // With zero iterations the initial geometry survives normalization.
        let a = positions.position_of(&"a").unwrap();
        let b = positions.position_of(&"b").unwrap();
        assert!(a.0 < b.0 && a.1 < b.1);
    }
}
