//! Label propagation for community detection.
//!
//! Very fast O(E)-per-sweep algorithm where nodes adopt the plurality label
//! among their neighbors, weighted by edge weight. The cheapest and least
//! stable of the detectors: ties break by random choice, so callers needing
//! reproducible output must supply a seed.
//!
//! ## References
//!
//! Raghavan et al. (2007). "Near linear time algorithm to detect community
//! structures in large-scale networks." Physical Review E 76, 036106.

use std::collections::HashMap;

use rand::prelude::*;
use tracing::warn;

use super::traits::CommunityDetection;
use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Label propagation community detection.
#[derive(Debug, Clone)]
pub struct LabelPropagation {
    /// Maximum sweeps over the node set.
    max_iterations: usize,
    /// Random seed for sweep order and tie-breaks.
    seed: Option<u64>,
}

impl LabelPropagation {
    /// Create a new label propagation detector.
    pub fn new() -> Self {
        Self {
            max_iterations: 100,
            seed: None,
        }
    }

    /// Set the maximum number of sweeps before giving up on convergence.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Seed the sweep order and tie-breaks for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for LabelPropagation {
    fn detect<K: NodeKey>(&self, network: &Network<K>) -> Result<Partition<K>> {
        let n = network.node_count();
        if n == 0 {
            return Ok(Partition::empty());
        }

        let adj = network.adjacency();

        // Each node starts with a unique label.
        let mut labels: Vec<usize> = (0..n).collect();

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        };

        let mut order: Vec<usize> = (0..n).collect();
        let mut converged = false;

        for _sweep in 0..self.max_iterations {
            order.shuffle(&mut rng);
            let mut changed = false;

            for &node in &order {
                // Score each neighboring label by the weight carrying it.
                let mut score: HashMap<usize, f64> = HashMap::new();
                for &(neighbor, weight) in &adj[node] {
                    *score.entry(labels[neighbor]).or_insert(0.0) += weight;
                }
                if score.is_empty() {
                    continue;
                }

                let top = score
                    .values()
                    .fold(f64::NEG_INFINITY, |best, &s| best.max(s));
                let mut candidates: Vec<usize> = score
                    .into_iter()
                    .filter(|&(_, s)| s == top)
                    .map(|(label, _)| label)
                    .collect();
                // Sorted before drawing so a fixed seed picks the same label
                // regardless of hash order.
                candidates.sort_unstable();

                let new_label = if candidates.len() == 1 {
                    candidates[0]
                } else {
                    candidates[rng.random_range(0..candidates.len())]
                };

                if labels[node] != new_label {
                    labels[node] = new_label;
                    changed = true;
                }
            }

            if !changed {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iterations = self.max_iterations,
                "label propagation hit the sweep cap before settling"
            );
        }

        Ok(Partition::from_dense(network, &labels))
    }
}
