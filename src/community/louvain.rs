//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph
//! aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! Louvain is a multi-level, greedy modularity optimization algorithm:
//!
//! 1. **Phase 1 (Local Moving)**: Start with each node in its own community.
//!    Repeatedly move nodes to the neighboring community with the highest
//!    modularity gain until no improvement.
//!
//! 2. **Phase 2 (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!    Self-loops carry internal community weight, contributing twice to
//!    degree.
//!
//! 3. **Iterate**: Repeat phases 1-2 on the meta-graph until modularity
//!    stops improving or the graph contracts to a single node.
//!
//! ## Determinism
//!
//! Without a seed, local moving visits nodes in ascending dense-index order
//! (first-appearance order of the caller's keys) and ties on equal gain keep
//! the lowest candidate community id. With a seed, the visitation order is
//! reshuffled each sweep from a [`StdRng`], so two runs with the same seed
//! and input order produce identical partitions.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use std::collections::HashMap;

use rand::prelude::*;
use tracing::debug;

use super::traits::CommunityDetection;
use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Sweeps of local moving per level before the phase is cut off.
const MAX_SWEEPS: usize = 100;

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Minimum modularity improvement to keep going.
    tolerance: f64,
    /// Maximum levels of aggregation.
    max_passes: usize,
    /// Random seed for the sweep order.
    seed: Option<u64>,
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            tolerance: 1e-7,
            max_passes: 100,
            seed: None,
        }
    }

    /// Set the minimum modularity gain required to continue.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of two-phase passes (aggregation levels).
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Seed the sweep order for reproducible randomized runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Modularity of a dense-level partition.
    ///
    /// `m` counts every edge once plus self-loops once; self-loops count
    /// twice in degree.
    fn modularity_dense(
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> f64 {
        let n = self_loops.len();
        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return 0.0;
        }

        let mut degrees = vec![0.0; n];
        for &(i, j, w) in edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            degrees[i] += 2.0 * sl;
        }

        let mut internal = HashMap::new();
        let mut sigma = HashMap::new();
        for &(i, j, w) in edges {
            if communities[i] == communities[j] {
                *internal.entry(communities[i]).or_insert(0.0) += w;
            }
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            *internal.entry(communities[i]).or_insert(0.0) += sl;
        }
        for (i, &k) in degrees.iter().enumerate() {
            *sigma.entry(communities[i]).or_insert(0.0) += k;
        }

        sigma
            .iter()
            .map(|(community, &s)| {
                let inner = internal.get(community).copied().unwrap_or(0.0);
                inner / m - (s / (2.0 * m)).powi(2)
            })
            .sum()
    }

    /// Phase 1: local moving over a dense level graph.
    ///
    /// Returns `(communities, moved)` where `moved` reports whether any node
    /// changed community.
    fn local_moving(
        &self,
        n: usize,
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        rng: &mut Option<StdRng>,
    ) -> (Vec<usize>, bool) {
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &(i, j, w) in edges {
            adj[i].push((j, w));
            adj[j].push((i, w));
        }

        let m: f64 = edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>();
        if m == 0.0 {
            return ((0..n).collect(), false);
        }

        let mut degrees = vec![0.0; n];
        for &(i, j, w) in edges {
            degrees[i] += w;
            degrees[j] += w;
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            degrees[i] += 2.0 * sl;
        }

        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = degrees.clone();
        let mut order: Vec<usize> = (0..n).collect();
        let mut any_moved = false;

        for _sweep in 0..MAX_SWEEPS {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }
            let mut moved = false;

            for &node in &order {
                let current = communities[node];
                let ki = degrees[node];

                // Take the node out of its community while evaluating moves.
                community_degrees[current] -= ki;

                let mut weight_to: HashMap<usize, f64> = HashMap::new();
                for &(neighbor, w) in &adj[node] {
                    *weight_to.entry(communities[neighbor]).or_insert(0.0) += w;
                }

                // Gain of rejoining the (depleted) current community, the
                // baseline any move must beat by more than the tolerance.
                let stay_gain = weight_to.get(&current).copied().unwrap_or(0.0) / m
                    - community_degrees[current] * ki / (2.0 * m * m);

                // Candidates in ascending community id so equal gains keep
                // the lowest id.
                let mut candidates: Vec<(usize, f64)> = weight_to.into_iter().collect();
                candidates.sort_unstable_by_key(|&(community, _)| community);

                let mut best = current;
                let mut best_gain = stay_gain;
                for (community, ki_in) in candidates {
                    if community == current {
                        continue;
                    }
                    let gain =
                        ki_in / m - community_degrees[community] * ki / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best = community;
                    }
                }

                if best != current && best_gain - stay_gain > self.tolerance {
                    communities[node] = best;
                    community_degrees[best] += ki;
                    moved = true;
                    any_moved = true;
                } else {
                    community_degrees[current] += ki;
                }
            }

            if !moved {
                break;
            }
        }

        (communities, any_moved)
    }

    /// Phase 2: contract communities into super-nodes.
    ///
    /// Intra-community weight (including existing self-loops) becomes the
    /// super-node's self-loop. Returns the contracted edge list, self-loops,
    /// and each super-node's member list in the previous level's indices.
    fn aggregate(
        edges: &[(usize, usize, f64)],
        self_loops: &[f64],
        communities: &[usize],
    ) -> (Vec<(usize, usize, f64)>, Vec<f64>, Vec<Vec<usize>>) {
        let mut ids: Vec<usize> = communities.to_vec();
        ids.sort_unstable();
        ids.dedup();
        let renumber: HashMap<usize, usize> =
            ids.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let n_new = ids.len();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_new];
        for (node, &community) in communities.iter().enumerate() {
            members[renumber[&community]].push(node);
        }

        let mut between: HashMap<(usize, usize), f64> = HashMap::new();
        let mut loops = vec![0.0; n_new];
        for &(i, j, w) in edges {
            let ci = renumber[&communities[i]];
            let cj = renumber[&communities[j]];
            if ci == cj {
                loops[ci] += w;
            } else {
                let key = if ci < cj { (ci, cj) } else { (cj, ci) };
                *between.entry(key).or_insert(0.0) += w;
            }
        }
        for (i, &sl) in self_loops.iter().enumerate() {
            loops[renumber[&communities[i]]] += sl;
        }

        let new_edges = between.into_iter().map(|((i, j), w)| (i, j, w)).collect();
        (new_edges, loops, members)
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect<K: NodeKey>(&self, network: &Network<K>) -> Result<Partition<K>> {
        let n = network.node_count();
        if n == 0 {
            return Ok(Partition::empty());
        }
        if network.total_weight() == 0.0 {
            // No edges: each node is its own community.
            let labels: Vec<usize> = (0..n).collect();
            return Ok(Partition::from_dense(network, &labels));
        }

        let mut rng = self.seed.map(StdRng::seed_from_u64);

        let mut level_n = n;
        let mut edges = network.edge_list();
        let mut self_loops = vec![0.0; n];
        let mut mapping_stack: Vec<Vec<Vec<usize>>> = Vec::new();
        let mut q_prev = Self::modularity_dense(&edges, &self_loops, &(0..n).collect::<Vec<_>>());

        for level in 0..self.max_passes {
            let (communities, moved) = self.local_moving(level_n, &edges, &self_loops, &mut rng);
            if !moved {
                break;
            }

            let q_now = Self::modularity_dense(&edges, &self_loops, &communities);
            if q_now - q_prev <= self.tolerance {
                break;
            }
            q_prev = q_now;

            let (new_edges, new_loops, members) =
                Self::aggregate(&edges, &self_loops, &communities);
            debug!(
                level,
                modularity = q_now,
                communities = members.len(),
                "louvain level complete"
            );

            if members.len() == level_n {
                break;
            }
            level_n = members.len();
            edges = new_edges;
            self_loops = new_loops;
            mapping_stack.push(members);

            if level_n == 1 {
                break;
            }
        }

        // Expand the coarsest identity labelling back down the contraction
        // chain to the original nodes.
        let mut labels: Vec<usize> = (0..level_n).collect();
        while let Some(members) = mapping_stack.pop() {
            let size = members.iter().map(Vec::len).sum();
            let mut expanded = vec![0; size];
            for (super_node, nodes) in members.iter().enumerate() {
                for &node in nodes {
                    expanded[node] = labels[super_node];
                }
            }
            labels = expanded;
        }

        Ok(Partition::from_dense(network, &labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::modularity;

    #[test]
    fn test_louvain_triangle() {
        // A triangle is well-connected and collapses to one community.
        let net = Network::from_edges(vec![(0, 1), (1, 2), (0, 2)]).unwrap();
        let partition = Louvain::new().detect(&net).unwrap();
        assert_eq!(partition.len(), 3);
        assert_eq!(partition.community_count(), 1);
    }

    #[test]
    fn test_louvain_two_cliques_with_bridge() {
        let net = Network::from_edges(vec![
            ("a0", "a1"),
            ("a1", "a2"),
            ("a0", "a2"),
            ("b0", "b1"),
            ("b1", "b2"),
            ("b0", "b2"),
            ("a2", "b0"),
        ])
        .unwrap();

        let partition = Louvain::new().detect(&net).unwrap();
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.community_of(&"a0"), partition.community_of(&"a2"));
        assert_eq!(partition.community_of(&"b0"), partition.community_of(&"b2"));
        assert_ne!(partition.community_of(&"a0"), partition.community_of(&"b0"));
    }

    #[test]
    fn test_louvain_empty_graph() {
        let net = Network::<u32>::new();
        let partition = Louvain::new().detect(&net).unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn test_louvain_edgeless_graph_is_singletons() {
        let net = Network::from_parts(vec![1, 2, 3], vec![]).unwrap();
        let partition = Louvain::new().detect(&net).unwrap();
        assert_eq!(partition.len(), 3);
        assert_eq!(partition.community_count(), 3);
    }

    #[test]
    fn test_louvain_disjoint_triangles() {
        let net =
            Network::from_edges(vec![(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)]).unwrap();
        let partition = Louvain::new().detect(&net).unwrap();
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.community_of(&1), partition.community_of(&3));
        assert_eq!(partition.community_of(&4), partition.community_of(&6));
        assert_ne!(partition.community_of(&1), partition.community_of(&4));
    }

    #[test]
    fn test_louvain_seeded_runs_are_identical() {
        let edges: Vec<(u32, u32)> = vec![
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 3),
            (3, 4),
            (3, 5),
            (4, 5),
            (5, 6),
            (6, 7),
            (6, 8),
            (7, 8),
        ];
        let net = Network::from_edges(edges).unwrap();
        let first = Louvain::new().with_seed(7).detect(&net).unwrap();
        let second = Louvain::new().with_seed(7).detect(&net).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_louvain_improves_on_singletons() {
        let net = Network::from_edges(vec![
            (0, 1),
            (1, 2),
            (0, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (3, 5),
        ])
        .unwrap();
        let singletons = Partition::from_dense(&net, &[0, 1, 2, 3, 4, 5]);
        let partition = Louvain::new().detect(&net).unwrap();
        let q_single = modularity(&net, &singletons).unwrap();
        let q_louvain = modularity(&net, &partition).unwrap();
        assert!(q_louvain > q_single);
    }

    #[test]
    fn test_louvain_weighted_bridge_pulls_node_across() {
        // Node 2 sits between two pairs; the heavy edge decides its side.
        let net = Network::from_weighted_edges(vec![
            (0, 1, 1.0),
            (1, 2, 10.0),
            (2, 3, 0.1),
            (3, 4, 1.0),
        ])
        .unwrap();
        let partition = Louvain::new().detect(&net).unwrap();
        assert_eq!(partition.community_of(&1), partition.community_of(&2));
        assert_ne!(partition.community_of(&2), partition.community_of(&3));
    }
}
