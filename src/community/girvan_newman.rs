//! Girvan-Newman divisive clustering.
//!
//! Repeatedly removes the edge with the highest betweenness centrality,
//! emitting one dendrogram level each time the graph splits into more
//! connected components.
//!
//! ## Edge Betweenness (Brandes 2001)
//!
//! The betweenness of an edge is the fraction of all-pairs shortest paths
//! that traverse it. It is computed by running, from every source node, a
//! BFS that counts shortest paths and then back-propagates dependency
//! scores onto the edges. Per-source passes are independent and run on the
//! rayon pool, each accumulating into a private score buffer that is reduced
//! by summation; the total is halved once for undirected double counting.
//!
//! ## Determinism
//!
//! Among edges whose betweenness is within a small epsilon of the maximum,
//! the edge whose endpoint key pair is lexicographically least is removed.
//! The epsilon absorbs the reduction-order float jitter of the parallel sum,
//! so runs are reproducible.
//!
//! ## References
//!
//! Newman & Girvan (2004). "Finding and evaluating community structure in
//! networks." Physical Review E 69, 026113.
//! Brandes (2001). "A faster algorithm for betweenness centrality."

use std::collections::VecDeque;

use rayon::prelude::*;

use super::traits::CommunityDetection;
use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Relative tolerance when comparing betweenness scores for the removal
/// tie-break.
const SCORE_EPSILON: f64 = 1e-9;

/// Girvan-Newman divisive community detection.
#[derive(Debug, Clone, Default)]
pub struct GirvanNewman {
    /// Cap on the number of dendrogram levels produced.
    max_levels: Option<usize>,
}

impl GirvanNewman {
    /// Create a new Girvan-Newman detector with no level cap.
    pub fn new() -> Self {
        Self { max_levels: None }
    }

    /// Cap the number of dendrogram levels produced by [`Self::levels`] and
    /// [`Self::full_dendrogram`].
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = Some(max_levels);
        self
    }

    /// Lazy sequence of dendrogram levels, finest first.
    ///
    /// Each `next()` removes highest-betweenness edges from a private working
    /// copy until the component count increases, then yields the component
    /// partition. The sequence is exhausted when no edges remain. The input
    /// network is never mutated; calling `levels` again restarts from the
    /// original graph.
    pub fn levels<K: NodeKey>(&self, network: &Network<K>) -> DendrogramLevels<K> {
        let keys = network.key_vec();
        let edge_list = network.edge_list();
        let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); keys.len()];
        let mut endpoints = Vec::with_capacity(edge_list.len());
        for (id, &(u, v, _)) in edge_list.iter().enumerate() {
            adj[u].push((v, id));
            adj[v].push((u, id));
            endpoints.push((u, v));
        }
        let alive = vec![true; endpoints.len()];
        let edges_left = endpoints.len();

        let mut levels = DendrogramLevels {
            keys,
            adj,
            endpoints,
            alive,
            edges_left,
            components: 0,
            remaining: self.max_levels,
        };
        levels.components = levels.component_labels().1;
        levels
    }

    /// The finest split: first element of [`Self::levels`].
    pub fn next_level<K: NodeKey>(&self, network: &Network<K>) -> Option<Partition<K>> {
        self.levels(network).next()
    }

    /// Eagerly collect the dendrogram, finest to coarsest, bounded by the
    /// configured level cap when one is set.
    pub fn full_dendrogram<K: NodeKey>(&self, network: &Network<K>) -> Vec<Partition<K>> {
        self.levels(network).collect()
    }
}

impl CommunityDetection for GirvanNewman {
    /// Remove highest-betweenness edges until the graph has more than one
    /// connected component, then partition by component.
    ///
    /// A graph that is already disconnected therefore detects as its
    /// connected components without removing anything, and an edgeless graph
    /// as all singletons; for a connected graph this is the first dendrogram
    /// level.
    fn detect<K: NodeKey>(&self, network: &Network<K>) -> Result<Partition<K>> {
        if network.is_empty() {
            return Ok(Partition::empty());
        }
        let mut levels = self.levels(network);
        let (labels, components) = levels.component_labels();
        if components > 1 || levels.edges_left == 0 {
            return Ok(Partition::from_dense(network, &labels));
        }
        // Connected with at least one edge: the first split always exists.
        levels.remaining = None;
        Ok(levels.next().unwrap_or_else(|| {
            let lumped = vec![0; network.node_count()];
            Partition::from_dense(network, &lumped)
        }))
    }
}

/// Iterator over Girvan-Newman dendrogram levels.
///
/// Owns an edge-depleted working copy of the source network; see
/// [`GirvanNewman::levels`].
#[derive(Debug, Clone)]
pub struct DendrogramLevels<K: NodeKey> {
    keys: Vec<K>,
    /// Adjacency as `(neighbor, edge id)`; removed edges stay listed but are
    /// dead in `alive`.
    adj: Vec<Vec<(usize, usize)>>,
    endpoints: Vec<(usize, usize)>,
    alive: Vec<bool>,
    edges_left: usize,
    /// Component count of the current depleted graph.
    components: usize,
    /// Levels still allowed under the cap, if any.
    remaining: Option<usize>,
}

impl<K: NodeKey> DendrogramLevels<K> {
    /// Label nodes by connected component over the surviving edges.
    ///
    /// Components are numbered in order of their lowest dense node index.
    fn component_labels(&self) -> (Vec<usize>, usize) {
        let n = self.keys.len();
        let mut labels = vec![usize::MAX; n];
        let mut count = 0;
        let mut queue = VecDeque::new();
        for start in 0..n {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = count;
            queue.push_back(start);
            while let Some(node) = queue.pop_front() {
                for &(neighbor, edge) in &self.adj[node] {
                    if self.alive[edge] && labels[neighbor] == usize::MAX {
                        labels[neighbor] = count;
                        queue.push_back(neighbor);
                    }
                }
            }
            count += 1;
        }
        (labels, count)
    }

    /// Brandes' algorithm over the surviving edges: one BFS pass per source,
    /// parallelized with per-thread score buffers reduced by summation.
    fn edge_betweenness(&self) -> Vec<f64> {
        let n = self.keys.len();
        let m = self.endpoints.len();
        // Borrow only what the worker closure reads so the parallel pass
        // does not require the key type to be Sync.
        let adj = &self.adj;
        let alive = &self.alive;

        let mut scores = (0..n)
            .into_par_iter()
            .fold(
                || vec![0.0; m],
                |mut acc, source| {
                    let mut order = Vec::with_capacity(n);
                    let mut queue = VecDeque::new();
                    let mut dist = vec![-1i64; n];
                    let mut sigma = vec![0.0f64; n];
                    let mut preds: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];

                    dist[source] = 0;
                    sigma[source] = 1.0;
                    queue.push_back(source);
                    while let Some(node) = queue.pop_front() {
                        order.push(node);
                        for &(neighbor, edge) in &adj[node] {
                            if !alive[edge] {
                                continue;
                            }
                            if dist[neighbor] < 0 {
                                dist[neighbor] = dist[node] + 1;
                                queue.push_back(neighbor);
                            }
                            if dist[neighbor] == dist[node] + 1 {
                                sigma[neighbor] += sigma[node];
                                preds[neighbor].push((node, edge));
                            }
                        }
                    }

                    // Back-propagate dependencies onto edges.
                    let mut delta = vec![0.0f64; n];
                    for &node in order.iter().rev() {
                        for &(pred, edge) in &preds[node] {
                            let contribution =
                                sigma[pred] / sigma[node] * (1.0 + delta[node]);
                            acc[edge] += contribution;
                            delta[pred] += contribution;
                        }
                    }
                    acc
                },
            )
            .reduce(
                || vec![0.0; m],
                |mut left, right| {
                    for (a, b) in left.iter_mut().zip(right) {
                        *a += b;
                    }
                    left
                },
            );

        // Each undirected path was counted from both endpoints.
        for score in &mut scores {
            *score /= 2.0;
        }
        scores
    }

    /// The surviving edge to remove next: maximal betweenness, ties within
    /// epsilon broken toward the lexicographically least endpoint key pair.
    fn most_central_edge(&self, scores: &[f64]) -> Option<usize> {
        let max = scores
            .iter()
            .enumerate()
            .filter(|&(edge, _)| self.alive[edge])
            .map(|(_, &score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return None;
        }
        let cutoff = max - SCORE_EPSILON * max.max(1.0);
        (0..self.endpoints.len())
            .filter(|&edge| self.alive[edge] && scores[edge] >= cutoff)
            .min_by_key(|&edge| {
                let (u, v) = self.endpoints[edge];
                let (ku, kv) = (&self.keys[u], &self.keys[v]);
                if ku <= kv { (ku, kv) } else { (kv, ku) }
            })
    }
}

impl<K: NodeKey> Iterator for DendrogramLevels<K> {
    type Item = Partition<K>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) || self.edges_left == 0 {
            return None;
        }

        while self.edges_left > 0 {
            let scores = self.edge_betweenness();
            let edge = self.most_central_edge(&scores)?;
            self.alive[edge] = false;
            self.edges_left -= 1;

            let (labels, count) = self.component_labels();
            if count > self.components {
                self.components = count;
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(Partition::from_labels(&self.keys, &labels));
            }
        }
        None
    }
}
