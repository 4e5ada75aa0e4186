//! Graph store backing the detection and layout algorithms.
//!
//! [`Network`] wraps an undirected [`petgraph`] graph whose node weights are
//! the caller's node identifiers and whose edge weights are `f64`. Callers
//! build it once from tabular edge records; algorithms borrow it read-only
//! and translate between caller keys and the dense `0..n` index space at the
//! boundary.
//!
//! Simple-graph semantics: an edge appearing twice in the input accumulates
//! weight onto a single undirected edge rather than duplicating it, and
//! self-loops are rejected at build time. Contracted graphs produced by
//! [`Network::contract`] are the one place self-loops exist, carrying a
//! community's internal weight.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::{Error, Result};
use crate::partition::Partition;

/// Bound for caller-facing node identifiers.
///
/// `Ord` is part of the bound so that tie-breaks (edge removal order in
/// Girvan-Newman, community grouping) can be made deterministic by comparing
/// caller keys lexicographically.
pub trait NodeKey: Eq + Hash + Ord + Clone + Debug {}

impl<T: Eq + Hash + Ord + Clone + Debug> NodeKey for T {}

/// One tabular edge record, as handed over by an input adapter.
///
/// `source` and `target` are required; a record with either missing fails
/// [`Network::build`] with [`Error::MalformedInput`]. A missing weight
/// defaults to `1.0`.
#[derive(Debug, Clone, Default)]
pub struct EdgeRecord<K> {
    /// Source node identifier.
    pub source: Option<K>,
    /// Target node identifier.
    pub target: Option<K>,
    /// Non-negative edge weight.
    pub weight: Option<f64>,
}

/// Undirected weighted graph over opaque node keys.
#[derive(Debug, Clone)]
pub struct Network<K: NodeKey> {
    graph: UnGraph<K, f64>,
    index: HashMap<K, NodeIndex>,
    /// Normalized endpoint pair -> edge, for O(1) amortized weight lookup
    /// and duplicate accumulation.
    pairs: HashMap<(NodeIndex, NodeIndex), EdgeIndex>,
}

impl<K: NodeKey> Default for Network<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKey> Network<K> {
    /// Create an empty network.
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
            pairs: HashMap::new(),
        }
    }

    /// Build a network from adapter edge records.
    ///
    /// Fails with [`Error::MalformedInput`] when a record is missing a
    /// required endpoint, names the same node twice, or carries a negative
    /// or non-finite weight.
    pub fn build(records: impl IntoIterator<Item = EdgeRecord<K>>) -> Result<Self> {
        let mut net = Self::new();
        for record in records {
            let source = record
                .source
                .ok_or_else(|| Error::malformed("missing source field"))?;
            let target = record
                .target
                .ok_or_else(|| Error::malformed("missing target field"))?;
            net.insert_edge(source, target, record.weight.unwrap_or(1.0))?;
        }
        Ok(net)
    }

    /// Build from `(source, target)` pairs with unit weights.
    pub fn from_edges(edges: impl IntoIterator<Item = (K, K)>) -> Result<Self> {
        Self::from_weighted_edges(edges.into_iter().map(|(s, t)| (s, t, 1.0)))
    }

    /// Build from `(source, target, weight)` triples.
    pub fn from_weighted_edges(edges: impl IntoIterator<Item = (K, K, f64)>) -> Result<Self> {
        let mut net = Self::new();
        for (source, target, weight) in edges {
            net.insert_edge(source, target, weight)?;
        }
        Ok(net)
    }

    /// Build from an explicit node list plus weighted edges.
    ///
    /// Nodes only reachable through the node list become isolated nodes;
    /// edge endpoints are registered on first appearance as usual.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = K>,
        edges: impl IntoIterator<Item = (K, K, f64)>,
    ) -> Result<Self> {
        let mut net = Self::new();
        for node in nodes {
            net.intern(node);
        }
        for (source, target, weight) in edges {
            net.insert_edge(source, target, weight)?;
        }
        Ok(net)
    }

    fn intern(&mut self, key: K) -> NodeIndex {
        match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(key.clone());
                self.index.insert(key, idx);
                idx
            }
        }
    }

    fn insert_edge(&mut self, source: K, target: K, weight: f64) -> Result<()> {
        if !weight.is_finite() {
            return Err(Error::malformed(format!(
                "weight {weight} on edge {source:?} - {target:?} is not finite"
            )));
        }
        if weight < 0.0 {
            return Err(Error::malformed(format!(
                "negative weight {weight} on edge {source:?} - {target:?}"
            )));
        }
        if source == target {
            return Err(Error::malformed(format!(
                "self-loop on node {source:?}"
            )));
        }
        let a = self.intern(source);
        let b = self.intern(target);
        self.accumulate(a, b, weight);
        Ok(())
    }

    /// Accumulate weight onto the undirected edge `a - b`, creating it on
    /// first sight. Self-loops are permitted here; only [`Self::contract`]
    /// reaches this path with `a == b`.
    fn accumulate(&mut self, a: NodeIndex, b: NodeIndex, weight: f64) {
        let key = if a <= b { (a, b) } else { (b, a) };
        match self.pairs.get(&key) {
            Some(&edge) => self.graph[edge] += weight,
            None => {
                let edge = self.graph.add_edge(a, b, weight);
                self.pairs.insert(key, edge);
            }
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// True when the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node keys in dense index order (first-appearance order).
    pub fn nodes(&self) -> impl Iterator<Item = &K> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// True when `key` names a node of this network.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Neighbors of `key` with the connecting edge weight.
    ///
    /// Unknown keys yield an empty iterator. A self-loop reports the node
    /// itself as a neighbor once.
    pub fn neighbors<'a>(&'a self, key: &K) -> impl Iterator<Item = (&'a K, f64)> + 'a {
        self.index.get(key).copied().into_iter().flat_map(move |idx| {
            self.graph.edges(idx).map(move |edge| {
                let other = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (&self.graph[other], *edge.weight())
            })
        })
    }

    /// Weighted degree of `key`: the sum of incident edge weights, with
    /// self-loops counted twice. Unknown keys have degree zero.
    pub fn degree(&self, key: &K) -> f64 {
        match self.index.get(key) {
            Some(&idx) => self.degree_of(idx),
            None => 0.0,
        }
    }

    fn degree_of(&self, idx: NodeIndex) -> f64 {
        self.graph
            .edges(idx)
            .map(|edge| {
                if edge.source() == edge.target() {
                    2.0 * *edge.weight()
                } else {
                    *edge.weight()
                }
            })
            .sum()
    }

    /// Total edge weight `m` (each undirected edge counted once, self-loops
    /// counted once).
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_references().map(|e| *e.weight()).sum()
    }

    /// Weight of the edge between `a` and `b`, if present.
    pub fn edge_weight(&self, a: &K, b: &K) -> Option<f64> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        let key = if ia <= ib { (ia, ib) } else { (ib, ia) };
        self.pairs.get(&key).map(|&edge| self.graph[edge])
    }

    /// Iterate all edges as `(source key, target key, weight)`.
    pub fn edges(&self) -> impl Iterator<Item = (&K, &K, f64)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
    }

    /// Contract the network by a partition: each community becomes one
    /// super-node keyed by its community id, intra-community weight becomes
    /// a self-loop, inter-community weights are summed.
    ///
    /// Returns the contracted network together with a map from each
    /// super-node back to the sorted original keys it absorbed. The source
    /// network is left untouched.
    ///
    /// Fails with [`Error::InvalidParameter`] when the partition does not
    /// cover every node.
    pub fn contract(&self, partition: &Partition<K>) -> Result<(Network<usize>, BTreeMap<usize, Vec<K>>)> {
        let mut contracted = Network::<usize>::new();
        let mut members: BTreeMap<usize, Vec<K>> = BTreeMap::new();

        // Register super-nodes in dense order so isolated communities survive.
        let mut community_of = vec![0usize; self.node_count()];
        for idx in self.graph.node_indices() {
            let key = &self.graph[idx];
            let community = partition.community_of(key).ok_or(Error::InvalidParameter {
                name: "partition",
                message: "partition does not cover every node",
            })?;
            community_of[idx.index()] = community;
            contracted.intern(community);
            members.entry(community).or_default().push(key.clone());
        }

        for edge in self.graph.edge_references() {
            let cu = community_of[edge.source().index()];
            let cv = community_of[edge.target().index()];
            let a = contracted.intern(cu);
            let b = contracted.intern(cv);
            contracted.accumulate(a, b, *edge.weight());
        }

        for keys in members.values_mut() {
            keys.sort();
        }
        Ok((contracted, members))
    }

    /// Keys cloned into dense index order.
    pub(crate) fn key_vec(&self) -> Vec<K> {
        self.nodes().cloned().collect()
    }

    /// Dense adjacency over node indices, excluding self-loops: entry `i`
    /// lists `(neighbor, weight)` pairs.
    pub(crate) fn adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        let mut adj = vec![Vec::new(); self.node_count()];
        for edge in self.graph.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            if u == v {
                continue;
            }
            let w = *edge.weight();
            adj[u].push((v, w));
            adj[v].push((u, w));
        }
        adj
    }

    /// Dense edge list `(u, v, w)` with `u < v`, excluding self-loops.
    pub(crate) fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .filter(|e| e.source() != e.target())
            .map(|e| {
                let (u, v) = (e.source().index(), e.target().index());
                if u < v {
                    (u, v, *e.weight())
                } else {
                    (v, u, *e.weight())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(s: &str, t: &str, w: Option<f64>) -> EdgeRecord<String> {
        EdgeRecord {
            source: Some(s.to_string()),
            target: Some(t.to_string()),
            weight: w,
        }
    }

    #[test]
    fn test_build_defaults_missing_weight() {
        let net = Network::build(vec![record("a", "b", None), record("b", "c", Some(2.5))])
            .unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.edge_weight(&"a".to_string(), &"b".to_string()), Some(1.0));
        assert_eq!(net.edge_weight(&"b".to_string(), &"c".to_string()), Some(2.5));
    }

    #[test]
    fn test_build_rejects_missing_endpoint() {
        let bad = EdgeRecord::<String> {
            source: Some("a".to_string()),
            target: None,
            weight: None,
        };
        let err = Network::build(vec![bad]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn test_build_rejects_self_loop_and_bad_weight() {
        assert!(Network::build(vec![record("a", "a", None)]).is_err());
        assert!(Network::build(vec![record("a", "b", Some(-1.0))]).is_err());
        assert!(Network::build(vec![record("a", "b", Some(f64::NAN))]).is_err());
    }

    #[test]
    fn test_duplicate_edges_accumulate() {
        let net = Network::from_weighted_edges(vec![
            ("a", "b", 1.0),
            ("b", "a", 2.0),
            ("a", "b", 0.5),
        ])
        .unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.edge_weight(&"a", &"b"), Some(3.5));
        assert_eq!(net.total_weight(), 3.5);
    }

    #[test]
    fn test_degree_and_total_weight() {
        let net = Network::from_weighted_edges(vec![
            ("a", "b", 1.0),
            ("b", "c", 2.0),
            ("a", "c", 3.0),
        ])
        .unwrap();
        assert_eq!(net.degree(&"a"), 4.0);
        assert_eq!(net.degree(&"b"), 3.0);
        assert_eq!(net.degree(&"c"), 5.0);
        assert_eq!(net.total_weight(), 6.0);
        assert_eq!(net.degree(&"zzz"), 0.0);
    }

    #[test]
    fn test_neighbors() {
        let net = Network::from_edges(vec![("a", "b"), ("a", "c")]).unwrap();
        let mut seen: Vec<_> = net.neighbors(&"a").map(|(k, w)| (*k, w)).collect();
        seen.sort();
        assert_eq!(seen, vec![("b", 1.0), ("c", 1.0)]);
        assert_eq!(net.neighbors(&"b").count(), 1);
        assert_eq!(net.neighbors(&"missing").count(), 0);
    }

    #[test]
    fn test_isolated_nodes_via_from_parts() {
        let net = Network::from_parts(vec!["x", "a"], vec![("a", "b", 1.0)]).unwrap();
        assert_eq!(net.node_count(), 3);
        assert!(net.contains(&"x"));
        assert_eq!(net.degree(&"x"), 0.0);
        assert_eq!(net.neighbors(&"x").count(), 0);
    }

    #[test]
    fn test_contract_two_triangles_with_bridge() {
        // Two triangles joined by one bridge edge.
        let net = Network::from_edges(vec![
            (1, 2),
            (2, 3),
            (1, 3),
            (4, 5),
            (5, 6),
            (4, 6),
            (3, 4),
        ])
        .unwrap();
        let partition = Partition::from_assignment(
            [(1, 0), (2, 0), (3, 0), (4, 1), (5, 1), (6, 1)]
                .into_iter()
                .collect(),
        );

        let (contracted, members) = net.contract(&partition).unwrap();
        assert_eq!(contracted.node_count(), 2);
        // One bridge edge between the super-nodes plus a self-loop each.
        assert_eq!(contracted.edge_weight(&0, &1), Some(1.0));
        assert_eq!(contracted.edge_weight(&0, &0), Some(3.0));
        assert_eq!(contracted.edge_weight(&1, &1), Some(3.0));
        // Self-loops count twice in degree: 2*3 internal + 1 bridge.
        assert_eq!(contracted.degree(&0), 7.0);
        assert_eq!(contracted.total_weight(), 7.0);

        assert_eq!(members[&0], vec![1, 2, 3]);
        assert_eq!(members[&1], vec![4, 5, 6]);

        // Round trip: expanding the mapping recovers the node set exactly.
        let mut expanded: Vec<i32> = members.values().flatten().copied().collect();
        expanded.sort();
        assert_eq!(expanded, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_contract_requires_total_partition() {
        let net = Network::from_edges(vec![("a", "b")]).unwrap();
        let partial = Partition::from_assignment([("a", 0)].into_iter().collect());
        assert!(matches!(
            net.contract(&partial),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
