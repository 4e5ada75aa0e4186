//! Community assignments produced by the detection algorithms.

use std::collections::HashMap;

use crate::graph::{Network, NodeKey};

/// A total assignment of nodes to communities.
///
/// Community ids are small non-negative integers that are only meaningful
/// for equality; no ordering is implied between the ids of different runs
/// or algorithms. Partitions built by the detection algorithms are
/// renumbered to consecutive first-seen ids in node order, so identical
/// groupings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition<K: NodeKey> {
    assignment: HashMap<K, usize>,
}

impl<K: NodeKey> Partition<K> {
    /// An empty partition (the detection result for an empty graph).
    pub fn empty() -> Self {
        Self {
            assignment: HashMap::new(),
        }
    }

    /// Wrap an explicit node -> community map.
    pub fn from_assignment(assignment: HashMap<K, usize>) -> Self {
        Self { assignment }
    }

    /// Build from dense per-index labels, renumbering communities to
    /// consecutive integers in first-seen dense order.
    pub(crate) fn from_dense(network: &Network<K>, labels: &[usize]) -> Self {
        debug_assert_eq!(labels.len(), network.node_count());
        let mut renumber: HashMap<usize, usize> = HashMap::new();
        let mut assignment = HashMap::with_capacity(labels.len());
        for (idx, key) in network.nodes().enumerate() {
            let next = renumber.len();
            let id = *renumber.entry(labels[idx]).or_insert(next);
            assignment.insert(key.clone(), id);
        }
        Self { assignment }
    }

    /// Like [`Self::from_dense`], but over an explicit key slice.
    pub(crate) fn from_labels(keys: &[K], labels: &[usize]) -> Self {
        debug_assert_eq!(labels.len(), keys.len());
        let mut renumber: HashMap<usize, usize> = HashMap::new();
        let mut assignment = HashMap::with_capacity(labels.len());
        for (key, &label) in keys.iter().zip(labels) {
            let next = renumber.len();
            let id = *renumber.entry(label).or_insert(next);
            assignment.insert(key.clone(), id);
        }
        Self { assignment }
    }

    /// Community of `key`, if the node is covered.
    pub fn community_of(&self, key: &K) -> Option<usize> {
        self.assignment.get(key).copied()
    }

    /// Number of nodes covered.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// True when no node is covered.
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Number of distinct communities.
    pub fn community_count(&self) -> usize {
        let mut ids: Vec<usize> = self.assignment.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Iterate `(node, community)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.assignment.iter().map(|(k, &c)| (k, c))
    }

    /// Group nodes by community: communities in ascending id order, each
    /// member list sorted by key.
    pub fn communities(&self) -> Vec<Vec<K>> {
        let mut grouped: HashMap<usize, Vec<K>> = HashMap::new();
        for (key, &community) in &self.assignment {
            grouped.entry(community).or_default().push(key.clone());
        }
        let mut ids: Vec<usize> = grouped.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| {
                let mut members = grouped.remove(&id).unwrap_or_default();
                members.sort();
                members
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dense_renumbers_first_seen() {
        let net = Network::from_edges(vec![("a", "b"), ("c", "d")]).unwrap();
        // Dense order is a, b, c, d; arbitrary labels renumber to 0, 0, 1, 1.
        let partition = Partition::from_dense(&net, &[7, 7, 3, 3]);
        assert_eq!(partition.community_of(&"a"), Some(0));
        assert_eq!(partition.community_of(&"b"), Some(0));
        assert_eq!(partition.community_of(&"c"), Some(1));
        assert_eq!(partition.community_of(&"d"), Some(1));
        assert_eq!(partition.community_count(), 2);
    }

    #[test]
    fn test_communities_grouping_is_sorted() {
        let partition = Partition::from_assignment(
            [("d", 1), ("a", 0), ("c", 1), ("b", 0)].into_iter().collect(),
        );
        assert_eq!(partition.communities(), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(partition.len(), 4);
    }

    #[test]
    fn test_empty_partition() {
        let partition = Partition::<String>::empty();
        assert!(partition.is_empty());
        assert_eq!(partition.community_count(), 0);
        assert!(partition.communities().is_empty());
    }
}
