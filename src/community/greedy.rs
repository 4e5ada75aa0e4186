//! Greedy modularity maximization.
//!
//! CNM-style agglomeration (Clauset, Newman & Moore 2004): start with every
//! node in its own community and repeatedly merge the pair of connected
//! communities with the largest modularity gain, maintained in a max-heap of
//! candidate merges. Stops when no merge would increase modularity.
//!
//! For communities `c`, `d` with total degrees `Σ_c`, `Σ_d` and connecting
//! weight `w_cd`, merging changes modularity by
//!
//! ```text
//! ΔQ = w_cd/m - (Σ_c × Σ_d)/(2m²)
//! ```
//!
//! Heap entries go stale as their communities merge; a popped entry is
//! validated against the current state and re-seeded when its gain no longer
//! matches. Ties on equal gain break toward the smaller community id pair,
//! making the merge sequence fully deterministic.
//!
//! ## References
//!
//! Clauset, Newman, Moore (2004). "Finding community structure in very large
//! networks." Physical Review E 70, 066111.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use super::traits::CommunityDetection;
use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Greedy modularity maximization. Takes no configuration; given a fixed
/// input order the merge sequence is fully deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyModularity;

impl GreedyModularity {
    /// Create a new greedy modularity detector.
    pub fn new() -> Self {
        Self
    }
}

/// Candidate merge of communities `a < b`.
///
/// Ordered by gain, then toward the smaller id pair, so the heap pops the
/// highest gain with a deterministic tie-break.
#[derive(Debug, Clone, Copy)]
struct Merge {
    gain: f64,
    a: usize,
    b: usize,
}

impl PartialEq for Merge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Merge {}

impl PartialOrd for Merge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Merge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain
            .total_cmp(&other.gain)
            .then_with(|| other.a.cmp(&self.a))
            .then_with(|| other.b.cmp(&self.b))
    }
}

fn pair(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

impl CommunityDetection for GreedyModularity {
    fn detect<K: NodeKey>(&self, network: &Network<K>) -> Result<Partition<K>> {
        let n = network.node_count();
        if n == 0 {
            return Ok(Partition::empty());
        }
        let m = network.total_weight();
        if m == 0.0 {
            let labels: Vec<usize> = (0..n).collect();
            return Ok(Partition::from_dense(network, &labels));
        }

        // One community per node to start.
        let mut sigma: Vec<f64> = vec![0.0; n];
        for (idx, key) in network.nodes().enumerate() {
            sigma[idx] = network.degree(key);
        }
        let mut alive = vec![true; n];
        let mut members: Vec<Vec<usize>> = (0..n).map(|node| vec![node]).collect();

        // Inter-community weights and the adjacency between communities.
        let mut conn: HashMap<(usize, usize), f64> = HashMap::new();
        let mut touching: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (u, v, w) in network.edge_list() {
            *conn.entry(pair(u, v)).or_insert(0.0) += w;
            touching[u].insert(v);
            touching[v].insert(u);
        }

        let gain_of = |conn: &HashMap<(usize, usize), f64>, sigma: &[f64], a: usize, b: usize| {
            conn[&pair(a, b)] / m - sigma[a] * sigma[b] / (2.0 * m * m)
        };

        let mut heap: BinaryHeap<Merge> = conn
            .keys()
            .map(|&(a, b)| Merge {
                gain: gain_of(&conn, &sigma, a, b),
                a,
                b,
            })
            .collect();

        while let Some(candidate) = heap.pop() {
            if candidate.gain <= 0.0 {
                break;
            }
            if !alive[candidate.a] || !alive[candidate.b] {
                continue;
            }
            if !conn.contains_key(&pair(candidate.a, candidate.b)) {
                continue;
            }
            // Validate against the current state; stale entries are
            // re-seeded with their fresh gain and retried.
            let fresh = gain_of(&conn, &sigma, candidate.a, candidate.b);
            if (fresh - candidate.gain).abs() > 1e-12 {
                heap.push(Merge {
                    gain: fresh,
                    a: candidate.a,
                    b: candidate.b,
                });
                continue;
            }

            // Merge b into a.
            let (a, b) = (candidate.a, candidate.b);
            alive[b] = false;
            sigma[a] += sigma[b];
            let absorbed = std::mem::take(&mut members[b]);
            members[a].extend(absorbed);
            conn.remove(&pair(a, b));
            touching[a].remove(&b);

            let b_neighbors = std::mem::take(&mut touching[b]);
            for e in b_neighbors {
                if e == a || !alive[e] {
                    continue;
                }
                let w = conn.remove(&pair(b, e)).unwrap_or(0.0);
                *conn.entry(pair(a, e)).or_insert(0.0) += w;
                touching[e].remove(&b);
                touching[e].insert(a);
                touching[a].insert(e);
            }

            // Only pairs touching the merged community changed.
            for &e in &touching[a] {
                if alive[e] {
                    heap.push(Merge {
                        gain: gain_of(&conn, &sigma, a, e),
                        a: pair(a, e).0,
                        b: pair(a, e).1,
                    });
                }
            }
        }

        let mut labels = vec![0; n];
        for (community, nodes) in members.iter().enumerate() {
            if alive[community] {
                for &node in nodes {
                    labels[node] = community;
                }
            }
        }
        Ok(Partition::from_dense(network, &labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::modularity;

    #[test]
    fn test_greedy_two_cliques_with_bridge() {
        let net = Network::from_edges(vec![
            (0, 1),
            (1, 2),
            (0, 2),
            (3, 4),
            (4, 5),
            (3, 5),
            (2, 3),
        ])
        .unwrap();
        let partition = GreedyModularity::new().detect(&net).unwrap();
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.community_of(&0), partition.community_of(&2));
        assert_eq!(partition.community_of(&3), partition.community_of(&5));
        assert_ne!(partition.community_of(&0), partition.community_of(&3));
    }

    #[test]
    fn test_greedy_disjoint_triangles() {
        let net =
            Network::from_edges(vec![(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)]).unwrap();
        let partition = GreedyModularity::new().detect(&net).unwrap();
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.community_of(&1), partition.community_of(&2));
        assert_ne!(partition.community_of(&1), partition.community_of(&4));
    }

    #[test]
    fn test_greedy_never_worsens_modularity() {
        let net = Network::from_edges(vec![
            (0, 1),
            (1, 2),
            (0, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (3, 5),
            (5, 6),
        ])
        .unwrap();
        let singletons = Partition::from_dense(&net, &(0..7).collect::<Vec<_>>());
        let partition = GreedyModularity::new().detect(&net).unwrap();
        let q_single = modularity(&net, &singletons).unwrap();
        let q_greedy = modularity(&net, &partition).unwrap();
        assert!(q_greedy >= q_single);
    }

    #[test]
    fn test_greedy_isolated_nodes_stay_singleton() {
        let net = Network::from_parts(vec!["lone"], vec![("a", "b", 1.0)]).unwrap();
        let partition = GreedyModularity::new().detect(&net).unwrap();
        assert_eq!(partition.len(), 3);
        let lone = partition.community_of(&"lone");
        assert_ne!(lone, partition.community_of(&"a"));
        assert_ne!(lone, partition.community_of(&"b"));
    }

    #[test]
    fn test_greedy_empty_and_edgeless() {
        assert!(GreedyModularity::new()
            .detect(&Network::<u8>::new())
            .unwrap()
            .is_empty());

        let net = Network::from_parts(vec![1, 2], vec![]).unwrap();
        let partition = GreedyModularity::new().detect(&net).unwrap();
        assert_eq!(partition.community_count(), 2);
    }

    #[test]
    fn test_greedy_is_deterministic() {
        let net = Network::from_edges(vec![
            (0, 1),
            (1, 2),
            (2, 0),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 3),
        ])
        .unwrap();
        let first = GreedyModularity::new().detect(&net).unwrap();
        let second = GreedyModularity::new().detect(&net).unwrap();
        assert_eq!(first, second);
    }
}
