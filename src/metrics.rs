//! Partition quality metrics.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Modularity Q of a partition, in [-1, 1].
///
/// ```text
/// Q = (1/2m) Σ_ij [A_ij - (k_i k_j)/2m] δ(c_i, c_j)
/// ```
///
/// Computed per community as `I_c/m - (Σ_c/2m)²` where `I_c` is the
/// community's internal weight (intra-community edges plus self-loops) and
/// `Σ_c` its total weighted degree. Higher is better; a zero-edge graph has
/// modularity 0 by convention.
///
/// Fails with [`Error::InvalidParameter`] when the partition does not cover
/// every node of the network.
pub fn modularity<K: NodeKey>(network: &Network<K>, partition: &Partition<K>) -> Result<f64> {
    let m = network.total_weight();
    if m == 0.0 {
        return Ok(0.0);
    }

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut degree: HashMap<usize, f64> = HashMap::new();

    for key in network.nodes() {
        let community = partition.community_of(key).ok_or(Error::InvalidParameter {
            name: "partition",
            message: "partition does not cover every node",
        })?;
        *degree.entry(community).or_insert(0.0) += network.degree(key);
    }
    for (source, target, weight) in network.edges() {
        // community_of is total here; both endpoints were checked above.
        let cu = partition.community_of(source).unwrap_or(usize::MAX);
        let cv = partition.community_of(target).unwrap_or(usize::MAX);
        if cu == cv {
            *internal.entry(cu).or_insert(0.0) += weight;
        }
    }

    let q = degree
        .iter()
        .map(|(community, &sigma)| {
            let inner = internal.get(community).copied().unwrap_or(0.0);
            inner / m - (sigma / (2.0 * m)).powi(2)
        })
        .sum();
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modularity_two_triangles() {
        // Two disjoint triangles; the natural split scores Q = 0.5.
        let net = Network::from_edges(vec![(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)])
            .unwrap();
        let split = Partition::from_assignment(
            [(1, 0), (2, 0), (3, 0), (4, 1), (5, 1), (6, 1)]
                .into_iter()
                .collect(),
        );
        let q = modularity(&net, &split).unwrap();
        assert!((q - 0.5).abs() < 1e-12);

        // Lumping everything together scores 0.
        let lump = Partition::from_assignment((1..=6).map(|n| (n, 0)).collect());
        let q = modularity(&net, &lump).unwrap();
        assert!(q.abs() < 1e-12);
    }

    #[test]
    fn test_modularity_zero_edges() {
        let net = Network::<i32>::from_parts(vec![1, 2, 3], vec![]).unwrap();
        let singletons = Partition::from_assignment([(1, 0), (2, 1), (3, 2)].into_iter().collect());
        assert_eq!(modularity(&net, &singletons).unwrap(), 0.0);
    }

    #[test]
    fn test_modularity_requires_total_partition() {
        let net = Network::from_edges(vec![("a", "b")]).unwrap();
        let partial = Partition::from_assignment([("a", 0)].into_iter().collect());
        assert!(modularity(&net, &partial).is_err());
    }
}
