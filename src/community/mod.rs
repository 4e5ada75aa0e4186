//! Community detection algorithms for graphs.
//!
//! Given a graph, find natural groupings where nodes within groups are
//! densely connected, and connections between groups are sparse.
//!
//! ## The Modularity Objective
//!
//! Three of the four algorithms optimize **modularity** Q, which compares
//! the actual edge weight within communities to the expected weight in a
//! random graph with the same degree sequence:
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - (k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Where:
//! - m = total edge weight (sum of all edges)
//! - A_ij = edge weight between i and j
//! - k_i = weighted degree of node i
//! - δ(c_i, c_j) = 1 if i and j are in same community
//!
//! **Intuition**: for each pair in the same community we add (actual weight)
//! minus (expected weight). A good partition has Q > 0, meaning more
//! internal weight than expected by chance.
//!
//! ## Algorithms
//!
//! ### Louvain
//!
//! Fast modularity optimization ([Blondel et al. 2008](https://arxiv.org/abs/0803.0476)):
//! local node moves followed by graph contraction, repeated until the score
//! stops improving. The usual default.
//!
//! ### Girvan-Newman
//!
//! Divisive clustering (Newman & Girvan 2004): repeatedly remove the edge
//! with highest betweenness centrality, emitting a dendrogram level each
//! time the graph splits. Expensive but gives a full hierarchy.
//!
//! ### Greedy modularity
//!
//! CNM-style agglomeration (Clauset, Newman & Moore 2004): merge the
//! community pair with the best modularity gain until no merge improves Q.
//! Fully deterministic.
//!
//! ### Label propagation
//!
//! O(E) per sweep: nodes adopt the plurality label among their neighbors.
//! The cheapest and least stable; supply a seed for reproducible runs.
//!
//! ## Usage
//!
//! ```rust
//! use cohort::{detect, Louvain, Method, Network};
//!
//! let network = Network::from_edges(vec![
//!     ("a", "b"),
//!     ("b", "c"),
//!     ("a", "c"),
//! ]).unwrap();
//!
//! let partition = detect(&network, &Method::Louvain(Louvain::new())).unwrap();
//! assert_eq!(partition.community_count(), 1);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."
//! - Clauset, Newman, Moore (2004). "Finding community structure in very large networks."
//! - Raghavan et al. (2007). "Near linear time algorithm to detect community
//!   structures in large-scale networks."

mod girvan_newman;
mod greedy;
mod label_prop;
mod louvain;
mod traits;

pub use girvan_newman::{DendrogramLevels, GirvanNewman};
pub use greedy::GreedyModularity;
pub use label_prop::LabelPropagation;
pub use louvain::Louvain;
pub use traits::CommunityDetection;

use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Caller-selected detection algorithm with its configuration.
#[derive(Debug, Clone)]
pub enum Method {
    /// Louvain modularity optimization.
    Louvain(Louvain),
    /// Girvan-Newman divisive clustering.
    GirvanNewman(GirvanNewman),
    /// Greedy modularity maximization.
    GreedyModularity(GreedyModularity),
    /// Label propagation.
    LabelPropagation(LabelPropagation),
}

/// Uniform dispatcher: run the selected algorithm on `network`.
///
/// Equivalent to calling [`CommunityDetection::detect`] on the wrapped
/// instance directly.
pub fn detect<K: NodeKey>(network: &Network<K>, method: &Method) -> Result<Partition<K>> {
    match method {
        Method::Louvain(algorithm) => algorithm.detect(network),
        Method::GirvanNewman(algorithm) => algorithm.detect(network),
        Method::GreedyModularity(algorithm) => algorithm.detect(network),
        Method::LabelPropagation(algorithm) => algorithm.detect(network),
    }
}
