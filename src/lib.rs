//! # cohort
//!
//! Graph community detection and 2-D layout engine.
//!
//! Builds an undirected weighted graph from tabular edge records, partitions
//! its nodes into communities with one of four interchangeable algorithms
//! (Louvain, Girvan-Newman, greedy modularity, label propagation), and
//! computes node coordinates for visualization with a force-directed spring
//! layout or Kamada-Kawai stress majorization. Upload handling, tabular
//! parsing and rendering are the caller's concern; this crate is the engine
//! they feed and consume.
//!
//! ```rust
//! use cohort::{detect, layout, Louvain, Method, Network, SpringLayout, Strategy};
//!
//! let network = Network::from_edges(vec![
//!     ("a", "b"),
//!     ("b", "c"),
//!     ("a", "c"),
//!     ("c", "d"),
//!     ("d", "e"),
//!     ("e", "f"),
//!     ("d", "f"),
//! ]).unwrap();
//!
//! let partition = detect(&network, &Method::Louvain(Louvain::new())).unwrap();
//! let positions = layout(&network, &Strategy::Spring(SpringLayout::new().with_seed(1))).unwrap();
//! assert_eq!(partition.community_count(), 2);
//! assert_eq!(positions.len(), network.node_count());
//! ```

pub mod community;
/// Error types used across `cohort`.
pub mod error;
pub mod graph;
pub mod layout;
pub mod metrics;
pub mod partition;


pub use community::{
    detect, CommunityDetection, DendrogramLevels, GirvanNewman, GreedyModularity,
    LabelPropagation, Louvain, Method,
};
pub use error::{Error, Result};
pub use graph::{EdgeRecord, Network, NodeKey};
pub use layout::{layout, KamadaKawai, LayoutAlgorithm, Positioning, SpringLayout, Strategy};
pub use metrics::modularity;
pub use partition::Partition;
