//! Layout traits.

use super::Positioning;
use crate::error::Result;
use crate::graph::{Network, NodeKey};

/// Trait for 2-D layout algorithms.
pub trait LayoutAlgorithm {
    /// Lay out a network in the plane.
    ///
    /// Returns a total positioning: every node of the network receives a
    /// finite coordinate pair. An empty network yields an empty positioning.
    fn layout<K: NodeKey>(&self, network: &Network<K>) -> Result<Positioning<K>>;
}
