//! Community detection traits.

use crate::error::Result;
use crate::graph::{Network, NodeKey};
use crate::partition::Partition;

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Detect communities in a network.
    ///
    /// Returns a total partition: every node of the network is assigned a
    /// community id. An empty network yields an empty partition.
    fn detect<K: NodeKey>(&self, network: &Network<K>) -> Result<Partition<K>>;
}
