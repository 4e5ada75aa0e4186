//! 2-D layout algorithms for graph visualization.
//!
//! Two interchangeable strategies turn a [`Network`] into a [`Positioning`],
//! a total map from node key to finite plane coordinates:
//!
//! - [`SpringLayout`]: Fruchterman-Reingold force-directed layout. Fast,
//!   randomized unless seeded, tolerates disconnected graphs (repulsion
//!   pushes components apart).
//! - [`KamadaKawai`]: stress majorization against all-pairs graph
//!   distances. Deterministic; disconnected graphs are laid out one
//!   component at a time and placed on a grid so components never overlap.
//!
//! The engine supplies coordinates only; color assignment, legends and
//! hover text belong to the render consumer.
//!
//! ```rust
//! use cohort::{layout, Network, SpringLayout, Strategy};
//!
//! let network = Network::from_edges(vec![("a", "b"), ("b", "c")]).unwrap();
//! let positions = layout(&network, &Strategy::Spring(SpringLayout::new().with_seed(1))).unwrap();
//! assert_eq!(positions.len(), 3);
//! ```

mod kamada_kawai;
mod spring;
mod traits;

pub use kamada_kawai::KamadaKawai;
pub use spring::SpringLayout;
pub use traits::LayoutAlgorithm;

use std::collections::HashMap;

use crate::error::Result;
use crate::graph::{Network, NodeKey};

/// Caller-selected layout strategy with its configuration.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Force-directed spring layout.
    Spring(SpringLayout),
    /// Kamada-Kawai stress majorization.
    KamadaKawai(KamadaKawai),
}

/// Uniform dispatcher: run the selected strategy on `network`.
///
/// Equivalent to calling [`LayoutAlgorithm::layout`] on the wrapped instance
/// directly.
pub fn layout<K: NodeKey>(network: &Network<K>, strategy: &Strategy) -> Result<Positioning<K>> {
    match strategy {
        Strategy::Spring(algorithm) => algorithm.layout(network),
        Strategy::KamadaKawai(algorithm) => algorithm.layout(network),
    }
}

/// A total assignment of nodes to 2-D coordinates.
///
/// Produced only for nodes present in the source network; both coordinates
/// are always finite.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Positioning<K: NodeKey> {
    coords: HashMap<K, (f64, f64)>,
}

impl<K: NodeKey> Positioning<K> {
    /// An empty positioning (the layout result for an empty graph).
    pub fn empty() -> Self {
        Self {
            coords: HashMap::new(),
        }
    }

    /// Wrap an explicit node -> coordinate map.
    pub fn from_coords(coords: HashMap<K, (f64, f64)>) -> Self {
        Self { coords }
    }

    pub(crate) fn from_dense(keys: &[K], points: &[(f64, f64)]) -> Self {
        debug_assert_eq!(keys.len(), points.len());
        Self {
            coords: keys.iter().cloned().zip(points.iter().copied()).collect(),
        }
    }

    /// Coordinates of `key`, if the node is covered.
    pub fn position_of(&self, key: &K) -> Option<(f64, f64)> {
        self.coords.get(key).copied()
    }

    /// Number of nodes covered.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True when no node is covered.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate `(node, (x, y))` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, (f64, f64))> {
        self.coords.iter().map(|(k, &p)| (k, p))
    }
}

/// Recenter and rescale points into the unit box `[0, 1]²`, preserving
/// aspect ratio. Degenerate extents collapse to the box center.
pub(crate) fn fit_unit_box(points: &mut [(f64, f64)]) {
    if points.is_empty() {
        return;
    }
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points.iter() {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let span = (max_x - min_x).max(max_y - min_y);
    if span <= f64::EPSILON {
        for point in points.iter_mut() {
            *point = (0.5, 0.5);
        }
        return;
    }
    let pad_x = (1.0 - (max_x - min_x) / span) / 2.0;
    let pad_y = (1.0 - (max_y - min_y) / span) / 2.0;
    for point in points.iter_mut() {
        point.0 = (point.0 - min_x) / span + pad_x;
        point.1 = (point.1 - min_y) / span + pad_y;
    }
}
