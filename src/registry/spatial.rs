//! R-tree index over feature bounding boxes for extent queries.

use geojson::Feature;
use rstar::{RTree, RTreeObject, AABB};

use crate::geom::{feature_bbox, Extent};

/// An indexed feature: its position in the layer's feature list plus its
/// bounding box.
#[derive(Debug, Clone)]
pub struct FeatureEntry {
    pub feature_index: usize,
    bbox: Extent,
}

impl RTreeObject for FeatureEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bbox[0], self.bbox[1]], [self.bbox[2], self.bbox[3]])
    }
}

/// Bounding-box spatial index over one layer's features.
///
/// Built once at registration and replaced wholesale on updates, never
/// mutated in place.
pub struct FeatureIndex {
    tree: RTree<FeatureEntry>,
}

impl FeatureIndex {
    /// Bulk-load the index from a feature slice. Features without geometry
    /// (or with empty geometry) are not indexed.
    pub fn build(features: &[Feature]) -> Self {
        let entries = features
            .iter()
            .enumerate()
            .filter_map(|(feature_index, feature)| {
                feature_bbox(feature).map(|bbox| FeatureEntry {
                    feature_index,
                    bbox,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of features whose bounding box intersects `extent`, in
    /// ascending order.
    pub fn query(&self, extent: &Extent) -> Vec<usize> {
        let envelope = AABB::from_corners([extent[0], extent[1]], [extent[2], extent[3]]);
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.feature_index)
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
