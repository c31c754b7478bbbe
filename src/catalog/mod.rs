//! Catalog module for FLUXBOARD
//! Holds the read-only tree of draggable entries and the hierarchy order.

pub mod source;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of a draggable item, ordered by hierarchy rank.
///
/// Bucket < Measurement < Field < Filter. Filter is an orthogonal
/// top-level kind that lives in its own list; its rank only matters
/// for gap accept-set computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Bucket,
    Measurement,
    Field,
    Filter,
}

impl ItemKind {
    /// Hierarchy rank: lower means closer to the root.
    pub fn rank(&self) -> usize {
        match self {
            ItemKind::Bucket => 0,
            ItemKind::Measurement => 1,
            ItemKind::Field => 2,
            ItemKind::Filter => 3,
        }
    }

    /// The kind one rank below this one, if any.
    pub fn child(&self) -> Option<ItemKind> {
        match self {
            ItemKind::Bucket => Some(ItemKind::Measurement),
            ItemKind::Measurement => Some(ItemKind::Field),
            ItemKind::Field => Some(ItemKind::Filter),
            ItemKind::Filter => None,
        }
    }

    /// The kind at the given rank.
    pub fn from_rank(rank: usize) -> Option<ItemKind> {
        match rank {
            0 => Some(ItemKind::Bucket),
            1 => Some(ItemKind::Measurement),
            2 => Some(ItemKind::Field),
            3 => Some(ItemKind::Filter),
            _ => None,
        }
    }
}

/// A node in the catalog tree. Immutable once loaded; Field nodes have
/// no children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogNode {
    pub kind: ItemKind,
    pub name: String,
    #[serde(default)]
    pub children: Vec<CatalogNode>,
}

impl CatalogNode {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CatalogNode>) -> Self {
        self.children = children;
        self
    }

    /// Returns true if a direct child carries the given name.
    pub fn has_child_named(&self, name: &str) -> bool {
        self.children.iter().any(|c| c.name == name)
    }
}

/// The read-only catalog of available buckets, measurements, and fields.
///
/// Buckets whose subtree fetches failed are kept in the tree (empty)
/// but recorded as incomplete; incomplete buckets are not draggable.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    buckets: Vec<CatalogNode>,
    incomplete: HashSet<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buckets(&self) -> &[CatalogNode] {
        &self.buckets
    }

    pub(crate) fn push_bucket(&mut self, bucket: CatalogNode) {
        self.buckets.push(bucket);
    }

    pub(crate) fn mark_incomplete(&mut self, bucket: &str) {
        self.incomplete.insert(bucket.to_string());
    }

    /// A bucket's entries become draggable only once its measurement
    /// and field fetches have all resolved.
    pub fn is_draggable(&self, bucket: &str) -> bool {
        !self.incomplete.contains(bucket)
            && self.buckets.iter().any(|b| b.name == bucket)
    }

    /// Resolves the node addressed by an ancestor-name path starting at
    /// a bucket, e.g. `["b1", "m1"]` addresses measurement m1 of b1.
    pub fn node_at(&self, path: &[String]) -> Option<&CatalogNode> {
        let mut name_iter = path.iter();
        let first = name_iter.next()?;
        let mut node = self.buckets.iter().find(|b| &b.name == first)?;
        for name in name_iter {
            node = node.children.iter().find(|c| &c.name == name)?;
        }
        Some(node)
    }

    /// Returns true if `name` is a direct catalog child of the node
    /// addressed by `path`.
    pub fn is_child_of(&self, path: &[String], name: &str) -> bool {
        self.node_at(path)
            .map(|node| node.has_child_named(name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.push_bucket(
            CatalogNode::new(ItemKind::Bucket, "b1").with_children(vec![
                CatalogNode::new(ItemKind::Measurement, "m1").with_children(vec![
                    CatalogNode::new(ItemKind::Field, "f1"),
                    CatalogNode::new(ItemKind::Field, "f2"),
                ]),
                CatalogNode::new(ItemKind::Measurement, "m2"),
            ]),
        );
        catalog
    }

    #[test]
    fn test_rank_order() {
        assert!(ItemKind::Bucket.rank() < ItemKind::Measurement.rank());
        assert!(ItemKind::Measurement.rank() < ItemKind::Field.rank());
        assert!(ItemKind::Field.rank() < ItemKind::Filter.rank());
    }

    #[test]
    fn test_child_kinds() {
        assert_eq!(ItemKind::Bucket.child(), Some(ItemKind::Measurement));
        assert_eq!(ItemKind::Filter.child(), None);
    }

    #[test]
    fn test_node_lookup_by_path() {
        let catalog = sample_catalog();
        let m1 = catalog
            .node_at(&["b1".to_string(), "m1".to_string()])
            .unwrap();
        assert_eq!(m1.kind, ItemKind::Measurement);
        assert_eq!(m1.children.len(), 2);
        assert!(catalog
            .node_at(&["b1".to_string(), "missing".to_string()])
            .is_none());
    }

    #[test]
    fn test_is_child_of() {
        let catalog = sample_catalog();
        assert!(catalog.is_child_of(&["b1".to_string()], "m1"));
        assert!(catalog.is_child_of(&["b1".to_string(), "m1".to_string()], "f2"));
        assert!(!catalog.is_child_of(&["b1".to_string(), "m2".to_string()], "f1"));
    }

    #[test]
    fn test_incomplete_bucket_not_draggable() {
        let mut catalog = sample_catalog();
        assert!(catalog.is_draggable("b1"));
        catalog.mark_incomplete("b1");
        assert!(!catalog.is_draggable("b1"));
        assert!(!catalog.is_draggable("unknown"));
    }
}
