use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, ItemKind};
use crate::metrics;
use crate::query::compiler;
use crate::selection::item::{FilterBounds, Origin, SelectionItem};
use crate::selection::list::SelectionList;
use crate::selection::mutator;
use crate::selection::validator::DropValidator;

/// Where a drag gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The gap at `dest_index` of the builder (0 is the list head; the
    /// gap after the item at position i is i + 1).
    Gap(usize),
    /// Back onto the catalog pane, which acts as the bin.
    CatalogPane,
}

/// Drag event dispatched synchronously to the board.
#[derive(Debug, Clone)]
pub struct DropRequested {
    pub candidate: SelectionItem,
    pub target: DropTarget,
}

/// The single owner of selection state.
///
/// Holds the main hierarchy list and the filter list, validates and
/// applies drops, and recompiles the Flux text after every accepted
/// change. All of this is synchronous; no two mutations interleave.
pub struct QueryBoard {
    catalog: Arc<Catalog>,
    main: SelectionList,
    filters: SelectionList,
    flux: String,
}

impl QueryBoard {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            main: SelectionList::new(),
            filters: SelectionList::new(),
            flux: String::new(),
        }
    }

    pub fn main(&self) -> &SelectionList {
        &self.main
    }

    pub fn filters(&self) -> &SelectionList {
        &self.filters
    }

    /// The compiled Flux program for the current selection.
    pub fn flux(&self) -> &str {
        &self.flux
    }

    /// Handles a drop request. Returns true if the drop was accepted
    /// and applied; a rejected drop leaves every list and the compiled
    /// text untouched.
    pub fn handle_drop(&mut self, request: DropRequested) -> bool {
        let accepted = match request.target {
            DropTarget::CatalogPane => self.remove(&request.candidate),
            DropTarget::Gap(dest_index) => self.insert(&request.candidate, dest_index),
        };
        metrics::record_drop(accepted);
        if accepted {
            self.recompile();
        }
        accepted
    }

    /// Updates the bounds of the filter item at `position` and
    /// recompiles. Returns false if there is no filter there.
    pub fn set_filter_bounds(&mut self, position: usize, bounds: FilterBounds) -> bool {
        match self.filters.get_mut(position) {
            Some(item) => {
                item.bounds = Some(bounds);
                self.recompile();
                true
            }
            None => false,
        }
    }

    /// Accept-set for the gap after position `index` of the main list,
    /// used to configure drop zones.
    pub fn gap_accepts(&self, index: usize) -> HashSet<ItemKind> {
        match self.main.get(index) {
            Some(item) => DropValidator::accepted_kinds_for_gap(item, self.main.get(index + 1)),
            None => HashSet::from([ItemKind::Bucket]),
        }
    }

    fn insert(&mut self, candidate: &SelectionItem, dest_index: usize) -> bool {
        let list = self.list_for(candidate.kind);

        let preceding = if dest_index == 0 || list.is_empty() {
            None
        } else {
            Some((dest_index - 1).min(list.len() - 1))
        };

        let validator = DropValidator::new(&self.catalog);
        if !validator.can_accept(list, preceding, candidate) {
            debug!("Rejected drop of {} at gap {}", candidate.name, dest_index);
            return false;
        }

        let next = mutator::apply_drop(list, candidate, dest_index);
        debug!(
            "Accepted drop of {} at gap {} ({} items)",
            candidate.name,
            dest_index,
            next.len()
        );
        *self.list_for_mut(candidate.kind) = next;
        true
    }

    fn remove(&mut self, candidate: &SelectionItem) -> bool {
        // Only items already in the selection can be binned.
        if candidate.origin != Origin::Selection {
            return false;
        }
        let list = self.list_for(candidate.kind);
        let next = mutator::remove_subtree(list, candidate.position);
        debug!("Removed {} from the selection", candidate.name);
        *self.list_for_mut(candidate.kind) = next;
        true
    }

    fn list_for(&self, kind: ItemKind) -> &SelectionList {
        if kind == ItemKind::Filter {
            &self.filters
        } else {
            &self.main
        }
    }

    fn list_for_mut(&mut self, kind: ItemKind) -> &mut SelectionList {
        if kind == ItemKind::Filter {
            &mut self.filters
        } else {
            &mut self.main
        }
    }

    fn recompile(&mut self) {
        self.flux = compiler::compile(&self.main, &self.filters);
        metrics::record_compile(self.flux.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogNode;
    use crate::selection::item::DATE_RANGE;

    fn sample_catalog() -> Arc<Catalog> {
        let mut catalog = Catalog::new();
        catalog.push_bucket(
            CatalogNode::new(ItemKind::Bucket, "b1").with_children(vec![
                CatalogNode::new(ItemKind::Measurement, "m1").with_children(vec![
                    CatalogNode::new(ItemKind::Field, "f1"),
                    CatalogNode::new(ItemKind::Field, "f2"),
                ]),
            ]),
        );
        Arc::new(catalog)
    }

    fn drop_at(board: &mut QueryBoard, kind: ItemKind, name: &str, dest: usize) -> bool {
        board.handle_drop(DropRequested {
            candidate: SelectionItem::from_catalog(kind, name),
            target: DropTarget::Gap(dest),
        })
    }

    #[test]
    fn test_build_and_compile() {
        let mut board = QueryBoard::new(sample_catalog());

        assert!(drop_at(&mut board, ItemKind::Bucket, "b1", 0));
        assert!(drop_at(&mut board, ItemKind::Measurement, "m1", 1));
        assert_eq!(
            board.flux(),
            "from(bucket: \"b1\")\n|> filter(fn: (r) => r._measurement == \"m1\")\n"
        );
    }

    #[test]
    fn test_rejected_drop_changes_nothing() {
        let mut board = QueryBoard::new(sample_catalog());
        drop_at(&mut board, ItemKind::Bucket, "b1", 0);
        let before = board.flux().to_string();

        // A Field straight after a Bucket skips a level.
        assert!(!drop_at(&mut board, ItemKind::Field, "f1", 1));
        assert_eq!(board.main().len(), 1);
        assert_eq!(board.flux(), before);
    }

    #[test]
    fn test_filters_are_routed_to_their_own_list() {
        let mut board = QueryBoard::new(sample_catalog());
        drop_at(&mut board, ItemKind::Bucket, "b1", 0);

        let accepted = board.handle_drop(DropRequested {
            candidate: SelectionItem::filter(DATE_RANGE),
            target: DropTarget::Gap(0),
        });
        assert!(accepted);
        assert_eq!(board.main().len(), 1);
        assert_eq!(board.filters().len(), 1);
    }

    #[test]
    fn test_filter_bounds_feed_the_compiler() {
        let mut board = QueryBoard::new(sample_catalog());
        drop_at(&mut board, ItemKind::Bucket, "b1", 0);
        board.handle_drop(DropRequested {
            candidate: SelectionItem::filter(DATE_RANGE),
            target: DropTarget::Gap(0),
        });

        assert!(board.set_filter_bounds(0, FilterBounds::new("-1h", "")));
        assert_eq!(
            board.flux(),
            "from(bucket: \"b1\")\n|> range(start: -1h, stop: now())\n"
        );
        assert!(!board.set_filter_bounds(5, FilterBounds::default()));
    }

    #[test]
    fn test_bin_removes_subtree() {
        let mut board = QueryBoard::new(sample_catalog());
        drop_at(&mut board, ItemKind::Bucket, "b1", 0);
        drop_at(&mut board, ItemKind::Measurement, "m1", 1);
        drop_at(&mut board, ItemKind::Field, "f1", 2);

        let mut candidate = board.main().get(1).unwrap().clone();
        candidate.origin = Origin::Selection;
        assert!(board.handle_drop(DropRequested {
            candidate,
            target: DropTarget::CatalogPane,
        }));
        assert_eq!(board.main().len(), 1);
        assert_eq!(board.flux(), "from(bucket: \"b1\")\n");

        // Catalog-origin items cannot be binned; nothing changes.
        assert!(!board.handle_drop(DropRequested {
            candidate: SelectionItem::from_catalog(ItemKind::Bucket, "b1"),
            target: DropTarget::CatalogPane,
        }));
    }

    #[test]
    fn test_empty_board_gap_only_accepts_buckets() {
        let board = QueryBoard::new(sample_catalog());
        assert_eq!(board.gap_accepts(0), HashSet::from([ItemKind::Bucket]));
    }
}
