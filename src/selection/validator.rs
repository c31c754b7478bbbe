use std::collections::HashSet;

use crate::catalog::{Catalog, ItemKind};
use crate::selection::item::{Origin, SelectionItem};
use crate::selection::list::SelectionList;

/// Pure legality check for drop operations.
///
/// Kept separate from the mutator so each is independently testable and
/// the mutator is only ever invoked on already-validated input.
pub struct DropValidator<'a> {
    catalog: &'a Catalog,
}

impl<'a> DropValidator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Decides whether `candidate` may be dropped into the gap
    /// immediately after `preceding` (`None` means the list head).
    ///
    /// Rules, in order:
    /// 1. a catalog-origin candidate whose name already exists in the
    ///    list is a duplicate: reject;
    /// 2. Bucket and Filter always start a new top-level group: accept;
    /// 3. strictly lower rank than the preceding item starts a new,
    ///    higher-level group: accept;
    /// 4. equal rank: accepted only as a catalog child of the preceding
    ///    item's logical parent;
    /// 5. one rank deeper: accepted only as a catalog child of the
    ///    preceding item itself;
    /// 6. any deeper rank gap: reject.
    pub fn can_accept(
        &self,
        list: &SelectionList,
        preceding: Option<usize>,
        candidate: &SelectionItem,
    ) -> bool {
        if candidate.origin == Origin::Catalog && list.contains_name(&candidate.name) {
            return false;
        }

        if matches!(candidate.kind, ItemKind::Bucket | ItemKind::Filter) {
            return true;
        }

        // A Measurement or Field needs something to attach under.
        let prev_index = match preceding {
            Some(index) => index,
            None => return false,
        };
        let prev = match list.get(prev_index) {
            Some(prev) => prev,
            None => return false,
        };

        let candidate_rank = candidate.rank();
        let prev_rank = prev.rank();

        if candidate_rank < prev_rank {
            return true;
        }

        if candidate_rank == prev_rank {
            return match list.parent_index(prev_index) {
                Some(parent_index) => {
                    let path = list.ancestor_path(parent_index);
                    self.catalog.is_child_of(&path, &candidate.name)
                }
                None => false,
            };
        }

        if candidate_rank == prev_rank + 1 {
            let path = list.ancestor_path(prev_index);
            return self.catalog.is_child_of(&path, &candidate.name);
        }

        false
    }

    /// Accept-set for the gap immediately after `item`.
    ///
    /// Seeded with the kind one rank below `item`, then widened with
    /// every kind between the next item's rank and `item`'s rank so
    /// that same-rank reordering and deeper insertion both stay legal
    /// at the same gap. A gap at the end of the list treats the next
    /// item as a virtual Bucket-rank sentinel.
    pub fn accepted_kinds_for_gap(
        item: &SelectionItem,
        next: Option<&SelectionItem>,
    ) -> HashSet<ItemKind> {
        let mut accept = HashSet::new();

        if let Some(child) = item.kind.child() {
            accept.insert(child);
        }

        let next_rank = next.map(|n| n.rank()).unwrap_or(ItemKind::Bucket.rank());
        for rank in next_rank..=item.rank() {
            if let Some(kind) = ItemKind::from_rank(rank) {
                accept.insert(kind);
            }
        }

        accept
    }
}
