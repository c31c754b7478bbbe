//! Pure list mutations. The mutator trusts its caller to have run the
//! drop through [`DropValidator`](crate::selection::validator::DropValidator)
//! first; it never fails, it only transforms.

use crate::selection::item::{Origin, SelectionItem};
use crate::selection::list::SelectionList;

/// Applies an accepted drop and returns the resulting list.
///
/// A candidate with `Origin::Selection` is a move within the list: its
/// contiguous subtree run is extracted first and re-homed with it. The
/// destination is resolved against the items' stored positions, so a
/// forward move lands where the caller saw the gap, not where the gap
/// sits after extraction. Every position is reassigned at the end.
pub fn apply_drop(
    list: &SelectionList,
    candidate: &SelectionItem,
    dest_index: usize,
) -> SelectionList {
    let mut items = list.items().to_vec();

    // Extract the moved subtree: self plus the run of strictly
    // greater-rank items that follows it.
    let mut children = Vec::new();
    if candidate.origin == Origin::Selection && candidate.position < items.len() {
        let start = candidate.position;
        let count = items[start + 1..]
            .iter()
            .take_while(|item| item.rank() > candidate.rank())
            .count();
        children = items.drain(start..=start + count).skip(1).collect();
    }

    let mut run = Vec::with_capacity(1 + children.len());
    let mut head = candidate.clone();
    head.origin = Origin::Selection;
    run.push(head);
    for mut child in children {
        child.origin = Origin::Selection;
        run.push(child);
    }

    // Positions are stale after extraction on purpose: the stored
    // position is what the destination gap was expressed against.
    let insert_at = items
        .iter()
        .position(|item| item.position >= dest_index)
        .unwrap_or(items.len());
    items.splice(insert_at..insert_at, run);

    SelectionList::from_items(items)
}

/// Removes the item at `position` together with its subtree run, e.g.
/// when it is dragged back onto the catalog pane.
pub fn remove_subtree(list: &SelectionList, position: usize) -> SelectionList {
    let mut items = list.items().to_vec();
    if position >= items.len() {
        return SelectionList::from_items(items);
    }
    let count = list.subtree_len(position);
    items.drain(position..=position + count);
    SelectionList::from_items(items)
}
