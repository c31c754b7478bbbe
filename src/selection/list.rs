use crate::selection::item::SelectionItem;

/// An ordered, hierarchy-constrained sequence of selection items.
///
/// Parent/child relationships are never stored as pointers; they are
/// derived from rank transitions. An item's descendants are the
/// contiguous run of strictly-greater-rank items immediately after it.
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    items: Vec<SelectionItem>,
}

impl SelectionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from items in order, assigning positions.
    pub fn from_items(items: Vec<SelectionItem>) -> Self {
        let mut list = Self { items };
        list.reindex();
        list
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SelectionItem> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut SelectionItem> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionItem> {
        self.items.iter()
    }

    /// Returns true if any item in the list carries the given name.
    pub fn contains_name(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Number of descendants of the item at `index`: the length of the
    /// contiguous run of strictly-greater-rank items that follows it.
    pub fn subtree_len(&self, index: usize) -> usize {
        let rank = match self.items.get(index) {
            Some(item) => item.rank(),
            None => return 0,
        };
        self.items[index + 1..]
            .iter()
            .take_while(|item| item.rank() > rank)
            .count()
    }

    /// Index of the logical parent of the item at `index`: the nearest
    /// preceding item of strictly lower rank.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let rank = self.items.get(index)?.rank();
        self.items[..index]
            .iter()
            .rposition(|item| item.rank() < rank)
    }

    /// Ancestor-name path of the item at `index`, from its bucket down
    /// to the item itself. Used for catalog lookups.
    pub fn ancestor_path(&self, index: usize) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            path.push(self.items[i].name.clone());
            cursor = self.parent_index(i);
        }
        path.reverse();
        path
    }

    /// Reassigns every item's position to its current offset.
    fn reindex(&mut self) {
        for (offset, item) in self.items.iter_mut().enumerate() {
            item.position = offset;
        }
    }
}
