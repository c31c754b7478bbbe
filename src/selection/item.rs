use serde::{Deserialize, Serialize};

use crate::catalog::ItemKind;

/// Recognized filter names carried by Filter-kind items.
pub const DATE_RANGE: &str = "Date Range";
pub const VALUE_RANGE: &str = "Value Range";

/// Where a dragged item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Fresh from the catalog pane; not yet part of the selection.
    Catalog,
    /// Already in the selection; the drop is a move within the list.
    Selection,
}

/// Bounds carried by a Filter-kind item. For `Date Range` these are
/// start/stop timestamps (or empty), for `Value Range` numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterBounds {
    pub min: String,
    pub max: String,
}

impl FilterBounds {
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }
}

/// One entry of a selection list.
///
/// `position` always equals the item's current 0-based offset in its
/// owning list; it is reassigned after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub kind: ItemKind,
    pub name: String,
    pub position: usize,
    pub origin: Origin,
    pub bounds: Option<FilterBounds>,
}

impl SelectionItem {
    /// A candidate dragged out of the catalog pane.
    pub fn from_catalog(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            position: 0,
            origin: Origin::Catalog,
            bounds: None,
        }
    }

    /// A predefined filter dragged out of the catalog pane.
    pub fn filter(name: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Filter,
            name: name.into(),
            position: 0,
            origin: Origin::Catalog,
            bounds: Some(FilterBounds::default()),
        }
    }

    pub fn rank(&self) -> usize {
        self.kind.rank()
    }
}
