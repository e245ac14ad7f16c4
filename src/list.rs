//! Ordered component list — the structural state of a story.
//!
//! DESIGN
//! ======
//! The vector index is the position. Descriptors still carry a `position`
//! field because it is what the server persists; every mutation renumbers
//! so `list[i].position == i` holds on return.
//!
//! Each successful mutation returns a [`ListChange`] so the story mirror
//! can replay the exact same edit on its `dynamic_elements`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{ComponentKind, ComponentRegistry};
use crate::error::EditorError;

/// The type+position record for one story component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub position: usize,
}

/// A structural edit applied to the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListChange {
    Appended(ComponentKind),
    Removed { index: usize },
    /// `from == to` for the boundary no-ops (`move_up(0)`, `move_down(last)`).
    Moved { from: usize, to: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedComponentList {
    items: Vec<ComponentDescriptor>,
}

impl OrderedComponentList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from kinds in display order.
    #[must_use]
    pub fn from_kinds(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        let items = kinds
            .into_iter()
            .enumerate()
            .map(|(position, kind)| ComponentDescriptor { kind, position })
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ComponentDescriptor] {
        &self.items
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ComponentKind> {
        self.items.iter().map(|d| d.kind).collect()
    }

    /// Append a component resolved through `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownComponent`] if `type_name` is not registered.
    pub fn add(&mut self, registry: &ComponentRegistry, type_name: &str) -> Result<ListChange, EditorError> {
        let kind = registry
            .lookup(type_name)
            .ok_or_else(|| EditorError::UnknownComponent(type_name.to_owned()))?;
        self.items.push(ComponentDescriptor { kind, position: self.items.len() });
        debug!(%kind, len = self.items.len(), "component appended");
        Ok(ListChange::Appended(kind))
    }

    /// Remove the component at `index` and close the gap.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::IndexOutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<ListChange, EditorError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.renumber();
        debug!(index, kind = %removed.kind, len = self.items.len(), "component removed");
        Ok(ListChange::Removed { index })
    }

    /// Move the component at `index` one slot towards the front.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::IndexOutOfRange`] if `index >= len`.
    pub fn move_up(&mut self, index: usize) -> Result<ListChange, EditorError> {
        self.check_index(index)?;
        Ok(self.relocate(index, index.saturating_sub(1)))
    }

    /// Move the component at `index` one slot towards the back.
    ///
    /// Moving the last component re-inserts it at the end.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::IndexOutOfRange`] if `index >= len`.
    pub fn move_down(&mut self, index: usize) -> Result<ListChange, EditorError> {
        self.check_index(index)?;
        Ok(self.relocate(index, index + 1))
    }

    /// Cut at `from`, insert at `to` (clamped to the end), renumber.
    fn relocate(&mut self, from: usize, to: usize) -> ListChange {
        let cut = self.items.remove(from);
        let to = to.min(self.items.len());
        self.items.insert(to, cut);
        self.renumber();
        debug!(from, to, kind = %cut.kind, "component moved");
        ListChange::Moved { from, to }
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfRange { index, len: self.items.len() })
        }
    }

    fn renumber(&mut self) {
        for (position, item) in self.items.iter_mut().enumerate() {
            item.position = position;
        }
    }
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
