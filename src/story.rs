//! Server-side story representation.
//!
//! DESIGN
//! ======
//! `StoryState` mirrors the JSON the story server keeps per data story. Only
//! the fields the editor touches are typed; everything else rides along in
//! `extra` so a sync never drops data it does not understand.
//!
//! `dynamic_elements` is the server's view of the component list. The editor
//! replays every [`ListChange`] on it, then renumbers positions to match the
//! array index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::component::{ComponentKind, ComponentRegistry};
use crate::list::{ListChange, OrderedComponentList};

// =============================================================================
// DYNAMIC ELEMENT
// =============================================================================

/// One component as stored by the server: type, position, and whatever
/// per-type fields the component's inputs produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicElement {
    /// Empty when the server could not infer a type from the posted fields.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub position: usize,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl DynamicElement {
    /// A freshly added component with no field values yet.
    #[must_use]
    pub fn empty(kind: ComponentKind, position: usize) -> Self {
        Self { kind: kind.name().to_owned(), position, payload: Map::new() }
    }
}

// =============================================================================
// COLOR CODE
// =============================================================================

/// Story color scheme. New stories carry the template's single default
/// color; edited stories carry the palette posted by the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorCode {
    Single(String),
    Palette(Vec<String>),
}

impl ColorCode {
    #[must_use]
    pub fn colors(&self) -> Vec<&str> {
        match self {
            Self::Single(c) => vec![c.as_str()],
            Self::Palette(cs) => cs.iter().map(String::as_str).collect(),
        }
    }
}

// =============================================================================
// STORY STATE
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparql_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_code: Option<ColorCode>,
    #[serde(default)]
    pub dynamic_elements: Vec<DynamicElement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoryState {
    /// Drop elements whose type the registry cannot render, then renumber.
    ///
    /// Unrenderable elements never reach the form, so the server would drop
    /// them on the next sync anyway; removing them up front keeps list
    /// indexes and element indexes aligned.
    pub fn retain_registered(&mut self, registry: &ComponentRegistry) {
        self.dynamic_elements.retain(|el| {
            let known = registry.lookup(&el.kind).is_some();
            if !known {
                warn!(kind = %el.kind, position = el.position, "skipping unregistered story component");
            }
            known
        });
        self.renumber();
    }

    /// Component list in element order. Call after [`Self::retain_registered`].
    #[must_use]
    pub fn component_list(&self, registry: &ComponentRegistry) -> OrderedComponentList {
        OrderedComponentList::from_kinds(self.dynamic_elements.iter().filter_map(|el| registry.lookup(&el.kind)))
    }

    /// Replay a list edit on `dynamic_elements` and renumber.
    pub fn apply(&mut self, change: ListChange) {
        let elements = &mut self.dynamic_elements;
        match change {
            ListChange::Appended(kind) => {
                elements.push(DynamicElement::empty(kind, elements.len()));
            }
            ListChange::Removed { index } => {
                if index < elements.len() {
                    elements.remove(index);
                }
            }
            ListChange::Moved { from, to } => {
                if from < elements.len() {
                    let cut = elements.remove(from);
                    let to = to.min(elements.len());
                    elements.insert(to, cut);
                }
            }
        }
        self.renumber();
    }

    /// Reassign `position` to match array order.
    pub fn renumber(&mut self) {
        for (position, el) in self.dynamic_elements.iter_mut().enumerate() {
            el.position = position;
        }
    }

    /// Give untyped elements the kind of the list component at the same index.
    ///
    /// The server infers `type` from field names and has no rule for some
    /// kinds (tables, for one), so it can answer with typeless elements. Only
    /// applied when the element count matches the list.
    pub fn fill_missing_kinds(&mut self, list: &OrderedComponentList) {
        if self.dynamic_elements.len() != list.len() {
            return;
        }
        for (el, d) in self.dynamic_elements.iter_mut().zip(list.as_slice()) {
            if el.kind.is_empty() {
                el.kind = d.kind.name().to_owned();
            }
        }
    }

    /// Whether element types line up one-to-one with `list`.
    #[must_use]
    pub fn matches_list(&self, list: &OrderedComponentList) -> bool {
        self.dynamic_elements.len() == list.len()
            && self
                .dynamic_elements
                .iter()
                .zip(list.as_slice())
                .all(|(el, d)| el.kind == d.kind.name())
    }
}

#[cfg(test)]
#[path = "story_test.rs"]
mod tests;
