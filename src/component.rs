//! Component kinds and the palette registry.
//!
//! DESIGN
//! ======
//! The set of story components is fixed and small, so dispatch is a closed
//! enum rather than a name-keyed lookup of renderers. The registry is the
//! only place that maps wire names to kinds; adding a component means adding
//! a variant and a registry entry.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// KIND
// =============================================================================

/// A story component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Text,
    Count,
    Chart,
    Table,
}

impl ComponentKind {
    /// Wire name used in story JSON and form keys.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Count => "count",
            Self::Chart => "chart",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// One palette entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub kind: ComponentKind,
}

impl RegistryEntry {
    /// Label shown on the palette button.
    #[must_use]
    pub fn button_label(&self) -> String {
        format!("Add {}", self.name)
    }
}

const BUILTIN: &[RegistryEntry] = &[
    RegistryEntry { name: "text", kind: ComponentKind::Text },
    RegistryEntry { name: "count", kind: ComponentKind::Count },
    RegistryEntry { name: "chart", kind: ComponentKind::Chart },
    RegistryEntry { name: "table", kind: ComponentKind::Table },
];

/// Static mapping from type name to component kind.
#[derive(Clone, Copy, Debug)]
pub struct ComponentRegistry {
    entries: &'static [RegistryEntry],
}

impl ComponentRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        Self { entries: BUILTIN }
    }

    /// Resolve a type name. Matching is exact, as the server emits it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ComponentKind> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.kind)
    }

    /// Palette entries in display order.
    #[must_use]
    pub fn entries(&self) -> &'static [RegistryEntry] {
        self.entries
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "component_test.rs"]
mod tests;
