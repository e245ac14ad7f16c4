//! Story component editor.
//!
//! A data story page holds an ordered list of typed components (text, count,
//! chart, table). This crate owns that list, keeps the server's
//! `dynamic_elements` in lockstep with it, and saves the story through a
//! [`gateway::PersistenceGateway`] after every structural edit.

pub mod component;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod gateway;
pub mod list;
pub mod story;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use component::{ComponentKind, ComponentRegistry};
pub use config::SyncConfig;
pub use editor::{SharedEditor, StoryEditor, SyncOutcome, spawn_pointer_leave};
pub use error::EditorError;
pub use gateway::{HttpGateway, PersistenceGateway};
pub use list::{ComponentDescriptor, ListChange, OrderedComponentList};
pub use story::StoryState;
pub use url::EditMode;
