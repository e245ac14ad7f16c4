//! Story editor — component list + canonical story + gateway.
//!
//! DESIGN
//! ======
//! `StoryEditor` owns all mutable editing state; nothing lives in globals.
//! Every structural edit is one transaction:
//!
//! 1. apply the edit to the component list (preconditions checked here)
//! 2. replay it on the story's `dynamic_elements` and renumber
//! 3. sync once: encode the story as a form, save, adopt the response
//!
//! Pointer-leave on the editing form runs step 3 alone.
//!
//! ERROR HANDLING
//! ==============
//! - Unknown component type on add: logged, no change, no sync.
//! - Index out of range / read-only page: returned to the caller before
//!   anything is touched.
//! - Save failures: logged and reported as [`SyncOutcome::Failed`]; the
//!   local edit stands and the next sync carries it.
//! - Elements the server returns without a type take the local kind.
//! - A response whose elements do not line up with the local list is not
//!   adopted ([`SyncOutcome::Diverged`]); local structure wins.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::component::{ComponentRegistry, RegistryEntry};
use crate::error::EditorError;
use crate::form::FormState;
use crate::gateway::PersistenceGateway;
use crate::list::{ListChange, OrderedComponentList};
use crate::story::StoryState;
use crate::url::EditMode;

/// Result of a sync attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No request was sent.
    Skipped,
    /// The server response was adopted as the canonical story.
    Synced,
    /// The server answered with a different element layout; local state kept.
    Diverged { local: usize, remote: usize },
    /// The save failed; local state kept.
    Failed { code: &'static str, message: String },
}

pub struct StoryEditor<G> {
    registry: ComponentRegistry,
    mode: EditMode,
    list: OrderedComponentList,
    story: StoryState,
    gateway: G,
    syncs: u64,
}

impl<G: PersistenceGateway> StoryEditor<G> {
    /// Load an editor from the story the page was rendered with.
    #[must_use]
    pub fn new(mut story: StoryState, mode: EditMode, gateway: G) -> Self {
        let registry = ComponentRegistry::builtin();
        story.retain_registered(&registry);
        let list = story.component_list(&registry);
        debug!(len = list.len(), ?mode, "story editor loaded");
        Self { registry, mode, list, story, gateway, syncs: 0 }
    }

    #[must_use]
    pub fn list(&self) -> &OrderedComponentList {
        &self.list
    }

    #[must_use]
    pub fn story(&self) -> &StoryState {
        &self.story
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Number of save requests issued so far.
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.syncs
    }

    /// Palette of addable components; empty outside modify mode.
    #[must_use]
    pub fn palette(&self) -> &'static [RegistryEntry] {
        if self.mode.is_writable() { self.registry.entries() } else { &[] }
    }

    /// Append a component of type `type_name` and sync.
    ///
    /// An unregistered type is a logged no-op returning [`SyncOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] outside modify mode.
    pub async fn add(&mut self, type_name: &str) -> Result<SyncOutcome, EditorError> {
        self.ensure_writable()?;
        match self.list.add(&self.registry, type_name) {
            Ok(change) => Ok(self.commit(change).await),
            Err(EditorError::UnknownComponent(name)) => {
                warn!(type_name = %name, "ignoring add of unknown component type");
                Ok(SyncOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the component at `index` and sync.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] outside modify mode and
    /// [`EditorError::IndexOutOfRange`] for an invalid index.
    pub async fn remove(&mut self, index: usize) -> Result<SyncOutcome, EditorError> {
        self.ensure_writable()?;
        let change = self.list.remove(index)?;
        Ok(self.commit(change).await)
    }

    /// Move the component at `index` up one slot and sync. Index 0 stays put
    /// but still syncs.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] outside modify mode and
    /// [`EditorError::IndexOutOfRange`] for an invalid index.
    pub async fn move_up(&mut self, index: usize) -> Result<SyncOutcome, EditorError> {
        self.ensure_writable()?;
        let change = self.list.move_up(index)?;
        Ok(self.commit(change).await)
    }

    /// Move the component at `index` down one slot and sync. The last index
    /// stays put but still syncs.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ReadOnly`] outside modify mode and
    /// [`EditorError::IndexOutOfRange`] for an invalid index.
    pub async fn move_down(&mut self, index: usize) -> Result<SyncOutcome, EditorError> {
        self.ensure_writable()?;
        let change = self.list.move_down(index)?;
        Ok(self.commit(change).await)
    }

    /// Pointer left the editing form: save field edits. No-op when read-only.
    pub async fn pointer_leave(&mut self) -> SyncOutcome {
        if !self.mode.is_writable() {
            return SyncOutcome::Skipped;
        }
        self.sync().await
    }

    /// Save the current story and adopt the server's copy.
    pub async fn sync(&mut self) -> SyncOutcome {
        let form = FormState::from_story(&self.story);
        self.syncs += 1;

        let mut remote = match self.gateway.save(&form).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "story sync failed; keeping local state");
                return SyncOutcome::Failed { code: e.error_code(), message: e.to_string() };
            }
        };

        remote.renumber();
        remote.fill_missing_kinds(&self.list);
        if !remote.matches_list(&self.list) {
            let (local, remote) = (self.list.len(), remote.dynamic_elements.len());
            warn!(local, remote, "story sync returned a different layout; keeping local state");
            return SyncOutcome::Diverged { local, remote };
        }

        self.story = remote;
        info!(len = self.list.len(), sync = self.syncs, "story synced");
        SyncOutcome::Synced
    }

    async fn commit(&mut self, change: ListChange) -> SyncOutcome {
        self.story.apply(change);
        self.sync().await
    }

    fn ensure_writable(&self) -> Result<(), EditorError> {
        if self.mode.is_writable() { Ok(()) } else { Err(EditorError::ReadOnly) }
    }
}

// =============================================================================
// SHARED EDITOR
// =============================================================================

/// Editor handle shared with UI event callbacks.
pub type SharedEditor<G> = Arc<Mutex<StoryEditor<G>>>;

/// Fire-and-forget pointer-leave save. Callers need not await the handle;
/// saves apply in the order they acquire the editor.
pub fn spawn_pointer_leave<G>(editor: SharedEditor<G>) -> JoinHandle<SyncOutcome>
where
    G: PersistenceGateway + 'static,
{
    tokio::spawn(async move { editor.lock().await.pointer_leave().await })
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
