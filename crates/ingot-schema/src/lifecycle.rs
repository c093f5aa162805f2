//! Reconciliation flags shared by every schema entity.
//!
//! Each entity carries a [`LifecycleState`]: whether it exists on the live
//! database, whether its definition changed since it was loaded or applied,
//! and whether it is marked for removal. The alter/create/drop synthesis
//! reads these flags; it never clears them — resetting after the generated
//! DDL has been applied is the caller's responsibility.

use serde::{Deserialize, Serialize};

/// The three reconciliation flags.
///
/// A freshly constructed entity starts with all flags false; an entity
/// reconstructed from catalog metadata starts existing-on-db and unmodified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleState {
    existing_on_db: bool,
    modified: bool,
    deleted: bool,
}

impl LifecycleState {
    /// Fresh in-memory state: not on the database, unmodified, not deleted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for an entity reconstructed from catalog metadata.
    #[must_use]
    pub fn existing() -> Self {
        Self {
            existing_on_db: true,
            modified: false,
            deleted: false,
        }
    }

    /// Whether the entity was loaded from, or previously applied to, the
    /// live database.
    #[must_use]
    pub fn is_existing_on_db(self) -> bool {
        self.existing_on_db
    }

    pub fn set_existing_on_db(&mut self, existing_on_db: bool) {
        self.existing_on_db = existing_on_db;
    }

    /// Whether the definition changed since it was loaded or applied.
    #[must_use]
    pub fn is_modified(self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Whether the entity is marked for DROP synthesis. Deleted entities
    /// stay in their owning collection.
    #[must_use]
    pub fn is_deleted(self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// Access to the lifecycle flags of a schema entity.
///
/// Implementors expose their embedded [`LifecycleState`]; the flag accessors
/// are provided.
pub trait Lifecycle {
    /// The entity's lifecycle flags.
    fn state(&self) -> &LifecycleState;

    /// Mutable access to the entity's lifecycle flags.
    fn state_mut(&mut self) -> &mut LifecycleState;

    /// Whether the entity exists on the live database.
    fn is_existing_on_db(&self) -> bool {
        self.state().is_existing_on_db()
    }

    fn set_existing_on_db(&mut self, existing_on_db: bool) {
        self.state_mut().set_existing_on_db(existing_on_db);
    }

    /// Whether the entity's definition changed since load/apply.
    fn is_modified(&self) -> bool {
        self.state().is_modified()
    }

    fn set_modified(&mut self, modified: bool) {
        self.state_mut().set_modified(modified);
    }

    /// Whether the entity is marked for removal.
    fn is_deleted(&self) -> bool {
        self.state().is_deleted()
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.state_mut().set_deleted(deleted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_all_false() {
        let state = LifecycleState::new();
        assert!(!state.is_existing_on_db());
        assert!(!state.is_modified());
        assert!(!state.is_deleted());
    }

    #[test]
    fn existing_state_is_unmodified() {
        let state = LifecycleState::existing();
        assert!(state.is_existing_on_db());
        assert!(!state.is_modified());
        assert!(!state.is_deleted());
    }

    #[test]
    fn flags_toggle_independently() {
        let mut state = LifecycleState::new();
        state.set_modified(true);
        assert!(state.is_modified());
        assert!(!state.is_deleted());

        state.set_deleted(true);
        state.set_modified(false);
        assert!(state.is_deleted());
        assert!(!state.is_modified());
    }
}
