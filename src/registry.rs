//! Read-only lookup of action definitions.
//!
//! Sessions receive a registry explicitly instead of consulting a global
//! store, so parallel sessions built from different content never interfere.

use schema::ActionData;
use std::collections::HashMap;

/// Lookup seam for action definitions. Implemented by [`ActionRegistry`];
/// content layers with their own storage can implement it directly.
pub trait ActionLookup {
    fn action(&self, id: &str) -> Option<&ActionData>;
}

#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionData>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definitions. A later definition replaces an earlier one with the same id.
    pub fn from_actions(actions: impl IntoIterator<Item = ActionData>) -> Self {
        let mut registry = Self::new();
        for action in actions {
            registry.insert(action);
        }
        registry
    }

    pub fn insert(&mut self, action: ActionData) {
        self.actions.insert(action.id.clone(), action);
    }

    pub fn get(&self, id: &str) -> Option<&ActionData> {
        self.actions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ActionLookup for ActionRegistry {
    fn action(&self, id: &str) -> Option<&ActionData> {
        self.get(id)
    }
}
