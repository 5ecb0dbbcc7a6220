//! The property-set registry.

use css_apply_syntax::NodeId;
use indexmap::IndexMap;

use crate::logging::targets;

/// Named property sets in the order they were first defined.
///
/// Each entry is a detached rule in the document being processed. Writing a
/// name that already exists replaces the entry but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct SetRegistry {
    sets: IndexMap<String, NodeId>,
}

impl SetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `set` under `name`, returning the entry it replaces.
    pub fn insert(&mut self, name: impl Into<String>, set: NodeId) -> Option<NodeId> {
        let name = name.into();
        let previous = self.sets.insert(name.clone(), set);
        if previous.is_some() {
            tracing::debug!(target: targets::REGISTRY, %name, "replaced property set");
        } else {
            tracing::debug!(target: targets::REGISTRY, %name, "registered property set");
        }
        previous
    }

    /// Look up a set by registry key (without `--`).
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.sets.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// Registry keys in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.sets.iter().map(|(name, &set)| (name.as_str(), set))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
