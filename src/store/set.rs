//! Registry of the collections the engine can address

use std::collections::HashMap;
use std::sync::Arc;

use super::collection::ResourceCollection;
use super::memory::InMemoryCollection;
use super::seed;
use crate::core::TargetCollection;

/// Maps each known `TargetCollection` to its backing collection
#[derive(Clone, Default)]
pub struct CollectionSet {
    collections: HashMap<TargetCollection, Arc<dyn ResourceCollection>>,
}

impl CollectionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }

    /// Users and projects, populated with demo rows
    pub fn with_seed_data() -> Self {
        let mut set = Self::new();
        set.register(TargetCollection::Users, seed::seeded_users());
        set.register(TargetCollection::Projects, seed::seeded_projects());
        set
    }

    /// Users and projects with no rows
    pub fn empty() -> Self {
        let mut set = Self::new();
        set.register(
            TargetCollection::Users,
            InMemoryCollection::new("users", seed::users_schema()),
        );
        set.register(
            TargetCollection::Projects,
            InMemoryCollection::new("projects", seed::projects_schema()),
        );
        set
    }

    /// Register a collection for a target, replacing any previous one
    pub fn register<C: ResourceCollection + 'static>(&mut self, target: TargetCollection, collection: C) {
        self.register_arc(target, Arc::new(collection));
    }

    pub fn register_arc(&mut self, target: TargetCollection, collection: Arc<dyn ResourceCollection>) {
        if !target.is_known() {
            tracing::warn!("Ignoring collection '{}' registered for unknown target", collection.name());
            return;
        }
        tracing::info!("Registering collection: {} -> {}", target, collection.name());
        self.collections.insert(target, collection);
    }

    /// Get the collection for a target
    pub fn get(&self, target: TargetCollection) -> Option<Arc<dyn ResourceCollection>> {
        self.collections.get(&target).cloned()
    }

    /// Number of entities in a target collection (0 when absent)
    pub fn count(&self, target: TargetCollection) -> usize {
        self.collections.get(&target).map(|c| c.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl std::fmt::Debug for CollectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.collections.iter().map(|(k, v)| (k, v.name().to_string())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_set() {
        let set = CollectionSet::with_seed_data();
        assert_eq!(set.len(), 2);
        assert_eq!(set.count(TargetCollection::Users), 3);
        assert_eq!(set.count(TargetCollection::Projects), 3);
        assert!(set.get(TargetCollection::Unknown).is_none());
    }

    #[test]
    fn test_empty_set_keeps_schemas() {
        let set = CollectionSet::empty();
        assert_eq!(set.count(TargetCollection::Users), 0);
        assert_eq!(set.get(TargetCollection::Projects).unwrap().name(), "projects");
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let mut set = CollectionSet::new();
        set.register(
            TargetCollection::Unknown,
            InMemoryCollection::new("misc", Vec::new()),
        );
        assert!(set.is_empty());
    }
}
