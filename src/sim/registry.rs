//! Ordered entity storage with monotonic ids
//!
//! Entities are appended in id order, so iteration order, insertion order
//! and id order all agree. Removal is batched: callers collect ids during a
//! pass and hand them back here afterwards.

use serde::{Deserialize, Serialize};

/// Session-unique entity identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Hands out increasing ids for one session
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Anything stored in a [`Registry`]
pub trait Entity {
    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.position(id).map(move |i| &mut self.items[i])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Append an entity. Ids must arrive in increasing order.
    pub fn insert(&mut self, item: T) {
        debug_assert!(
            self.items.last().is_none_or(|last| last.id() < item.id()),
            "registry ids must be monotonic"
        );
        self.items.push(item);
    }

    /// Remove every listed id, returning the removed entities in registry
    /// order. Unknown or repeated ids are ignored, so each entity comes back
    /// at most once.
    pub fn remove_ids(&mut self, ids: &[EntityId]) -> Vec<T> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if ids.contains(&item.id()) {
                removed.push(item);
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        // Sorted by id, so binary search is valid
        self.items.binary_search_by_key(&id, |item| item.id()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy(EntityId);

    impl Entity for Dummy {
        fn id(&self) -> EntityId {
            self.0
        }
    }

    fn filled(n: usize) -> (Registry<Dummy>, Vec<EntityId>) {
        let mut ids = IdAllocator::default();
        let mut registry = Registry::new();
        let mut handed_out = Vec::new();
        for _ in 0..n {
            let id = ids.next_id();
            handed_out.push(id);
            registry.insert(Dummy(id));
        }
        (registry, handed_out)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        assert_eq!(a.get(), 1);
    }

    #[test]
    fn test_remove_ids_returns_each_once() {
        let (mut registry, ids) = filled(5);
        let removed = registry.remove_ids(&[ids[3], ids[1], ids[1]]);
        assert_eq!(removed, vec![Dummy(ids[1]), Dummy(ids[3])]);
        assert_eq!(registry.len(), 3);
        assert!(!registry.contains(ids[1]));

        let again = registry.remove_ids(&[ids[1]]);
        assert!(again.is_empty());
    }

    #[test]
    fn test_lookup_after_removal() {
        let (mut registry, ids) = filled(4);
        registry.remove_ids(&[ids[0]]);
        assert!(registry.get(ids[2]).is_some());
        assert!(registry.get_mut(ids[0]).is_none());
    }
}
