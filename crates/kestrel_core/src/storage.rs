//! Component storage keyed by entity id
//!
//! Two strategies are provided:
//! - [`DenseStorage`] indexes a vector by the entity index. Good for
//!   components most entities have, like transforms.
//! - [`SparseStorage`] keeps a hash map. Good for rare components.
//!
//! Both remember the full id they were inserted with, so looking up a slot
//! whose entity has since been disposed and recycled returns `None`.

use crate::entity::EntityId;
use rustc_hash::FxHashMap;

/// Type-erased view over a component store
///
/// Lets entity disposal cascade through every manager without knowing the
/// component types.
pub trait ComponentStorage {
    /// Remove the component for an entity
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Check if entity has this component
    fn contains(&self, entity: EntityId) -> bool;

    /// Get component count
    fn len(&self) -> usize;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dense storage indexed by entity index
///
/// O(1) access. Memory grows with the highest entity index stored.
#[derive(Debug, Clone)]
pub struct DenseStorage<T> {
    slots: Vec<Option<(EntityId, T)>>,
    count: usize,
}

impl<T> Default for DenseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DenseStorage<T> {
    /// Create new dense storage
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            count: 0,
        }
    }

    /// Insert a component, returning the previous one for the same entity
    ///
    /// A component left behind by an older generation in the same slot is
    /// dropped silently.
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        let index = entity.index() as usize;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace((entity, component));
        match previous {
            Some((owner, old)) if owner == entity => Some(old),
            Some(_) => None,
            None => {
                self.count += 1;
                None
            }
        }
    }

    /// Get a component reference
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        match self.slots.get(entity.index() as usize) {
            Some(Some((owner, component))) if *owner == entity => Some(component),
            _ => None,
        }
    }

    /// Get a mutable component reference
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        match self.slots.get_mut(entity.index() as usize) {
            Some(Some((owner, component))) if *owner == entity => Some(component),
            _ => None,
        }
    }

    /// Remove and return a component
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if !slot.as_ref().is_some_and(|(owner, _)| *owner == entity) {
            return None;
        }
        self.count -= 1;
        slot.take().map(|(_, component)| component)
    }

    /// Iterate over all components in index order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|(e, c)| (*e, c)))
    }

    /// Iterate over all components mutably in index order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().map(|(e, c)| (*e, c)))
    }

    /// Drop every component
    pub fn clear(&mut self) {
        self.slots.clear();
        self.count = 0;
    }
}

impl<T> ComponentStorage for DenseStorage<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.get(entity).is_some()
    }

    fn len(&self) -> usize {
        self.count
    }
}

/// Sparse storage using HashMap
///
/// Uses less memory when the component is uncommon.
#[derive(Debug, Clone)]
pub struct SparseStorage<T> {
    components: FxHashMap<EntityId, T>,
}

impl<T> Default for SparseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseStorage<T> {
    /// Create new sparse storage
    pub fn new() -> Self {
        Self {
            components: FxHashMap::default(),
        }
    }

    /// Insert a component, returning the previous one
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Get a component reference
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.components.get(&entity)
    }

    /// Get a mutable component reference
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.components.get_mut(&entity)
    }

    /// Remove and return a component
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.components.remove(&entity)
    }

    /// Iterate over all components. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.components.iter().map(|(&e, c)| (e, c))
    }

    /// Iterate over all components mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.components.iter_mut().map(|(&e, c)| (e, c))
    }

    /// Entity ids with this component
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.components.keys().copied()
    }

    /// Drop every component
    pub fn clear(&mut self) {
        self.components.clear();
    }
}

impl<T> ComponentStorage for SparseStorage<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.components.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.components.len()
    }
}
