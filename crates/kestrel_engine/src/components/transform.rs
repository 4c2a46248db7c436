//! Entity placement
//!
//! Almost every entity has a transform so they are kept in dense storage.
//! Transforms form a hierarchy through an optional parent. A parent that has
//! been disposed is treated as the world origin.

use glam::{DAffine3, DQuat, DVec3};
use kestrel_core::{ComponentStorage, DenseStorage, EntityId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Deepest parent chain followed when composing world transforms
const MAX_DEPTH: usize = 256;

/// Location, orientation and size relative to the parent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub location: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
    pub parent: Option<EntityId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
            parent: None,
        }
    }
}

impl Transform {
    /// Local transform as an affine matrix
    pub fn local(&self) -> DAffine3 {
        DAffine3::from_scale_rotation_translation(self.scale, self.rotation, self.location)
    }
}

#[derive(Default)]
pub struct Transforms {
    storage: DenseStorage<Transform>,
    /// Children by parent, kept in step with `Transform::parent`
    children: FxHashMap<EntityId, SmallVec<[EntityId; 4]>>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a transform, replacing any existing one
    pub fn create(&mut self, entity: EntityId, parent: Option<EntityId>) {
        let previous = self.storage.get(entity).and_then(|t| t.parent);
        self.unlink(entity, previous);
        self.storage.insert(
            entity,
            Transform {
                parent,
                ..Transform::default()
            },
        );
        self.link(entity, parent);
    }

    /// Move an entity under a new parent, or make it a root
    ///
    /// Returns false if the entity has no transform.
    pub fn set_parent(&mut self, entity: EntityId, parent: Option<EntityId>) -> bool {
        if parent == Some(entity) {
            tracing::warn!(entity = %entity, "entity cannot be its own parent");
            return false;
        }
        let Some(transform) = self.storage.get_mut(entity) else {
            return false;
        };
        let previous = std::mem::replace(&mut transform.parent, parent);
        self.unlink(entity, previous);
        self.link(entity, parent);
        true
    }

    /// Returns false if the entity has no transform
    pub fn set_location(&mut self, entity: EntityId, location: DVec3) -> bool {
        self.storage
            .get_mut(entity)
            .map(|t| t.location = location)
            .is_some()
    }

    /// Returns false if the entity has no transform
    pub fn set_rotation(&mut self, entity: EntityId, rotation: DQuat) -> bool {
        self.storage
            .get_mut(entity)
            .map(|t| t.rotation = rotation)
            .is_some()
    }

    /// Returns false if the entity has no transform
    pub fn set_scale(&mut self, entity: EntityId, scale: DVec3) -> bool {
        self.storage
            .get_mut(entity)
            .map(|t| t.scale = scale)
            .is_some()
    }

    pub fn get(&self, entity: EntityId) -> Option<&Transform> {
        self.storage.get(entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.storage.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Transform from entity space to world space
    pub fn world(&self, entity: EntityId) -> Option<DAffine3> {
        let mut current = self.storage.get(entity)?;
        let mut world = current.local();
        for _ in 0..MAX_DEPTH {
            let Some(parent) = current.parent.and_then(|p| self.storage.get(p)) else {
                return Some(world);
            };
            world = parent.local() * world;
            current = parent;
        }
        tracing::warn!(entity = %entity, "transform hierarchy too deep or cyclic");
        Some(world)
    }

    /// World space location
    pub fn world_location(&self, entity: EntityId) -> Option<DVec3> {
        self.world(entity).map(|w| w.translation)
    }

    /// World space location and orientation, ignoring scale
    pub fn world_pose(&self, entity: EntityId) -> Option<(DVec3, DQuat)> {
        let (_, rotation, translation) = self.world(entity)?.to_scale_rotation_translation();
        Some((translation, rotation))
    }

    /// Entities whose parent is `entity`
    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        let Some(children) = self.children.get(&entity) else {
            return Vec::new();
        };
        children
            .iter()
            .copied()
            .filter(|&child| self.storage.get(child).is_some_and(|t| t.parent == Some(entity)))
            .collect()
    }

    /// Remove the transform, making its children roots
    pub fn dispose(&mut self, entity: EntityId) {
        let Some(removed) = self.storage.remove(entity) else {
            return;
        };
        self.unlink(entity, removed.parent);
        for child in self.children.remove(&entity).unwrap_or_default() {
            if let Some(transform) = self.storage.get_mut(child) {
                if transform.parent == Some(entity) {
                    transform.parent = None;
                }
            }
        }
    }

    fn link(&mut self, child: EntityId, parent: Option<EntityId>) {
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(child);
        }
    }

    fn unlink(&mut self, child: EntityId, parent: Option<EntityId>) {
        let Some(parent) = parent else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|c| *c != child);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }
}
