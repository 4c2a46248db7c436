//! Scene roots
//!
//! A scene groups the entities below it for drawing with one kind of
//! projection. Scenes draw in ascending `order`; newer scenes draw later.

use kestrel_core::{EntityId, SparseStorage};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneKind {
    /// 3D world
    #[default]
    Perspective,
    /// 2D overlay measured in pixels
    Orthographic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scene {
    pub kind: SceneKind,
    pub visible: bool,
    pub order: u32,
}

#[derive(Default)]
pub struct Scenes {
    storage: SparseStorage<Scene>,
    next_order: u32,
}

impl Scenes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an entity a visible scene root drawn after existing scenes
    pub fn create(&mut self, entity: EntityId, kind: SceneKind) {
        let order = self.take_order();
        self.storage.insert(
            entity,
            Scene {
                kind,
                visible: true,
                order,
            },
        );
    }

    pub fn get(&self, entity: EntityId) -> Option<&Scene> {
        self.storage.get(entity)
    }

    pub fn set_visible(&mut self, entity: EntityId, visible: bool) -> bool {
        self.storage
            .get_mut(entity)
            .map(|s| s.visible = visible)
            .is_some()
    }

    /// Draw the scene after every other scene
    pub fn set_last(&mut self, entity: EntityId) -> bool {
        if self.storage.get(entity).is_none() {
            return false;
        }
        let order = self.take_order();
        self.storage
            .get_mut(entity)
            .map(|s| s.order = order)
            .is_some()
    }

    /// Visible scenes in draw order
    pub fn ordered(&self) -> Vec<(EntityId, Scene)> {
        let mut scenes: Vec<_> = self
            .storage
            .iter()
            .filter(|(_, s)| s.visible)
            .map(|(e, s)| (e, *s))
            .collect();
        scenes.sort_by_key(|(_, s)| s.order);
        scenes
    }

    pub fn dispose(&mut self, entity: EntityId) {
        self.storage.remove(entity);
    }

    fn take_order(&mut self) -> u32 {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        order
    }
}
