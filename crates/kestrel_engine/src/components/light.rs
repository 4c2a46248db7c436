//! Light sources

use kestrel_core::{ComponentStorage, EntityId, SparseStorage};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightKind {
    /// Parallel rays along the entity's orientation
    #[default]
    Directional,
    /// Radiates from the entity's location
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Linear rgb, each channel from 0 to 1
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

#[derive(Default)]
pub struct Lights {
    storage: SparseStorage<Light>,
}

impl Lights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a white light of the given kind
    pub fn create(&mut self, entity: EntityId, kind: LightKind) {
        self.storage.insert(
            entity,
            Light {
                kind,
                ..Light::default()
            },
        );
    }

    pub fn get(&self, entity: EntityId) -> Option<&Light> {
        self.storage.get(entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Light> {
        self.storage.get_mut(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Light)> {
        self.storage.iter()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn dispose(&mut self, entity: EntityId) {
        self.storage.remove(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lights() {
        let sun = EntityId::new(1, 0);
        let lamp = EntityId::new(2, 0);
        let mut lights = Lights::new();
        lights.create(sun, LightKind::default());
        lights.create(lamp, LightKind::Point);
        lights.get_mut(lamp).unwrap().color = [1.0, 0.5, 0.0];

        assert_eq!(*lights.get(sun).unwrap(), Light::default());
        assert_eq!(lights.get(lamp).unwrap().kind, LightKind::Point);
        assert_eq!(lights.len(), 2);

        lights.dispose(lamp);
        assert!(lights.get(lamp).is_none());
        assert_eq!(lights.iter().count(), 1);
    }
}
