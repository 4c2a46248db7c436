//! Physics bodies
//!
//! A body pairs a collider with the material values the integrator needs.
//! Broad phase and integration live outside the engine. This manager keeps
//! colliders in step with their transforms and answers narrow phase contact
//! queries for pairs the caller already knows to overlap.

use super::Transforms;
use glam::DVec3;
use kestrel_assets::MeshData;
use kestrel_core::{EntityId, SparseStorage};
use kestrel_physics::{Collider, Contact};

#[derive(Clone, Debug)]
pub struct Body {
    pub collider: Collider,
    /// Zero for immovable bodies
    pub mass: f64,
    /// Fraction of speed kept after a bounce, 0 to 1
    pub restitution: f64,
    pub friction: f64,
}

impl Body {
    pub fn new(collider: Collider, mass: f64) -> Self {
        Self {
            collider,
            mass: mass.max(0.0),
            restitution: 0.0,
            friction: 0.5,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }
}

#[derive(Default)]
pub struct Bodies {
    storage: SparseStorage<Body>,
}

impl Bodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, entity: EntityId, body: Body) {
        self.storage.insert(entity, body);
    }

    /// Set mass and bounce, returning false if the entity has no body
    pub fn set_material(&mut self, entity: EntityId, mass: f64, restitution: f64) -> bool {
        let Some(body) = self.storage.get_mut(entity) else {
            return false;
        };
        body.mass = mass.max(0.0);
        body.restitution = restitution.clamp(0.0, 1.0);
        true
    }

    pub fn get(&self, entity: EntityId) -> Option<&Body> {
        self.storage.get(entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut Body> {
        self.storage.get_mut(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Body)> {
        self.storage.iter()
    }

    /// Move every collider to its entity's world pose
    ///
    /// Bodies without a transform keep their last pose.
    pub fn refresh(&mut self, transforms: &Transforms) {
        for (entity, body) in self.storage.iter_mut() {
            if let Some((location, rotation)) = transforms.world_pose(entity) {
                body.collider.update(location, rotation);
            }
        }
    }

    /// Contact points between two overlapping bodies
    ///
    /// `normal` points from `a` towards `b`. Returns no contacts if either
    /// entity lacks a body.
    pub fn contacts(&self, a: EntityId, b: EntityId, normal: DVec3, penetration: f64) -> Vec<Contact> {
        let (Some(body_a), Some(body_b)) = (self.storage.get(a), self.storage.get(b)) else {
            tracing::warn!(a = %a, b = %b, missing = "body", "cannot build contacts");
            return Vec::new();
        };
        kestrel_physics::contacts(&body_a.collider, &body_b.collider, normal, penetration)
    }

    pub fn dispose(&mut self, entity: EntityId) {
        self.storage.remove(entity);
    }
}

/// Convex hull collider from imported mesh data
pub fn collider_from_mesh(mesh: &MeshData) -> kestrel_physics::Result<Collider> {
    let vertices: Vec<DVec3> = mesh
        .positions
        .iter()
        .map(|&[x, y, z]| DVec3::new(f64::from(x), f64::from(y), f64::from(z)))
        .collect();
    Collider::hull(&vertices, &mesh.indices)
}
