//! Component managers
//!
//! Each manager owns the storage for one kind of entity data and is keyed by
//! [`EntityId`]. Managers never talk to the loader directly. Anything that
//! needs an asset is queued on [`LoadOrders`] and the engine hands the queue
//! to the loader on its next update. Completion callbacks receive the whole
//! [`Components`] set so a finished load can update any manager and queue
//! further work.

mod body;
mod light;
mod model;
mod scene;
mod sound;
mod transform;

pub use body::{collider_from_mesh, Bodies, Body};
pub use light::{Light, LightKind, Lights};
pub use model::{Label, Model, Models};
pub use scene::{Scene, SceneKind, Scenes};
pub use sound::{SoundCue, Sounds};
pub use transform::{Transform, Transforms};

use kestrel_assets::{
    Asset, AssetCallback, AssetKind, GlyphCallback, GlyphMesh, MeshHandle, ModelTemplate,
};
use kestrel_core::EntityId;

/// Work for the asset loader, queued by the managers
pub enum LoadOrder {
    /// Load an asset and report it to the callback
    Asset {
        kind: AssetKind,
        name: String,
        entity: EntityId,
        callback: AssetCallback<Components>,
    },
    /// Typeset text once its font is available
    Glyphs {
        entity: EntityId,
        font: String,
        text: String,
        wrap: u32,
        existing: Option<MeshHandle>,
        callback: GlyphCallback<Components>,
    },
    /// Cache a completed model so later instances can share it
    Template(ModelTemplate),
}

/// Queue of pending [`LoadOrder`]s
#[derive(Default)]
pub struct LoadOrders {
    orders: Vec<LoadOrder>,
}

impl LoadOrders {
    pub fn asset<F>(&mut self, kind: AssetKind, name: &str, entity: EntityId, callback: F)
    where
        F: FnOnce(&mut Components, EntityId, &Asset) + 'static,
    {
        self.orders.push(LoadOrder::Asset {
            kind,
            name: name.to_string(),
            entity,
            callback: Box::new(callback),
        });
    }

    pub fn glyphs<F>(
        &mut self,
        entity: EntityId,
        font: &str,
        text: &str,
        wrap: u32,
        existing: Option<MeshHandle>,
        callback: F,
    ) where
        F: FnOnce(&mut Components, EntityId, GlyphMesh) + 'static,
    {
        self.orders.push(LoadOrder::Glyphs {
            entity,
            font: font.to_string(),
            text: text.to_string(),
            wrap,
            existing,
            callback: Box::new(callback),
        });
    }

    pub fn template(&mut self, template: ModelTemplate) {
        self.orders.push(LoadOrder::Template(template));
    }

    /// Remove and return everything queued so far
    pub fn take(&mut self) -> Vec<LoadOrder> {
        std::mem::take(&mut self.orders)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Every component manager, plus the queue they share
///
/// This is the context passed to asset completion callbacks.
#[derive(Default)]
pub struct Components {
    pub transforms: Transforms,
    pub lights: Lights,
    pub sounds: Sounds,
    pub models: Models,
    pub bodies: Bodies,
    pub scenes: Scenes,
    pub orders: LoadOrders,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every component of an entity
    pub fn dispose(&mut self, entity: EntityId) {
        self.transforms.dispose(entity);
        self.lights.dispose(entity);
        self.sounds.dispose(entity);
        self.models.dispose(entity);
        self.bodies.dispose(entity);
        self.scenes.dispose(entity);
    }

    /// Play a loaded sound at the entity's world location
    pub fn play_sound(&mut self, entity: EntityId, index: usize) -> bool {
        let Some(location) = self.transforms.world_location(entity) else {
            tracing::warn!(entity = %entity, missing = "transform", "cannot place sound");
            return false;
        };
        self.sounds.play(entity, index, location)
    }

    /// Tell the audio layer where the listener is if it has moved
    pub fn reposition_listener(&mut self) {
        let location = self
            .sounds
            .listener()
            .and_then(|listener| self.transforms.world_location(listener));
        if let Some(location) = location {
            self.sounds.reposition_listener(location);
        }
    }

    /// Move colliders to the world poses of their entities
    pub fn refresh_bodies(&mut self) {
        self.bodies.refresh(&self.transforms);
    }
}
