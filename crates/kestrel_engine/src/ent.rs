//! Chainable entity facade
//!
//! [`Ent`] borrows the engine for the duration of a chain of calls on one
//! entity:
//!
//! ```ignore
//! let mut hud = engine.add_scene(SceneKind::Orthographic)?;
//! hud.add_part()?
//!     .at(DVec3::new(10.0, 10.0, 0.0))
//!     .make_label("txt", "lucida")
//!     .typeset("score 0");
//! ```
//!
//! Operations that need a component the entity does not have log a warning
//! naming the entity and the missing component and leave it unchanged.

use crate::components::{Body, LightKind, Model, SceneKind};
use crate::engine::Engine;
use crate::error::Result;
use glam::{DAffine3, DQuat, DVec3};
use kestrel_core::EntityId;
use kestrel_physics::Collider;

pub struct Ent<'a> {
    engine: &'a mut Engine,
    eid: EntityId,
}

impl<'a> Ent<'a> {
    pub(crate) fn new(engine: &'a mut Engine, eid: EntityId) -> Self {
        Self { engine, eid }
    }

    pub fn eid(&self) -> EntityId {
        self.eid
    }

    pub fn exists(&self) -> bool {
        self.engine.exists(self.eid)
    }

    fn missing(&self, missing: &'static str, op: &'static str) {
        tracing::warn!(entity = %self.eid, missing, op, "entity operation skipped");
    }

    fn live(&self, op: &'static str) -> bool {
        let live = self.exists();
        if !live {
            self.missing("entity", op);
        }
        live
    }

    /// Create a child entity and move the facade to it
    pub fn add_part(self) -> Result<Ent<'a>> {
        let parent = self.live("add_part").then_some(self.eid);
        let eid = self.engine.create_entity(parent)?;
        Ok(Ent::new(self.engine, eid))
    }

    /// Dispose the entity and everything below it
    pub fn dispose(self) -> bool {
        self.engine.dispose_entity(self.eid)
    }

    // Placement

    pub fn at(self, location: DVec3) -> Self {
        if !self.engine.components.transforms.set_location(self.eid, location) {
            self.missing("transform", "at");
        }
        self
    }

    pub fn set_rotation(self, rotation: DQuat) -> Self {
        if !self.engine.components.transforms.set_rotation(self.eid, rotation) {
            self.missing("transform", "set_rotation");
        }
        self
    }

    pub fn set_scale(self, scale: DVec3) -> Self {
        if !self.engine.components.transforms.set_scale(self.eid, scale) {
            self.missing("transform", "set_scale");
        }
        self
    }

    /// Local location
    pub fn location(&self) -> Option<DVec3> {
        self.engine.components.transforms.get(self.eid).map(|t| t.location)
    }

    /// Entity to world transform
    pub fn world(&self) -> Option<DAffine3> {
        self.engine.components.transforms.world(self.eid)
    }

    // Models

    /// Draw `mesh` with `shader`
    pub fn make_model(self, shader: &str, mesh: &str) -> Self {
        if !self.live("make_model") {
            return self;
        }
        let template = self.engine.depot.model(mesh);
        let components = &mut self.engine.components;
        components
            .models
            .create(self.eid, shader, mesh, template.as_deref(), &mut components.orders);
        self
    }

    /// Draw the animated model `actor` with `shader`
    pub fn make_actor(self, shader: &str, actor: &str) -> Self {
        if !self.live("make_actor") {
            return self;
        }
        let template = self.engine.depot.model(actor);
        let components = &mut self.engine.components;
        components
            .models
            .create_actor(self.eid, shader, actor, template.as_deref(), &mut components.orders);
        self
    }

    pub fn add_texture(self, texture: &str) -> Self {
        let components = &mut self.engine.components;
        if components
            .models
            .add_texture(self.eid, texture, &mut components.orders)
            .is_none()
        {
            self.missing("model", "add_texture");
        }
        self
    }

    pub fn load_material(self, material: &str) -> Self {
        let components = &mut self.engine.components;
        if !components
            .models
            .load_material(self.eid, material, &mut components.orders)
        {
            self.missing("model", "load_material");
        }
        self
    }

    pub fn set_color(self, r: f32, g: f32, b: f32) -> Self {
        if !self.engine.components.models.set_color(self.eid, [r, g, b]) {
            self.missing("model", "set_color");
        }
        self
    }

    pub fn set_alpha(self, alpha: f32) -> Self {
        if !self.engine.components.models.set_alpha(self.eid, alpha) {
            self.missing("model", "set_alpha");
        }
        self
    }

    pub fn model(&self) -> Option<&Model> {
        self.engine.components.models.get(self.eid)
    }

    /// Select an animation movement, true if the movement exists
    pub fn animate(&mut self, movement: usize, frame: usize) -> bool {
        if self.engine.components.models.get(self.eid).is_none() {
            self.missing("model", "animate");
            return false;
        }
        self.engine.components.models.animate(self.eid, movement, frame)
    }

    pub fn movements(&self) -> Vec<String> {
        self.engine.components.models.movements(self.eid)
    }

    // Labels

    /// Show text drawn with a bitmap font
    pub fn make_label(self, shader: &str, font: &str) -> Self {
        if !self.live("make_label") {
            return self;
        }
        let components = &mut self.engine.components;
        components
            .models
            .create_label(self.eid, shader, font, &mut components.orders);
        self
    }

    pub fn typeset(self, text: &str) -> Self {
        let components = &mut self.engine.components;
        if !components.models.typeset(self.eid, text, &mut components.orders) {
            self.missing("label", "typeset");
        }
        self
    }

    pub fn set_wrap(self, wrap: u32) -> Self {
        let components = &mut self.engine.components;
        if !components.models.set_wrap(self.eid, wrap, &mut components.orders) {
            self.missing("label", "set_wrap");
        }
        self
    }

    /// Typeset label size in pixels, zero until the font has loaded
    pub fn label_size(&self) -> (u32, u32) {
        match self.engine.components.models.label_size(self.eid) {
            Some(size) => size,
            None => {
                self.missing("label", "label_size");
                (0, 0)
            }
        }
    }

    // Lights

    pub fn make_light(self, kind: LightKind) -> Self {
        if self.live("make_light") {
            self.engine.components.lights.create(self.eid, kind);
        }
        self
    }

    pub fn set_light_color(self, r: f32, g: f32, b: f32) -> Self {
        match self.engine.components.lights.get_mut(self.eid) {
            Some(light) => light.color = [r, g, b],
            None => self.missing("light", "set_light_color"),
        }
        self
    }

    // Sound

    /// Load a sound, returning its index on this entity
    pub fn add_sound(&mut self, sound: &str) -> Option<usize> {
        if !self.live("add_sound") {
            return None;
        }
        let components = &mut self.engine.components;
        Some(components.sounds.add(self.eid, sound, &mut components.orders))
    }

    /// Play a loaded sound from this entity's world location
    pub fn play_sound(&mut self, index: usize) -> bool {
        self.engine.components.play_sound(self.eid, index)
    }

    /// Hear sounds from this entity
    pub fn set_listener(self) -> Self {
        if self.live("set_listener") {
            self.engine.components.sounds.set_listener(self.eid);
        }
        self
    }

    // Physics

    pub fn make_body(self, collider: Collider, mass: f64) -> Self {
        if self.live("make_body") {
            self.engine
                .components
                .bodies
                .create(self.eid, Body::new(collider, mass));
        }
        self
    }

    pub fn set_material(self, mass: f64, restitution: f64) -> Self {
        if !self
            .engine
            .components
            .bodies
            .set_material(self.eid, mass, restitution)
        {
            self.missing("body", "set_material");
        }
        self
    }

    // Scenes

    pub fn make_scene(self, kind: SceneKind) -> Self {
        if self.live("make_scene") {
            self.engine.components.scenes.create(self.eid, kind);
        }
        self
    }

    pub fn set_visible(self, visible: bool) -> Self {
        if !self.engine.components.scenes.set_visible(self.eid, visible) {
            self.missing("scene", "set_visible");
        }
        self
    }

    /// Draw this scene after every other scene
    pub fn set_last(self) -> Self {
        if !self.engine.components.scenes.set_last(self.eid) {
            self.missing("scene", "set_last");
        }
        self
    }
}
