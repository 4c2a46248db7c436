//! Renderable models, animated actors and text labels
//!
//! A model is assembled from separately loaded parts: a shader, a mesh,
//! textures, an optional material and an optional animation. Each part is
//! requested through [`LoadOrders`] and attached when it arrives.
//!
//! The first model of a given name to have every part loaded is handed to
//! the depot as a [`ModelTemplate`]. Models created after that copy the
//! template's parts immediately and issue no loads of their own.
//!
//! Labels are models whose mesh is typeset from a bitmap font. Their mesh is
//! unique to the entity so labels are never templated.

use super::{Components, LoadOrders};
use kestrel_assets::{
    Animation, Asset, AssetKind, GlyphMesh, Material, Mesh, ModelTemplate, Shader, Texture,
};
use kestrel_core::{EntityId, SparseStorage};
use smallvec::SmallVec;
use std::sync::Arc;

/// Text shown by a label model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Label {
    pub font: String,
    pub text: String,
    /// Wrap width in pixels, 0 for no wrapping
    pub wrap: u32,
    /// Typeset size in pixels, 0 until the text has been typeset
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub shader: Option<Arc<Shader>>,
    pub mesh: Option<Arc<Mesh>>,
    pub animation: Option<Arc<Animation>>,
    /// One slot per requested texture, filled as they load
    pub textures: SmallVec<[Option<Arc<Texture>>; 4]>,
    pub material: Option<Arc<Material>>,
    pub color: [f32; 3],
    pub alpha: f32,
    /// Current animation movement
    pub movement: usize,
    /// Current animation frame within the movement
    pub frame: f32,
    pub label: Option<Label>,
    texture_requests: usize,
    wants_mesh: bool,
    wants_material: bool,
    wants_animation: bool,
    from_template: bool,
    template_stored: bool,
}

impl Model {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            shader: None,
            mesh: None,
            animation: None,
            textures: SmallVec::new(),
            material: None,
            color: [1.0, 1.0, 1.0],
            alpha: 1.0,
            movement: 0,
            frame: 0.0,
            label: None,
            texture_requests: 0,
            wants_mesh: false,
            wants_material: false,
            wants_animation: false,
            from_template: false,
            template_stored: false,
        }
    }

    fn from_template(template: &ModelTemplate) -> Self {
        let mut model = Self::new(&template.name);
        model.shader = Some(template.shader.clone());
        model.mesh = template.mesh.clone();
        model.animation = template.animation.clone();
        model.textures = template.textures.iter().cloned().map(Some).collect();
        if let Some(material) = &template.material {
            model.apply_material(material);
        }
        model.material = template.material.clone();
        model.from_template = true;
        model
    }

    /// Every requested part has arrived
    pub fn is_loaded(&self) -> bool {
        self.shader.is_some()
            && (!self.wants_mesh || self.mesh.is_some())
            && (!self.wants_material || self.material.is_some())
            && (!self.wants_animation || self.animation.is_some())
            && self.textures.iter().all(Option::is_some)
    }

    /// True if the parts were copied from a cached template
    pub fn is_instance(&self) -> bool {
        self.from_template
    }

    /// Number of frames in the current movement
    pub fn frame_count(&self) -> usize {
        self.animation
            .as_ref()
            .map_or(0, |a| a.frame_count(self.movement))
    }

    fn apply_material(&mut self, material: &Material) {
        let [r, g, b, a] = material.color;
        self.color = [r, g, b];
        self.alpha = a;
    }

    fn to_template(&self) -> Option<ModelTemplate> {
        Some(ModelTemplate {
            name: self.name.clone(),
            shader: self.shader.clone()?,
            mesh: self.mesh.clone(),
            animation: self.animation.clone(),
            textures: self.textures.iter().cloned().collect::<Option<SmallVec<_>>>()?,
            material: self.material.clone(),
        })
    }
}

/// A model part delivered by the loader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Part {
    Shader,
    Mesh,
    Texture(usize),
    Material,
    Animation,
}

impl Part {
    fn kind(self) -> AssetKind {
        match self {
            Part::Shader => AssetKind::Shader,
            Part::Mesh => AssetKind::Mesh,
            Part::Texture(_) => AssetKind::Texture,
            Part::Material => AssetKind::Material,
            Part::Animation => AssetKind::Animation,
        }
    }
}

#[derive(Default)]
pub struct Models {
    storage: SparseStorage<Model>,
}

impl Models {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an entity a static model named after its mesh
    ///
    /// When `template` matches the name and shader its parts are used
    /// directly and nothing is loaded.
    pub fn create(
        &mut self,
        entity: EntityId,
        shader: &str,
        mesh: &str,
        template: Option<&ModelTemplate>,
        orders: &mut LoadOrders,
    ) {
        if let Some(model) = Self::instance(mesh, shader, template) {
            self.storage.insert(entity, model);
            return;
        }
        let mut model = Model::new(mesh);
        model.wants_mesh = true;
        self.storage.insert(entity, model);
        request(entity, Part::Shader, shader, orders);
        request(entity, Part::Mesh, mesh, orders);
    }

    /// Give an entity an animated model
    ///
    /// Loads the animation called `actor` and its skin texture `<actor>0`.
    pub fn create_actor(
        &mut self,
        entity: EntityId,
        shader: &str,
        actor: &str,
        template: Option<&ModelTemplate>,
        orders: &mut LoadOrders,
    ) {
        if let Some(mut model) = Self::instance(actor, shader, template) {
            model.texture_requests = 1;
            self.storage.insert(entity, model);
            return;
        }
        let mut model = Model::new(actor);
        model.wants_animation = true;
        self.storage.insert(entity, model);
        request(entity, Part::Shader, shader, orders);
        request(entity, Part::Animation, actor, orders);
        self.add_texture(entity, &format!("{actor}0"), orders);
    }

    /// Give an entity a text label drawn with a bitmap font
    ///
    /// The font atlas doubles as the label's only texture. Nothing is drawn
    /// until [`typeset`](Self::typeset) is called.
    pub fn create_label(
        &mut self,
        entity: EntityId,
        shader: &str,
        font: &str,
        orders: &mut LoadOrders,
    ) {
        let mut model = Model::new(font);
        model.label = Some(Label {
            font: font.to_string(),
            ..Label::default()
        });
        self.storage.insert(entity, model);
        request(entity, Part::Shader, shader, orders);
        // Loading the font first lets its atlas supply the texture
        orders.asset(AssetKind::Font, font, entity, |_: &mut Components, _, _| {});
        self.add_texture(entity, font, orders);
    }

    fn instance(name: &str, shader: &str, template: Option<&ModelTemplate>) -> Option<Model> {
        let template = template.filter(|t| t.name == name && t.shader.name == shader)?;
        tracing::debug!(model = name, "model created from template");
        Some(Model::from_template(template))
    }

    /// Add a texture to a model, returning its texture index
    ///
    /// Templated models already carry their textures, so the call only
    /// claims the next slot.
    pub fn add_texture(
        &mut self,
        entity: EntityId,
        name: &str,
        orders: &mut LoadOrders,
    ) -> Option<usize> {
        let model = self.storage.get_mut(entity)?;
        let index = model.texture_requests;
        model.texture_requests += 1;
        if index < model.textures.len() {
            return Some(index);
        }
        model.textures.push(None);
        request(entity, Part::Texture(index), name, orders);
        Some(index)
    }

    /// Load a material, which also sets the model colour and alpha
    pub fn load_material(&mut self, entity: EntityId, name: &str, orders: &mut LoadOrders) -> bool {
        let Some(model) = self.storage.get_mut(entity) else {
            return false;
        };
        if model.from_template && model.material.is_some() {
            return true;
        }
        model.wants_material = true;
        request(entity, Part::Material, name, orders);
        true
    }

    /// Store a part that has finished loading
    pub(crate) fn attach(
        &mut self,
        entity: EntityId,
        part: Part,
        asset: &Asset,
        orders: &mut LoadOrders,
    ) {
        let Some(model) = self.storage.get_mut(entity) else {
            tracing::debug!(entity = %entity, asset = asset.name(), "part loaded for a removed model");
            return;
        };
        let attached = match part {
            Part::Shader => asset.as_shader().map(|s| model.shader = Some(s.clone())),
            Part::Mesh => asset.as_mesh().map(|m| model.mesh = Some(m.clone())),
            Part::Animation => asset.as_animation().map(|a| model.animation = Some(a.clone())),
            Part::Texture(index) => asset.as_texture().and_then(|t| {
                model.textures.get_mut(index).map(|slot| *slot = Some(t.clone()))
            }),
            Part::Material => asset.as_material().map(|m| {
                model.apply_material(m);
                model.material = Some(m.clone());
            }),
        };
        if attached.is_none() {
            tracing::warn!(entity = %entity, asset = asset.name(), kind = %part.kind(), "unexpected model part");
            return;
        }

        if model.label.is_none() && !model.from_template && !model.template_stored && model.is_loaded() {
            if let Some(template) = model.to_template() {
                model.template_stored = true;
                orders.template(template);
            }
        }
    }

    /// Set or change the text of a label
    ///
    /// Empty or unchanged text is ignored. The glyph mesh is generated once
    /// the font has loaded and replaces any previous mesh in place.
    pub fn typeset(&mut self, entity: EntityId, text: &str, orders: &mut LoadOrders) -> bool {
        let Some(label) = self.label_mut(entity) else {
            return false;
        };
        if text.is_empty() || label.text == text {
            return true;
        }
        label.text = text.to_string();
        self.request_glyphs(entity, orders);
        true
    }

    /// Set the label wrap width in pixels, re-typesetting existing text
    pub fn set_wrap(&mut self, entity: EntityId, wrap: u32, orders: &mut LoadOrders) -> bool {
        let Some(label) = self.label_mut(entity) else {
            return false;
        };
        if label.wrap == wrap {
            return true;
        }
        label.wrap = wrap;
        if !label.text.is_empty() {
            self.request_glyphs(entity, orders);
        }
        true
    }

    /// Typeset label size in pixels
    pub fn label_size(&self, entity: EntityId) -> Option<(u32, u32)> {
        let label = self.storage.get(entity)?.label.as_ref()?;
        Some((label.width, label.height))
    }

    fn label_mut(&mut self, entity: EntityId) -> Option<&mut Label> {
        self.storage.get_mut(entity)?.label.as_mut()
    }

    fn request_glyphs(&mut self, entity: EntityId, orders: &mut LoadOrders) {
        let Some(model) = self.storage.get(entity) else {
            return;
        };
        let Some(label) = &model.label else {
            return;
        };
        let existing = model.mesh.as_ref().map(|m| m.handle);
        orders.glyphs(
            entity,
            &label.font,
            &label.text,
            label.wrap,
            existing,
            |c: &mut Components, eid, glyphs| c.models.glyphs_ready(eid, glyphs),
        );
    }

    fn glyphs_ready(&mut self, entity: EntityId, glyphs: GlyphMesh) {
        let Some(model) = self.storage.get_mut(entity) else {
            return;
        };
        let Some(label) = model.label.as_mut() else {
            return;
        };
        label.width = glyphs.width;
        label.height = glyphs.height;
        model.mesh = Some(Arc::new(glyphs.mesh));
    }

    /// Select an animation movement and frame
    ///
    /// Returns true if the movement exists. The frame is only changed when
    /// it lies within the movement.
    pub fn animate(&mut self, entity: EntityId, movement: usize, frame: usize) -> bool {
        let Some(model) = self.storage.get_mut(entity) else {
            return false;
        };
        let Some(animation) = &model.animation else {
            return false;
        };
        let frames = animation.frame_count(movement);
        if frames == 0 {
            return false;
        }
        model.movement = movement;
        if frame < frames {
            model.frame = frame as f32;
        }
        true
    }

    /// Names of the movements an animated model can play
    pub fn movements(&self, entity: EntityId) -> Vec<String> {
        self.storage
            .get(entity)
            .and_then(|m| m.animation.as_ref())
            .map(|a| a.movements.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Advance every playing animation by `dt` seconds, looping movements
    pub fn advance(&mut self, dt: f64) {
        for (_, model) in self.storage.iter_mut() {
            let Some(movement) = model
                .animation
                .as_ref()
                .and_then(|a| a.movements.get(model.movement))
            else {
                continue;
            };
            if movement.frame_count == 0 {
                continue;
            }
            let frames = movement.frame_count as f32;
            model.frame = (model.frame + dt as f32 * movement.rate).rem_euclid(frames);
        }
    }

    pub fn set_color(&mut self, entity: EntityId, color: [f32; 3]) -> bool {
        self.storage.get_mut(entity).map(|m| m.color = color).is_some()
    }

    pub fn set_alpha(&mut self, entity: EntityId, alpha: f32) -> bool {
        self.storage
            .get_mut(entity)
            .map(|m| m.alpha = alpha.clamp(0.0, 1.0))
            .is_some()
    }

    pub fn get(&self, entity: EntityId) -> Option<&Model> {
        self.storage.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Model)> {
        self.storage.iter()
    }

    pub fn dispose(&mut self, entity: EntityId) {
        self.storage.remove(entity);
    }
}

fn request(entity: EntityId, part: Part, name: &str, orders: &mut LoadOrders) {
    orders.asset(part.kind(), name, entity, move |c: &mut Components, eid, asset| {
        c.models.attach(eid, part, asset, &mut c.orders);
    });
}
