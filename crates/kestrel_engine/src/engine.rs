//! The engine context
//!
//! [`Engine`] owns every piece of engine state: the entity allocator, the
//! asset depot, the loader and its worker pool, the uploader and the
//! component managers. Nothing is global, so any number of engines can live
//! side by side.
//!
//! Call [`Engine::update`] once per frame from the thread that owns the
//! uploader. It forwards queued load requests to the loader, spends at most
//! the configured budget uploading finished files and runs their callbacks.

use crate::components::{Components, LoadOrder, SceneKind, SoundCue};
use crate::config::EngineConfig;
use crate::ent::Ent;
use crate::error::Result;
use kestrel_assets::{
    Depot, DrainStats, HeadlessUploader, Importer, ImporterRegistry, Loader, Uploader,
};
use kestrel_core::{EntityId, EntityIds};
use rustc_hash::FxHashSet;
use std::sync::Arc;

pub struct Engine {
    config: EngineConfig,
    eids: EntityIds,
    pub(crate) depot: Depot,
    loader: Loader<Components>,
    uploader: Box<dyn Uploader>,
    pub(crate) components: Components,
    root: EntityId,
}

impl Engine {
    /// Start an engine and its loader workers
    ///
    /// The first entity becomes the root. It has a transform at the origin
    /// and is the initial sound listener.
    pub fn new(
        config: EngineConfig,
        importer: Arc<dyn Importer>,
        uploader: Box<dyn Uploader>,
    ) -> Result<Self> {
        let loader = Loader::new(config.loader.clone(), importer)?;
        let mut eids = EntityIds::new();
        let root = eids.try_create()?;
        let mut components = Components::new();
        components.transforms.create(root, None);
        components.sounds.set_listener(root);

        tracing::info!(
            workers = config.loader.workers,
            asset_dir = %config.loader.asset_dir.display(),
            "engine started"
        );
        Ok(Self {
            config,
            eids,
            depot: Depot::new(),
            loader,
            uploader,
            components,
            root,
        })
    }

    /// Engine with the built-in importers and no devices
    pub fn headless(config: EngineConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(ImporterRegistry::new()),
            Box::new(HeadlessUploader::new()),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Create an entity with a transform, parented to `parent` if given
    pub fn create_entity(&mut self, parent: Option<EntityId>) -> Result<EntityId> {
        let eid = self.eids.try_create().map_err(|err| {
            tracing::error!(error = %err, "entity allocation failed");
            err
        })?;
        let parent = parent.filter(|&p| {
            let live = self.eids.valid(p);
            if !live {
                tracing::warn!(entity = %eid, parent = %p, "stale parent ignored");
            }
            live
        });
        self.components.transforms.create(eid, parent);
        Ok(eid)
    }

    /// Create a child of the root and return its facade
    pub fn add_part(&mut self) -> Result<Ent<'_>> {
        let eid = self.create_entity(Some(self.root))?;
        Ok(Ent::new(self, eid))
    }

    /// Create a top level scene and return its facade
    pub fn add_scene(&mut self, kind: SceneKind) -> Result<Ent<'_>> {
        let eid = self.create_entity(None)?;
        self.components.scenes.create(eid, kind);
        Ok(Ent::new(self, eid))
    }

    /// Facade over an existing entity
    pub fn ent(&mut self, eid: EntityId) -> Ent<'_> {
        Ent::new(self, eid)
    }

    pub fn exists(&self, eid: EntityId) -> bool {
        self.eids.valid(eid)
    }

    /// Dispose an entity, its descendants and all of their components
    ///
    /// Stale ids and the root are ignored with a log line.
    pub fn dispose_entity(&mut self, eid: EntityId) -> bool {
        if !self.eids.valid(eid) {
            tracing::warn!(entity = %eid, "dispose of stale entity ignored");
            return false;
        }
        if eid == self.root {
            tracing::warn!(entity = %eid, "the root entity cannot be disposed");
            return false;
        }

        let mut doomed = vec![eid];
        let mut seen = FxHashSet::default();
        seen.insert(eid);
        let mut next = 0;
        while next < doomed.len() {
            for child in self.components.transforms.children(doomed[next]) {
                if seen.insert(child) {
                    doomed.push(child);
                }
            }
            next += 1;
        }

        for &entity in doomed.iter().rev() {
            self.components.dispose(entity);
            self.eids.dispose(entity);
        }
        tracing::debug!(entity = %eid, count = doomed.len(), "entities disposed");
        true
    }

    /// Per-frame work
    ///
    /// Hands queued load requests to the loader, drains finished loads,
    /// forwards anything the callbacks queued, then moves the listener and
    /// the physics bodies to their current transforms.
    pub fn update(&mut self) -> DrainStats {
        self.flush_orders();
        let stats = self
            .loader
            .drain(&mut self.depot, self.uploader.as_mut(), &mut self.components);
        self.flush_orders();
        self.components.reposition_listener();
        self.components.refresh_bodies();
        stats
    }

    /// Advance model animations by `dt` seconds
    pub fn animate(&mut self, dt: f64) {
        self.components.models.advance(dt);
    }

    /// True if no load is queued, in flight or waiting on a callback
    pub fn is_idle(&self) -> bool {
        self.components.orders.is_empty() && self.loader.is_idle()
    }

    /// Take the sound cues produced since the last call
    pub fn drain_sound_cues(&mut self) -> Vec<SoundCue> {
        self.components.sounds.drain_cues()
    }

    /// Stop the loader workers. Already finished loads can still be drained.
    pub fn shutdown(&mut self) {
        self.loader.shutdown();
        tracing::info!(entities = self.eids.len(), assets = self.depot.len(), "engine shut down");
    }

    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    pub fn loader(&self) -> &Loader<Components> {
        &self.loader
    }

    pub fn entities(&self) -> &EntityIds {
        &self.eids
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    fn flush_orders(&mut self) {
        while !self.components.orders.is_empty() {
            for order in self.components.orders.take() {
                match order {
                    LoadOrder::Asset {
                        kind,
                        name,
                        entity,
                        callback,
                    } => self.loader.request(&self.depot, kind, &name, entity, callback),
                    LoadOrder::Glyphs {
                        entity,
                        font,
                        text,
                        wrap,
                        existing,
                        callback,
                    } => self.loader.request_glyphs(
                        &self.depot,
                        entity,
                        &font,
                        &text,
                        wrap,
                        existing,
                        callback,
                    ),
                    LoadOrder::Template(template) => {
                        if self.depot.model(&template.name).is_none() {
                            tracing::debug!(model = %template.name, "model template cached");
                            self.loader
                                .store(&mut self.depot, &mut self.components, template.into());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use kestrel_assets::AssetData;
    use std::path::Path;

    /// Importer for engines that never load files
    struct NoFiles;

    impl Importer for NoFiles {
        fn load(&self, path: &Path) -> kestrel_assets::Result<Vec<AssetData>> {
            Err(kestrel_assets::AssetError::NotFound(path.display().to_string()))
        }

        fn supported_extensions(&self) -> &[&str] {
            &[]
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    fn engine() -> Engine {
        let config = EngineConfig::default().with_workers(1);
        Engine::new(config, Arc::new(NoFiles), Box::new(HeadlessUploader::new())).unwrap()
    }

    #[test]
    fn test_root_is_first_entity() {
        let engine = engine();
        assert!(engine.root().is_null());
        assert!(engine.exists(engine.root()));
        assert_eq!(engine.components().sounds.listener(), Some(engine.root()));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_dispose_cascades_to_children() {
        let mut engine = engine();
        let parent = engine.create_entity(None).unwrap();
        let child = engine.create_entity(Some(parent)).unwrap();
        let grandchild = engine.create_entity(Some(child)).unwrap();
        let other = engine.create_entity(None).unwrap();

        assert!(engine.dispose_entity(parent));
        for eid in [parent, child, grandchild] {
            assert!(!engine.exists(eid));
            assert!(!engine.components().transforms.contains(eid));
        }
        assert!(engine.exists(other));

        assert!(!engine.dispose_entity(parent));
        assert!(!engine.dispose_entity(engine.root()));
    }

    #[test]
    fn test_stale_parent_ignored() {
        let mut engine = engine();
        let gone = engine.create_entity(None).unwrap();
        engine.dispose_entity(gone);
        let eid = engine.create_entity(Some(gone)).unwrap();
        assert_eq!(engine.components().transforms.get(eid).unwrap().parent, None);
    }

    #[test]
    fn test_update_moves_listener() {
        let mut engine = engine();
        let root = engine.root();
        engine.update();
        engine.components_mut().transforms.set_location(root, DVec3::Y);
        engine.update();
        assert_eq!(
            engine.drain_sound_cues(),
            vec![
                SoundCue::Listener { location: DVec3::ZERO },
                SoundCue::Listener { location: DVec3::Y },
            ]
        );
    }
}
