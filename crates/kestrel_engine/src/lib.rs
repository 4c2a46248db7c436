//! # Kestrel Engine
//!
//! Component managers and the engine context that ties entities, assets and
//! physics together.
//!
//! - **Engine**: owns the entity allocator, depot, loader and managers
//! - **Ent**: a chainable facade over one entity
//! - **Components**: transforms, lights, sounds, models and labels, bodies
//!   and scenes
//! - **EngineConfig**: TOML configuration
//!
//! ```no_run
//! use glam::DVec3;
//! use kestrel_engine::{Engine, EngineConfig, SceneKind};
//!
//! # fn main() -> kestrel_engine::Result<()> {
//! let mut engine = Engine::headless(EngineConfig::default().with_asset_dir("assets"))?;
//! let scene = engine.add_scene(SceneKind::Perspective)?.eid();
//! engine
//!     .ent(scene)
//!     .add_part()?
//!     .at(DVec3::new(0.0, 0.0, -5.0))
//!     .make_model("flat", "box")
//!     .add_texture("crate");
//!
//! // Once per frame
//! let stats = engine.update();
//! println!("{} assets uploaded", stats.uploaded);
//! # Ok(())
//! # }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod ent;
pub mod error;

pub use components::{
    collider_from_mesh, Body, Components, Label, Light, LightKind, LoadOrder, LoadOrders, Model,
    Scene, SceneKind, SoundCue, Transform,
};
pub use config::EngineConfig;
pub use engine::Engine;
pub use ent::Ent;
pub use error::{EngineError, Result};
