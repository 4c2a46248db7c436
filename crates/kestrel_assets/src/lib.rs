//! # Kestrel Assets
//!
//! Loading, uploading and caching of engine assets.
//!
//! - **Asset / AssetId**: typed, shared, immutable resources and their ids
//! - **Depot**: the de-duplicating cache holding one instance per asset
//! - **Importers**: file parsers run on worker threads
//! - **Uploader**: the seam to GPU and audio devices
//! - **Loader**: the worker pool and the time boxed per-frame drain
//!
//! ```rust
//! use kestrel_assets::{Asset, AssetKind, Depot, Material};
//!
//! let mut depot = Depot::new();
//! assert!(depot.fetch(AssetKind::Material, "red").is_none());
//!
//! let red = Asset::from(Material {
//!     name: "red".into(),
//!     color: [1.0, 0.0, 0.0, 1.0],
//!     metallic: 0.0,
//!     roughness: 1.0,
//! });
//! depot.cache(red.clone());
//! assert!(depot.fetch(AssetKind::Material, "red").unwrap().ptr_eq(&red));
//! ```

pub mod asset;
pub mod data;
pub mod depot;
pub mod error;
pub mod font;
pub mod importers;
pub mod loader;
pub mod upload;

pub use asset::{
    Animation, Asset, AssetId, AssetKind, Material, Mesh, ModelTemplate, Shader, Sound, Texture,
};
pub use data::{
    AnimationData, AssetData, AudioData, GlyphData, GlyphMap, ImageData, JointData, MaterialData,
    MeshData, MovementData, ShaderSource,
};
pub use depot::{Depot, DepotStats};
pub use error::{AssetError, Result};
pub use font::{Font, Glyph, Typeset};
pub use importers::{Importer, ImporterRegistry};
pub use loader::{
    AssetCallback, DrainStats, FileState, GlyphCallback, GlyphMesh, Loader, LoaderConfig,
};
pub use upload::{
    HeadlessUploader, MeshHandle, ShaderHandle, SoundHandle, TextureHandle, Uploader,
};
