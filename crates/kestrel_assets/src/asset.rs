//! Asset identity and the loaded asset types
//!
//! An asset is unique by kind and name. [`AssetId`] folds both into a
//! single `u64` with the kind in the low 8 bits and a hash of the name in
//! the rest. Loaded assets are shared through `Arc`, so two handles refer to
//! the same asset exactly when their pointers are equal.

use crate::data::{AnimationData, JointData, MaterialData, MovementData};
use crate::font::Font;
use crate::upload::{MeshHandle, ShaderHandle, SoundHandle, TextureHandle};
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The kinds of asset the engine knows how to load and cache
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AssetKind {
    /// Bitmap font glyph metrics
    Font = 0,
    /// Compiled shader program
    Shader,
    /// Surface colours
    Material,
    /// Uploaded vertex data
    Mesh,
    /// Uploaded image
    Texture,
    /// Uploaded audio samples
    Sound,
    /// Rig and skin animation frames
    Animation,
    /// Template combining the above
    Model,
}

impl AssetKind {
    /// Number of asset kinds
    pub const COUNT: usize = 8;

    /// Every kind in discriminant order
    pub const ALL: [AssetKind; Self::COUNT] = [
        AssetKind::Font,
        AssetKind::Shader,
        AssetKind::Material,
        AssetKind::Mesh,
        AssetKind::Texture,
        AssetKind::Sound,
        AssetKind::Animation,
        AssetKind::Model,
    ];

    /// Position of the kind in [`AssetKind::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Kind for a raw discriminant
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Short lowercase label used in logs
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Font => "fnt",
            AssetKind::Shader => "shd",
            AssetKind::Material => "mat",
            AssetKind::Mesh => "msh",
            AssetKind::Texture => "tex",
            AssetKind::Sound => "snd",
            AssetKind::Animation => "anm",
            AssetKind::Model => "mod",
        }
    }

    /// File that produces the asset of this kind called `name`
    ///
    /// Models are assembled from other assets and have no file.
    pub fn file_name(self, name: &str) -> Option<String> {
        let ext = match self {
            AssetKind::Font => "fnt",
            AssetKind::Shader => "vsh",
            AssetKind::Material => "mtl",
            AssetKind::Mesh => "obj",
            AssetKind::Texture => "png",
            AssetKind::Sound => "wav",
            AssetKind::Animation => "iqm",
            AssetKind::Model => return None,
        };
        Some(format!("{name}.{ext}"))
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unique asset identifier derived from kind and name
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u64);

impl AssetId {
    /// Identifier for the asset of `kind` called `name`
    pub fn new(kind: AssetKind, name: &str) -> Self {
        let mut hasher = FxHasher::default();
        name.hash(&mut hasher);
        Self(u64::from(kind as u8) | (hasher.finish() << 8))
    }

    /// Kind stored in the low 8 bits
    pub fn kind(self) -> Option<AssetKind> {
        AssetKind::from_raw((self.0 & 0xff) as u8)
    }

    /// Raw packed value
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:#018x})", self.0)
    }
}

/// Compiled shader program
#[derive(Clone, Debug, PartialEq)]
pub struct Shader {
    pub name: String,
    pub handle: ShaderHandle,
}

/// Texture resident on the GPU
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    /// All pixels have full alpha
    pub opaque: bool,
}

/// Surface colour values. Never uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

impl From<MaterialData> for Material {
    fn from(data: MaterialData) -> Self {
        Self {
            name: data.name,
            color: data.color,
            metallic: data.metallic,
            roughness: data.roughness,
        }
    }
}

/// Vertex data resident on the GPU
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub handle: MeshHandle,
    pub vertex_count: usize,
    pub index_count: usize,
}

/// Audio samples resident on the audio device
#[derive(Clone, Debug, PartialEq)]
pub struct Sound {
    pub name: String,
    pub handle: SoundHandle,
    pub channels: u16,
    pub sample_bits: u16,
    pub frequency: u32,
}

/// Skeletal animation
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub name: String,
    pub joints: Vec<JointData>,
    pub frames: Vec<Vec<[f32; 16]>>,
    pub movements: Vec<MovementData>,
}

impl Animation {
    /// Number of frames in a movement, 0 for unknown movements
    pub fn frame_count(&self, movement: usize) -> usize {
        self.movements
            .get(movement)
            .map_or(0, |m| m.frame_count)
    }

    /// Index of a movement by name
    pub fn movement(&self, name: &str) -> Option<usize> {
        self.movements.iter().position(|m| m.name == name)
    }
}

impl From<AnimationData> for Animation {
    fn from(data: AnimationData) -> Self {
        Self {
            name: data.name,
            joints: data.joints,
            frames: data.frames,
            movements: data.movements,
        }
    }
}

/// The shared parts of a model
///
/// The first model of a given name to finish loading is kept as a template.
/// Later instances clone these handles instead of loading again. The
/// template itself is never drawn.
#[derive(Clone, Debug)]
pub struct ModelTemplate {
    pub name: String,
    pub shader: Arc<Shader>,
    pub mesh: Option<Arc<Mesh>>,
    pub animation: Option<Arc<Animation>>,
    pub textures: SmallVec<[Arc<Texture>; 4]>,
    pub material: Option<Arc<Material>>,
}

/// A loaded, immutable asset
#[derive(Clone, Debug)]
pub enum Asset {
    Font(Arc<Font>),
    Shader(Arc<Shader>),
    Material(Arc<Material>),
    Mesh(Arc<Mesh>),
    Texture(Arc<Texture>),
    Sound(Arc<Sound>),
    Animation(Arc<Animation>),
    Model(Arc<ModelTemplate>),
}

macro_rules! asset_accessors {
    ($($variant:ident => $fn_name:ident: $ty:ty),* $(,)?) => {
        impl Asset {
            $(
                #[doc = concat!("The payload if this is a ", stringify!($variant))]
                pub fn $fn_name(&self) -> Option<&Arc<$ty>> {
                    match self {
                        Asset::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$ty> for Asset {
                fn from(value: $ty) -> Self {
                    Asset::$variant(Arc::new(value))
                }
            }

            impl From<Arc<$ty>> for Asset {
                fn from(value: Arc<$ty>) -> Self {
                    Asset::$variant(value)
                }
            }
        )*
    };
}

asset_accessors! {
    Font => as_font: Font,
    Shader => as_shader: Shader,
    Material => as_material: Material,
    Mesh => as_mesh: Mesh,
    Texture => as_texture: Texture,
    Sound => as_sound: Sound,
    Animation => as_animation: Animation,
    Model => as_model: ModelTemplate,
}

impl Asset {
    /// Kind of this asset
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Font(_) => AssetKind::Font,
            Asset::Shader(_) => AssetKind::Shader,
            Asset::Material(_) => AssetKind::Material,
            Asset::Mesh(_) => AssetKind::Mesh,
            Asset::Texture(_) => AssetKind::Texture,
            Asset::Sound(_) => AssetKind::Sound,
            Asset::Animation(_) => AssetKind::Animation,
            Asset::Model(_) => AssetKind::Model,
        }
    }

    /// Asset name
    pub fn name(&self) -> &str {
        match self {
            Asset::Font(a) => a.name(),
            Asset::Shader(a) => &a.name,
            Asset::Material(a) => &a.name,
            Asset::Mesh(a) => &a.name,
            Asset::Texture(a) => &a.name,
            Asset::Sound(a) => &a.name,
            Asset::Animation(a) => &a.name,
            Asset::Model(a) => &a.name,
        }
    }

    /// Identifier built from kind and name
    pub fn id(&self) -> AssetId {
        AssetId::new(self.kind(), self.name())
    }

    /// True if both values share the same allocation
    pub fn ptr_eq(&self, other: &Asset) -> bool {
        match (self, other) {
            (Asset::Font(a), Asset::Font(b)) => Arc::ptr_eq(a, b),
            (Asset::Shader(a), Asset::Shader(b)) => Arc::ptr_eq(a, b),
            (Asset::Material(a), Asset::Material(b)) => Arc::ptr_eq(a, b),
            (Asset::Mesh(a), Asset::Mesh(b)) => Arc::ptr_eq(a, b),
            (Asset::Texture(a), Asset::Texture(b)) => Arc::ptr_eq(a, b),
            (Asset::Sound(a), Asset::Sound(b)) => Arc::ptr_eq(a, b),
            (Asset::Animation(a), Asset::Animation(b)) => Arc::ptr_eq(a, b),
            (Asset::Model(a), Asset::Model(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
