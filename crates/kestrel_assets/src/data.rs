//! Importer output
//!
//! Importers run on worker threads and produce plain data. Nothing in here
//! references a GPU or audio device; the drain step turns these blobs into
//! uploaded [`Asset`](crate::Asset)s on the owning thread.

use crate::asset::AssetKind;

/// Triangle mesh vertex data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Mesh name
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, empty if absent
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex texture coordinates, empty if absent
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create empty mesh data
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Decoded RGBA8 image
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    /// Texture name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA8 pixels
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// True if every pixel has full alpha
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == u8::MAX)
    }
}

/// PCM audio samples plus their format
#[derive(Clone, Debug, PartialEq)]
pub struct AudioData {
    /// Sound name
    pub name: String,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample
    pub sample_bits: u16,
    /// Samples per second
    pub frequency: u32,
    /// Raw sample bytes
    pub samples: Vec<u8>,
}

/// Shader program source
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSource {
    /// Shader name
    pub name: String,
    /// Vertex stage source
    pub vertex: String,
    /// Fragment stage source
    pub fragment: String,
}

/// Placement of a single character within a font atlas
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphData {
    /// Character
    pub ch: char,
    /// Atlas x of the top left corner
    pub x: u32,
    /// Atlas y of the top left corner
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Horizontal offset when drawn
    pub x_offset: i32,
    /// Vertical offset when drawn
    pub y_offset: i32,
    /// Pen advance after the character
    pub x_advance: i32,
}

/// Glyph metrics for a bitmap font
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphMap {
    /// Font name
    pub name: String,
    /// Atlas width in pixels
    pub width: u32,
    /// Atlas height in pixels
    pub height: u32,
    /// Distance between lines in pixels
    pub line_height: u32,
    /// Every glyph in the atlas
    pub glyphs: Vec<GlyphData>,
}

/// Surface colour for a mesh
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    /// Material name
    pub name: String,
    /// Base colour, rgba in 0..=1
    pub color: [f32; 4],
    /// Metallic factor
    pub metallic: f32,
    /// Roughness factor
    pub roughness: f32,
}

/// One joint of an animation rig
#[derive(Clone, Debug, PartialEq)]
pub struct JointData {
    /// Joint name
    pub name: String,
    /// Parent joint index, `None` for roots
    pub parent: Option<usize>,
}

/// A named range of frames
#[derive(Clone, Debug, PartialEq)]
pub struct MovementData {
    /// Movement name, eg "walk"
    pub name: String,
    /// First frame
    pub first_frame: usize,
    /// Number of frames
    pub frame_count: usize,
    /// Frames per second
    pub rate: f32,
}

/// Skeletal animation data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationData {
    /// Animation name
    pub name: String,
    /// Rig joints
    pub joints: Vec<JointData>,
    /// Per-frame joint poses as column-major 4x4 matrices
    pub frames: Vec<Vec<[f32; 16]>>,
    /// Movements that index into `frames`
    pub movements: Vec<MovementData>,
}

/// One typed record produced by an importer
#[derive(Clone, Debug, PartialEq)]
pub enum AssetData {
    /// Mesh geometry
    Mesh(MeshData),
    /// Texture pixels
    Image(ImageData),
    /// Sound samples
    Audio(AudioData),
    /// Shader program source
    Shader(ShaderSource),
    /// Font metrics plus the atlas texture
    FontAtlas(GlyphMap, ImageData),
    /// Material colours
    Material(MaterialData),
    /// Animation rig and frames
    Animation(AnimationData),
}

impl AssetData {
    /// Name of the asset this record produces
    pub fn name(&self) -> &str {
        match self {
            AssetData::Mesh(d) => &d.name,
            AssetData::Image(d) => &d.name,
            AssetData::Audio(d) => &d.name,
            AssetData::Shader(d) => &d.name,
            AssetData::FontAtlas(d, _) => &d.name,
            AssetData::Material(d) => &d.name,
            AssetData::Animation(d) => &d.name,
        }
    }

    /// Kind of asset this record produces
    ///
    /// A font atlas also produces a texture of the same name.
    pub fn kind(&self) -> AssetKind {
        match self {
            AssetData::Mesh(_) => AssetKind::Mesh,
            AssetData::Image(_) => AssetKind::Texture,
            AssetData::Audio(_) => AssetKind::Sound,
            AssetData::Shader(_) => AssetKind::Shader,
            AssetData::FontAtlas(..) => AssetKind::Font,
            AssetData::Material(_) => AssetKind::Material,
            AssetData::Animation(_) => AssetKind::Animation,
        }
    }
}
