//! Device upload seam
//!
//! The loader never talks to a GPU or audio device directly. Everything
//! that needs a device goes through an [`Uploader`], which is only ever
//! called from the thread that drains the loader.

use crate::data::{AudioData, ImageData, MeshData, ShaderSource};
use crate::error::{AssetError, Result};

/// GPU reference to uploaded vertex data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// GPU reference to an uploaded texture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Audio device reference to uploaded samples
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// GPU reference to a compiled shader program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Transfers imported data to the GPU and audio devices
///
/// Each call may fail with a descriptive [`AssetError::Upload`]. A failure
/// only affects the asset being uploaded.
pub trait Uploader {
    /// Upload vertex data
    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle>;

    /// Replace the data behind an existing mesh, used for regenerated text
    fn update_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) -> Result<()>;

    /// Upload texture pixels
    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle>;

    /// Upload audio samples
    fn upload_sound(&mut self, audio: &AudioData) -> Result<SoundHandle>;

    /// Compile a shader program
    fn compile_shader(&mut self, source: &ShaderSource) -> Result<ShaderHandle>;
}

/// Uploader for running without any device
///
/// Hands out sequential handles and keeps counts. Rejects empty meshes,
/// zero sized images and empty sounds the way a real device would.
#[derive(Debug, Default)]
pub struct HeadlessUploader {
    next_handle: u32,
    /// Number of successful mesh uploads
    pub meshes: usize,
    /// Number of mesh updates
    pub mesh_updates: usize,
    /// Number of successful texture uploads
    pub textures: usize,
    /// Number of successful sound uploads
    pub sounds: usize,
    /// Number of successful shader compiles
    pub shaders: usize,
}

impl HeadlessUploader {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Uploader for HeadlessUploader {
    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle> {
        if mesh.positions.is_empty() {
            return Err(AssetError::upload(&mesh.name, "mesh has no vertices"));
        }
        self.meshes += 1;
        Ok(MeshHandle(self.next()))
    }

    fn update_mesh(&mut self, _handle: MeshHandle, _mesh: &MeshData) -> Result<()> {
        self.mesh_updates += 1;
        Ok(())
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureHandle> {
        if image.width == 0 || image.height == 0 {
            return Err(AssetError::upload(&image.name, "zero sized image"));
        }
        self.textures += 1;
        Ok(TextureHandle(self.next()))
    }

    fn upload_sound(&mut self, audio: &AudioData) -> Result<SoundHandle> {
        if audio.samples.is_empty() {
            return Err(AssetError::upload(&audio.name, "no samples"));
        }
        self.sounds += 1;
        Ok(SoundHandle(u64::from(self.next())))
    }

    fn compile_shader(&mut self, source: &ShaderSource) -> Result<ShaderHandle> {
        if source.vertex.trim().is_empty() || source.fragment.trim().is_empty() {
            return Err(AssetError::upload(&source.name, "missing shader stage"));
        }
        self.shaders += 1;
        Ok(ShaderHandle(self.next()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_uploader() {
        let mut uploader = HeadlessUploader::new();
        let mut mesh = MeshData::new("quad");
        assert!(matches!(
            uploader.upload_mesh(&mesh),
            Err(AssetError::Upload { .. })
        ));

        mesh.positions.push([0.0; 3]);
        let first = uploader.upload_mesh(&mesh).unwrap();
        let second = uploader.upload_mesh(&mesh).unwrap();
        assert_ne!(first, second);
        assert_eq!(uploader.meshes, 2);

        let shader = ShaderSource {
            name: "flat".into(),
            vertex: "void main() {}".into(),
            fragment: String::new(),
        };
        assert!(uploader.compile_shader(&shader).is_err());
        assert_eq!(uploader.shaders, 0);
    }
}
