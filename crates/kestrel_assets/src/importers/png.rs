//! PNG texture importer

use super::{asset_name, Importer};
use crate::data::{AssetData, ImageData};
use crate::error::{AssetError, Result};
use std::path::Path;

/// Imports `.png` files as RGBA8 images
#[derive(Clone, Copy, Debug, Default)]
pub struct PngImporter;

impl Importer for PngImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        Ok(vec![AssetData::Image(decode(path, asset_name(path))?)])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["png"]
    }

    fn name(&self) -> &'static str {
        "png"
    }
}

/// Decode an image file into RGBA8 pixels
pub(crate) fn decode(path: &Path, name: String) -> Result<ImageData> {
    let file = path.display().to_string();
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => AssetError::io(file.clone(), io),
        other => AssetError::Image {
            file: file.clone(),
            source: other,
        },
    })?;

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        name,
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(1, 1, image::Rgba([255, 0, 0, 128]));
        img.save(&path).unwrap();

        let records = PngImporter.load(&path).unwrap();
        let AssetData::Image(data) = &records[0] else {
            panic!("expected image data");
        };
        assert_eq!(data.name, "checker");
        assert_eq!((data.width, data.height), (2, 2));
        assert_eq!(data.pixels.len(), 16);
        assert_eq!(&data.pixels[12..16], &[255, 0, 0, 128]);
        assert!(!data.is_opaque());
    }

    #[test]
    fn test_png_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            PngImporter.load(&path),
            Err(AssetError::Image { .. })
        ));
    }
}
