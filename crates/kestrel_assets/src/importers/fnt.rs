//! Bitmap font importer
//!
//! Reads the text variant of the AngelCode BMFont format. The atlas image
//! is expected next to the `.fnt` file with a `.png` extension, and both are
//! returned together as a single font atlas record.

use super::{asset_name, png, read_to_string, Importer};
use crate::data::{AssetData, GlyphData, GlyphMap};
use crate::error::{AssetError, Result};
use std::path::Path;

/// Imports `.fnt` glyph metrics and their `.png` atlas
#[derive(Clone, Copy, Debug, Default)]
pub struct FntImporter;

impl Importer for FntImporter {
    fn load(&self, path: &Path) -> Result<Vec<AssetData>> {
        let name = asset_name(path);
        let text = read_to_string(path)?;
        let glyphs = parse(&text, name.clone())
            .map_err(|detail| AssetError::parse(path.display().to_string(), detail))?;
        let image = png::decode(&path.with_extension("png"), name)?;
        Ok(vec![AssetData::FontAtlas(glyphs, image)])
    }

    fn supported_extensions(&self) -> &[&str] {
        &["fnt"]
    }

    fn name(&self) -> &'static str {
        "fnt"
    }
}

/// Iterate the `key=value` pairs of one line, skipping the leading tag
fn fields(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split_whitespace().skip(1).filter_map(|f| f.split_once('='))
}

fn field<T: std::str::FromStr>(line: &str, key: &str) -> std::result::Result<T, String> {
    let (_, value) = fields(line)
        .find(|(k, _)| *k == key)
        .ok_or_else(|| format!("missing {key}"))?;
    value
        .trim_matches('"')
        .parse()
        .map_err(|_| format!("invalid {key}={value}"))
}

fn parse(text: &str, name: String) -> std::result::Result<GlyphMap, String> {
    let mut map = GlyphMap {
        name,
        ..Default::default()
    };
    let mut have_common = false;

    for line in text.lines() {
        match line.split_whitespace().next() {
            Some("common") => {
                map.line_height = field(line, "lineHeight")?;
                map.width = field(line, "scaleW")?;
                map.height = field(line, "scaleH")?;
                have_common = true;
            }
            Some("char") => {
                let id: u32 = field(line, "id")?;
                let ch = char::from_u32(id).ok_or_else(|| format!("invalid char id={id}"))?;
                map.glyphs.push(GlyphData {
                    ch,
                    x: field(line, "x")?,
                    y: field(line, "y")?,
                    width: field(line, "width")?,
                    height: field(line, "height")?,
                    x_offset: field(line, "xoffset")?,
                    y_offset: field(line, "yoffset")?,
                    x_advance: field(line, "xadvance")?,
                });
            }
            _ => {}
        }
    }

    if !have_common {
        return Err("missing common line".into());
    }
    Ok(map)
}
