//! Bitmap fonts
//!
//! A font maps characters to rectangles of a single atlas texture. Text is
//! drawn by typesetting it into a mesh of one quad per visible glyph. See
//! <http://www.angelcode.com/products/bmfont/doc/file_format.html>

use crate::data::{GlyphData, GlyphMap, MeshData};
use rustc_hash::FxHashMap;

/// A glyph plus its precomputed atlas texture coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub data: GlyphData,
    /// Lower left, lower right, upper right, upper left as u,v pairs
    pub uvs: [f32; 8],
}

/// Glyph metrics for one bitmap font
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    name: String,
    width: u32,
    height: u32,
    line_height: u32,
    glyphs: FxHashMap<char, Glyph>,
}

/// Output of [`Font::typeset`]
#[derive(Clone, Debug, PartialEq)]
pub struct Typeset {
    /// One quad per visible glyph
    pub mesh: MeshData,
    /// Widest line in pixels
    pub width: u32,
    /// Total height in pixels
    pub height: u32,
}

impl Font {
    /// Build a font from imported glyph metrics
    pub fn from_glyphs(map: GlyphMap) -> Self {
        let (w, h) = (map.width.max(1) as f32, map.height.max(1) as f32);
        let glyphs = map
            .glyphs
            .into_iter()
            .map(|g| {
                let (x0, y0) = (g.x as f32 / w, g.y as f32 / h);
                let (x1, y1) = ((g.x + g.width) as f32 / w, (g.y + g.height) as f32 / h);
                let uvs = [x0, y1, x1, y1, x1, y0, x0, y0];
                (g.ch, Glyph { data: g, uvs })
            })
            .collect();
        Self {
            name: map.name,
            width: map.width,
            height: map.height,
            line_height: map.line_height,
            glyphs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Atlas size in pixels
    pub fn atlas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// Lay out `text` as textured quads
    ///
    /// Lines break on `'\n'` and, when `wrap` is non-zero, before any glyph
    /// that would push the pen past `wrap` pixels. Characters missing from
    /// the font are skipped. Quads for spaces and other empty glyphs are
    /// omitted but still advance the pen.
    pub fn typeset(&self, mesh_name: &str, text: &str, wrap: u32) -> Typeset {
        let mut mesh = MeshData::new(mesh_name);
        let mut pen_x: i32 = 0;
        let mut line: u32 = 0;
        let mut widest: i32 = 0;

        for ch in text.chars() {
            if ch == '\n' {
                widest = widest.max(pen_x);
                pen_x = 0;
                line += 1;
                continue;
            }
            let Some(glyph) = self.glyphs.get(&ch) else {
                continue;
            };
            let g = &glyph.data;
            if wrap > 0 && pen_x > 0 && pen_x + g.x_advance > wrap as i32 {
                widest = widest.max(pen_x);
                pen_x = 0;
                line += 1;
            }

            if g.width != 0 && g.height != 0 {
                let left = (pen_x + g.x_offset) as f32;
                let right = left + g.width as f32;
                let top = (line * self.line_height) as f32 + g.y_offset as f32;
                let bottom = top + g.height as f32;

                let base = mesh.positions.len() as u32;
                mesh.positions.extend_from_slice(&[
                    [left, top, 0.0],
                    [right, top, 0.0],
                    [right, bottom, 0.0],
                    [left, bottom, 0.0],
                ]);
                mesh.uvs.extend(glyph.uvs.chunks_exact(2).map(|uv| [uv[0], uv[1]]));
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 3, base + 1, base + 2, base + 3]);
            }
            pen_x += g.x_advance;
        }

        let width = widest.max(pen_x).max(0) as u32;
        let height = if text.is_empty() {
            0
        } else {
            (line + 1) * self.line_height
        };
        Typeset {
            mesh,
            width,
            height,
        }
    }
}
