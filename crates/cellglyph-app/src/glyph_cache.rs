// Character → atlas glyph cache. Each character is rasterized and loaded once.

use std::collections::HashMap;

use anyhow::Context;
use cellglyph_core::{AtlasRegion, GlyphMetrics};
use cellglyph_renderer::GridRenderer;
use unicode_width::UnicodeWidthChar;

use crate::font::{FontMetrics, Rasterize, RasterizedGlyph};
use crate::packer::RowPacker;

/// A glyph resident in the atlas, ready to be placed in a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasGlyph {
    pub region: AtlasRegion,
    pub metrics: GlyphMetrics,
}

/// Something that can store a rasterized glyph and say where it went.
pub trait LoadGlyph {
    fn load_glyph(&mut self, glyph: &RasterizedGlyph) -> anyhow::Result<AtlasGlyph>;
}

/// Loads into the renderer's atlas at rectangles handed out by a [`RowPacker`].
pub struct AtlasLoader<'a> {
    pub renderer: &'a mut GridRenderer,
    pub packer: &'a mut RowPacker,
}

impl LoadGlyph for AtlasLoader<'_> {
    fn load_glyph(&mut self, glyph: &RasterizedGlyph) -> anyhow::Result<AtlasGlyph> {
        let rect = self.packer.allocate(glyph.width, glyph.height)?;
        self.renderer
            .upload_glyph(rect, &glyph.pixels, glyph.format)
            .with_context(|| format!("uploading glyph {:?}", glyph.character))?;

        Ok(AtlasGlyph {
            region: rect.uv(self.packer.dimension()),
            metrics: GlyphMetrics {
                left: glyph.left,
                top: glyph.top,
                width: glyph.width as i32,
                height: glyph.height as i32,
            },
        })
    }
}

pub struct GlyphCache {
    cache: HashMap<char, Option<AtlasGlyph>>,
    metrics: FontMetrics,
}

impl GlyphCache {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            cache: HashMap::new(),
            metrics,
        }
    }

    /// Look up `character`, rasterizing and loading it on first use.
    /// `None` means the character draws nothing.
    pub fn get<R, L>(
        &mut self,
        character: char,
        rasterizer: &mut R,
        loader: &mut L,
    ) -> anyhow::Result<Option<AtlasGlyph>>
    where
        R: Rasterize + ?Sized,
        L: LoadGlyph + ?Sized,
    {
        if let Some(glyph) = self.cache.get(&character) {
            return Ok(*glyph);
        }

        let glyph = match rasterizer.rasterize(character) {
            Some(mut glyph) => {
                self.adjust(&mut glyph);
                Some(loader.load_glyph(&glyph)?)
            }
            None => None,
        };
        self.cache.insert(character, glyph);
        Ok(glyph)
    }

    /// Make `top` relative to the cell's bottom edge instead of the baseline.
    fn adjust(&self, glyph: &mut RasterizedGlyph) {
        glyph.top += self.metrics.descent.round() as i32;

        // Zero-width characters are rasterized as if anchored after the
        // preceding cell; they are drawn inside it, so shift them one cell right.
        if glyph.character.width() == Some(0) {
            glyph.left += self.metrics.average_advance.round() as i32;
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}
