// Row-packing allocator for the glyph atlas.
//
// Glyphs are placed left to right in rows. A row is as tall as its tallest
// glyph and becomes the base of the next row once a glyph no longer fits
// horizontally. Nothing is ever freed.

use cellglyph_core::AtlasRect;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackError {
    #[error("no room for a {width}x{height} glyph in the atlas")]
    AtlasFull { width: u32, height: u32 },
}

#[derive(Debug, Clone)]
pub struct RowPacker {
    dimension: u32,
    /// Left-most free pixel in the current row.
    row_extent: u32,
    /// Top of the current row.
    row_baseline: u32,
    /// Tallest glyph in the current row.
    row_tallest: u32,
}

impl RowPacker {
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            row_extent: 0,
            row_baseline: 0,
            row_tallest: 0,
        }
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Reserve a `width`×`height` rectangle. State is unchanged on failure.
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<AtlasRect, PackError> {
        let full = PackError::AtlasFull { width, height };
        if width > self.dimension || height > self.dimension {
            return Err(full);
        }

        let (mut x, mut y, mut tallest) = (self.row_extent, self.row_baseline, self.row_tallest);
        if x + width > self.dimension {
            x = 0;
            y += tallest;
            tallest = 0;
        }
        if y + height > self.dimension {
            return Err(full);
        }

        self.row_extent = x + width;
        self.row_baseline = y;
        self.row_tallest = tallest.max(height);
        Ok(AtlasRect::new(x, y, width, height))
    }
}
