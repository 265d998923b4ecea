// Per-glyph instance record: the 28-byte unit the GPU reads once per instance.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use crate::error::{RenderError, Result};

/// Encoded size of one [`InstanceRecord`]; also the vertex-buffer stride.
pub const INSTANCE_RECORD_SIZE: usize = 28;

/// One glyph placed in one grid cell.
///
/// Fields are laid out back to back in declaration order with the host's byte
/// order. The renderer's vertex layout reads them as three attributes:
/// grid coordinates (`u16x2` at 0), glyph box (`i16x4` at 4) and UV box
/// (`f32x4` at 12).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct InstanceRecord {
    // Grid cell.
    pub col: u16,
    pub row: u16,

    // Glyph box in pixels; `top` is measured up from the cell's bottom edge.
    pub left: i16,
    pub top: i16,
    pub width: i16,
    pub height: i16,

    // Normalized atlas region.
    pub uv_left: f32,
    pub uv_bot: f32,
    pub uv_width: f32,
    pub uv_height: f32,
}

const_assert_eq!(size_of::<InstanceRecord>(), INSTANCE_RECORD_SIZE);
const_assert_eq!(
    offset_of!(InstanceRecord, col),
    InstanceRecord::GRID_COORDS_OFFSET
);
const_assert_eq!(
    offset_of!(InstanceRecord, left),
    InstanceRecord::GLYPH_BOX_OFFSET
);
const_assert_eq!(
    offset_of!(InstanceRecord, uv_left),
    InstanceRecord::UV_BOX_OFFSET
);

impl InstanceRecord {
    pub const GRID_COORDS_OFFSET: usize = 0;
    pub const GLYPH_BOX_OFFSET: usize = 4;
    pub const UV_BOX_OFFSET: usize = 12;

    /// Serialize into the fixed layout.
    pub fn encode(&self) -> [u8; INSTANCE_RECORD_SIZE] {
        bytemuck::cast(*self)
    }

    pub fn decode(bytes: &[u8; INSTANCE_RECORD_SIZE]) -> Self {
        bytemuck::cast(*bytes)
    }

    /// View a batch as the bytes uploaded to the instance buffer.
    pub fn as_bytes(records: &[InstanceRecord]) -> &[u8] {
        bytemuck::cast_slice(records)
    }
}

/// Check that `len` records written from slot `first` stay inside a buffer
/// of `capacity` records.
pub fn check_capacity(first: usize, len: usize, capacity: usize) -> Result<()> {
    let requested = first.saturating_add(len);
    if requested > capacity {
        return Err(RenderError::CapacityExceeded {
            requested,
            capacity,
        });
    }
    Ok(())
}

/// Normalized rectangle of the atlas holding one glyph bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AtlasRegion {
    pub uv_left: f32,
    pub uv_bot: f32,
    pub uv_width: f32,
    pub uv_height: f32,
}

impl AtlasRegion {
    /// Region for a pixel rectangle of a square atlas.
    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32, dimension: u32) -> Self {
        let dim = dimension as f32;
        Self {
            uv_left: x as f32 / dim,
            uv_bot: y as f32 / dim,
            uv_width: width as f32 / dim,
            uv_height: height as f32 / dim,
        }
    }
}

/// Bitmap metrics of a rasterized glyph, relative to the cell baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// What an instance producer hands over for each visible glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub col: usize,
    pub row: usize,
    pub region: AtlasRegion,
    pub metrics: GlyphMetrics,
}

impl From<GlyphPlacement> for InstanceRecord {
    /// Narrowing casts wrap silently; the producer keeps values in range.
    fn from(placement: GlyphPlacement) -> Self {
        let GlyphPlacement {
            col,
            row,
            region,
            metrics,
        } = placement;

        Self {
            col: col as u16,
            row: row as u16,
            left: metrics.left as i16,
            top: metrics.top as i16,
            width: metrics.width as i16,
            height: metrics.height as i16,
            uv_left: region.uv_left,
            uv_bot: region.uv_bot,
            uv_width: region.uv_width,
            uv_height: region.uv_height,
        }
    }
}
