// Core types for the cellglyph renderer.
// Everything here is GPU-free: the renderer crate binds these to wgpu.

mod atlas;
mod config;
mod error;
mod instance;
mod lifecycle;
mod projection;

pub use atlas::{normalize_pixels, AtlasRect, PixelFormat};
pub use config::RendererConfig;
pub use error::{RenderError, Result};
pub use instance::{
    check_capacity, AtlasRegion, GlyphMetrics, GlyphPlacement, InstanceRecord,
    INSTANCE_RECORD_SIZE,
};
pub use lifecycle::{Lifecycle, Operation, RendererState};
pub use projection::{quad_corner, ProjectionState, QUAD_INDICES};

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ──────────────────────────────────────────────
// Colors
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
}
