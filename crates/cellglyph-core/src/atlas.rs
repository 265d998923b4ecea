// Atlas region bookkeeping shared by the renderer and atlas producers.

use std::borrow::Cow;

use crate::error::{RenderError, Result};
use crate::instance::AtlasRegion;

/// Pixel rectangle inside the square atlas surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fails with `OutOfBounds` unless the rectangle lies inside a
    /// `dimension`×`dimension` surface.
    pub fn check_within(&self, dimension: u32) -> Result<()> {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        if right > dimension as u64 || bottom > dimension as u64 {
            return Err(RenderError::OutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                dimension,
            });
        }
        Ok(())
    }

    pub fn uv(&self, dimension: u32) -> AtlasRegion {
        AtlasRegion::from_pixels(self.x, self.y, self.width, self.height, dimension)
    }
}

/// Byte order of a tightly packed glyph bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Validate a bitmap's length and bring it into the atlas' RGBA8 layout.
///
/// RGB input gets an opaque alpha channel; RGBA input is borrowed as is.
pub fn normalize_pixels<'a>(
    pixels: &'a [u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<Cow<'a, [u8]>> {
    let expected = width as usize * height as usize * format.bytes_per_pixel();
    if pixels.len() != expected {
        return Err(RenderError::PixelDataLength {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(match format {
        PixelFormat::Rgba => Cow::Borrowed(pixels),
        PixelFormat::Rgb => Cow::Owned(
            pixels
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                .collect(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_touching_the_edge_fits() {
        let corner = AtlasRect::new(1009, 1000, 15, 24);
        corner.check_within(1024).unwrap();
        let whole = AtlasRect::new(0, 0, 1024, 1024);
        whole.check_within(1024).unwrap();
    }

    #[test]
    fn rect_past_the_edge_is_out_of_bounds() {
        let rect = AtlasRect::new(1010, 0, 15, 24);
        let err = rect.check_within(1024).unwrap_err();
        assert!(matches!(
            err,
            RenderError::OutOfBounds {
                x: 1010,
                width: 15,
                dimension: 1024,
                ..
            }
        ));
        let below = AtlasRect::new(0, 1001, 15, 24);
        assert!(below.check_within(1024).is_err());
    }

    #[test]
    fn huge_coordinates_do_not_overflow() {
        let rect = AtlasRect::new(u32::MAX, 0, 2, 1);
        assert!(rect.check_within(1024).is_err());
    }

    #[test]
    fn rgb_is_expanded_with_opaque_alpha() {
        let rgb = [10, 20, 30, 40, 50, 60];
        let rgba = normalize_pixels(&rgb, 2, 1, PixelFormat::Rgb).unwrap();
        assert_eq!(&rgba[..], &[10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn rgba_is_borrowed() {
        let rgba = [1u8; 16];
        let normalized = normalize_pixels(&rgba, 2, 2, PixelFormat::Rgba).unwrap();
        assert!(matches!(normalized, Cow::Borrowed(_)));
    }

    #[test]
    fn length_mismatch_is_reported() {
        let err = normalize_pixels(&[0; 10], 2, 2, PixelFormat::Rgb).unwrap_err();
        assert!(matches!(
            err,
            RenderError::PixelDataLength {
                expected: 12,
                actual: 10
            }
        ));
    }

    #[test]
    fn uv_of_rect() {
        let region = AtlasRect::new(512, 256, 15, 24).uv(1024);
        assert_eq!(region.uv_left, 0.5);
        assert_eq!(region.uv_bot, 0.25);
    }
}
