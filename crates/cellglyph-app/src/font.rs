use cellglyph_core::{PixelFormat, Size};
use cosmic_text::{
    Attrs, Buffer as CosmicBuffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent,
};

/// A glyph bitmap plus its placement relative to the pen position on the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    pub character: char,
    pub width: u32,
    pub height: u32,
    /// Horizontal bearing.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top row.
    pub top: i32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Cell metrics of the monospace face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub cell: Size,
    /// Distance from the baseline down to the cell's bottom edge.
    pub descent: f32,
    pub average_advance: f32,
}

pub trait Rasterize {
    fn metrics(&self) -> FontMetrics;

    /// `None` for characters without a visible bitmap (spaces, missing glyphs).
    fn rasterize(&mut self, character: char) -> Option<RasterizedGlyph>;
}

pub struct FontRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    metrics: Metrics,
    font_metrics: FontMetrics,
}

impl FontRasterizer {
    pub fn new(font_size: f32) -> Self {
        let mut font_system = FontSystem::new();
        let line_height = (font_size * 1.2).ceil();
        let metrics = Metrics::new(font_size, line_height);
        let font_metrics = Self::measure(&mut font_system, metrics);
        log::debug!(
            "font {}px: cell {}x{}, descent {}",
            font_size,
            font_metrics.cell.width,
            font_metrics.cell.height,
            font_metrics.descent
        );

        Self {
            font_system,
            swash_cache: SwashCache::new(),
            metrics,
            font_metrics,
        }
    }

    fn shape(font_system: &mut FontSystem, metrics: Metrics, text: &str) -> CosmicBuffer {
        let mut buffer = CosmicBuffer::new(font_system, metrics);
        buffer.set_text(
            font_system,
            text,
            Attrs::new().family(Family::Monospace),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(font_system, false);
        buffer
    }

    fn measure(font_system: &mut FontSystem, metrics: Metrics) -> FontMetrics {
        let buffer = Self::shape(font_system, metrics, "M");
        let run = buffer.layout_runs().next();

        let advance = run
            .as_ref()
            .and_then(|run| run.glyphs.first())
            .map(|g| g.w)
            .unwrap_or(metrics.font_size * 0.6);
        // Baseline at 80% of the line when the layout gives nothing better.
        let baseline = run
            .map(|run| run.line_y - run.line_top)
            .unwrap_or(metrics.line_height * 0.8);

        FontMetrics {
            cell: Size::new(advance.ceil(), metrics.line_height),
            descent: (metrics.line_height - baseline).max(0.0),
            average_advance: advance,
        }
    }
}

impl Rasterize for FontRasterizer {
    fn metrics(&self) -> FontMetrics {
        self.font_metrics
    }

    fn rasterize(&mut self, character: char) -> Option<RasterizedGlyph> {
        let text = character.to_string();
        let buffer = Self::shape(&mut self.font_system, self.metrics, &text);
        let run = buffer.layout_runs().next()?;
        let glyph = run.glyphs.first()?;

        let physical = glyph.physical((0.0, 0.0), 1.0);
        let image = self
            .swash_cache
            .get_image(&mut self.font_system, physical.cache_key)
            .as_ref()?;

        let width = image.placement.width;
        let height = image.placement.height;
        if width == 0 || height == 0 {
            return None;
        }

        // The atlas stores per-channel coverage; grayscale masks fill all three.
        let pixels: Vec<u8> = match image.content {
            SwashContent::Mask => image.data.iter().flat_map(|&a| [a, a, a]).collect(),
            SwashContent::SubpixelMask => {
                let stride = image.data.len() / (width as usize * height as usize);
                if stride < 3 {
                    return None;
                }
                image
                    .data
                    .chunks_exact(stride)
                    .flat_map(|c| [c[0], c[1], c[2]])
                    .collect()
            }
            // Instances carry no color, so emoji draw as their alpha in the foreground.
            SwashContent::Color => image
                .data
                .chunks_exact(4)
                .flat_map(|c| [c[3], c[3], c[3]])
                .collect(),
        };

        Some(RasterizedGlyph {
            character,
            width,
            height,
            left: image.placement.left,
            top: image.placement.top,
            format: PixelFormat::Rgb,
            pixels,
        })
    }
}
