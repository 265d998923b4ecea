// cellglyph: render a block of text through the instanced grid renderer,
// offscreen, and write the result as a PNG.
//
// Usage: cellglyph [settings.json]

mod content;
mod font;
mod glyph_cache;
mod packer;
mod settings;

use std::path::PathBuf;

use anyhow::{bail, Context};
use cellglyph_core::InstanceRecord;
use cellglyph_renderer::{GridRenderer, HeadlessGpu, OffscreenTarget};

use font::{FontRasterizer, Rasterize};
use glyph_cache::{AtlasLoader, GlyphCache};
use packer::RowPacker;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings_arg = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = settings::load_settings(settings_arg.as_deref());

    let gpu = HeadlessGpu::new().context("acquiring a GPU device")?;

    let viewport = settings.viewport;
    if viewport.width < 1.0 || viewport.height < 1.0 {
        bail!("viewport {}x{} is empty", viewport.width, viewport.height);
    }
    let target = OffscreenTarget::new(
        &gpu.device,
        viewport.width as u32,
        viewport.height as u32,
    );

    let mut renderer = GridRenderer::new(
        gpu.device.clone(),
        gpu.queue.clone(),
        OffscreenTarget::FORMAT,
        settings.renderer.clone(),
    );
    renderer.initialize().context("initializing the renderer")?;
    log::debug!(
        "foreground {:?} on {:?}",
        settings.foreground(),
        settings.background()
    );

    // ── Glyphs ──
    let mut rasterizer = FontRasterizer::new(settings.font_size);
    let font_metrics = rasterizer.metrics();
    let cell = settings.cell.unwrap_or(font_metrics.cell);
    let cols = (viewport.width / cell.width) as usize;
    let rows = (viewport.height / cell.height) as usize;

    let mut packer = RowPacker::new(renderer.atlas_dimension());
    let mut cache = GlyphCache::new(font_metrics);
    let placements = {
        let mut loader = AtlasLoader {
            renderer: &mut renderer,
            packer: &mut packer,
        };
        content::place_text(&settings.text, cols, rows, |character| {
            cache.get(character, &mut rasterizer, &mut loader)
        })?
    };
    log::info!(
        "{} glyphs placed on a {}x{} grid, {} distinct in the atlas",
        placements.len(),
        cols,
        rows,
        cache.len()
    );

    let instances: Vec<InstanceRecord> = placements.into_iter().map(Into::into).collect();

    // ── Frame ──
    renderer.begin_frame(viewport, cell)?;
    renderer.clear(&target.view)?;
    renderer.draw(&target.view, &instances)?;
    renderer.end_frame()?;
    log::info!(
        "frame drawn with {} instanced calls",
        renderer.stats().draw_calls.len()
    );

    // ── Output ──
    let pixels = target
        .read_pixels(&gpu.device, &gpu.queue)
        .context("reading back the frame")?;
    let (width, height) = (target.texture.width(), target.texture.height());
    let image = image::RgbaImage::from_raw(width, height, pixels)
        .context("frame has an unexpected size")?;
    image
        .save(&settings.output)
        .with_context(|| format!("writing {}", settings.output.display()))?;
    log::info!("wrote {}", settings.output.display());

    renderer.release()?;
    Ok(())
}
