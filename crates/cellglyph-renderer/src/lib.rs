// cellglyph-renderer: draws a grid of glyphs as instanced quads with wgpu.
//
// One shared quad (six indices) is drawn once per glyph; everything that
// differs between glyphs lives in a 28-byte InstanceRecord.

mod atlas;
mod buffers;
mod error_scope;
mod init;
mod shaders;
mod stats;
mod vertex;

pub mod headless;
pub mod readback;

use std::sync::Arc;

use cellglyph_core::{
    AtlasRect, InstanceRecord, Lifecycle, Operation, PixelFormat, ProjectionState, RenderError,
    RendererConfig, RendererState, Result, Size,
};

pub use atlas::GlyphAtlas;
pub use buffers::{GlyphBuffers, InstanceBuffer, QuadIndexBuffer};
pub use headless::{HeadlessGpu, OffscreenTarget, REQUIRED_FEATURES};
pub use shaders::TEXT_SHADER;
pub use stats::{DrawCall, FrameStats};
pub use vertex::{TextUniforms, INSTANCE_LAYOUT};

// ──────────────────────────────────────────────
// GridRenderer
// ──────────────────────────────────────────────

/// GPU objects created by [`GridRenderer::initialize`] and freed by
/// [`GridRenderer::release`].
struct GpuResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    atlas: GlyphAtlas,
    atlas_bind_group: wgpu::BindGroup,
    buffers: GlyphBuffers,
}

impl GpuResources {
    fn destroy(&self) {
        self.buffers.destroy();
        self.atlas.destroy();
        self.uniform_buffer.destroy();
    }
}

pub struct GridRenderer {
    lifecycle: Lifecycle,
    config: RendererConfig,
    format: wgpu::TextureFormat,
    resources: Option<GpuResources>,
    projection: Option<ProjectionState>,
    stats: FrameStats,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GridRenderer {
    pub fn state(&self) -> RendererState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Largest batch [`GridRenderer::submit_batch`] accepts.
    pub fn capacity(&self) -> usize {
        self.config.max_instances
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Projection of the open (or last) frame.
    pub fn projection(&self) -> Option<&ProjectionState> {
        self.projection.as_ref()
    }

    pub fn atlas_dimension(&self) -> u32 {
        self.config.atlas_dimension
    }

    fn resources(&self, operation: Operation) -> Result<&GpuResources> {
        self.resources.as_ref().ok_or(RenderError::InvalidState {
            operation,
            state: self.lifecycle.state(),
        })
    }

    // ── Frame ──────────────────────────────────

    /// Open a frame: derive the projection from the viewport and cell size and
    /// publish it to the shader.
    pub fn begin_frame(&mut self, viewport: Size, cell: Size) -> Result<()> {
        self.lifecycle.check(Operation::BeginFrame)?;
        let resources = self.resources(Operation::BeginFrame)?;

        let projection = ProjectionState::new(viewport, cell);
        let uniforms = TextUniforms::new(&projection, self.config.foreground);
        self.queue
            .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        log::trace!(
            "begin frame {}x{} cell {}x{}",
            viewport.width,
            viewport.height,
            cell.width,
            cell.height
        );

        self.projection = Some(projection);
        self.stats.begin_frame();
        self.lifecycle.complete(Operation::BeginFrame);
        Ok(())
    }

    /// Fill `target` with the configured clear color.
    pub fn clear(&mut self, target: &wgpu::TextureView) -> Result<()> {
        self.lifecycle.check(Operation::Clear)?;
        let c = self.config.clear_color;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.r as f64,
                            g: c.g as f64,
                            b: c.b as f64,
                            a: c.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.lifecycle.complete(Operation::Clear);
        Ok(())
    }

    /// Upload `instances` and draw them with one instanced call.
    ///
    /// A batch larger than [`GridRenderer::capacity`] fails with
    /// `CapacityExceeded` and leaves the instance buffer as it was. An empty
    /// batch issues no draw.
    pub fn submit_batch(
        &mut self,
        target: &wgpu::TextureView,
        instances: &[InstanceRecord],
    ) -> Result<()> {
        self.lifecycle.check(Operation::SubmitBatch)?;
        let Some(resources) = self.resources.as_mut() else {
            return Err(RenderError::InvalidState {
                operation: Operation::SubmitBatch,
                state: self.lifecycle.state(),
            });
        };

        debug_assert_eq!(
            resources.buffers.instances.capacity(),
            self.config.max_instances
        );
        resources.buffers.instances.upload(&self.queue, instances)?;
        if instances.is_empty() {
            self.lifecycle.complete(Operation::SubmitBatch);
            return Ok(());
        }

        let call = DrawCall {
            index_count: QuadIndexBuffer::INDEX_COUNT,
            instance_count: instances.len() as u32,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("text_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("text_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&resources.pipeline);
            pass.set_bind_group(0, &resources.uniform_bind_group, &[]);
            pass.set_bind_group(1, &resources.atlas_bind_group, &[]);
            let instance_buffer = resources.buffers.instances.buffer();
            pass.set_vertex_buffer(0, instance_buffer.slice(..));
            resources.buffers.quad.set(&mut pass);
            pass.draw_indexed(0..call.index_count, 0, 0..call.instance_count);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        log::trace!("drew {} glyph instances", call.instance_count);
        self.stats.record(call);
        self.lifecycle.complete(Operation::SubmitBatch);
        Ok(())
    }

    /// Draw any number of instances, split into capacity-sized batches.
    pub fn draw(
        &mut self,
        target: &wgpu::TextureView,
        instances: &[InstanceRecord],
    ) -> Result<()> {
        self.lifecycle.check(Operation::SubmitBatch)?;
        for batch in instances.chunks(self.capacity().max(1)) {
            self.submit_batch(target, batch)?;
        }
        Ok(())
    }

    pub fn end_frame(&mut self) -> Result<()> {
        self.lifecycle.check(Operation::EndFrame)?;
        log::trace!(
            "end frame {}: {} draws, {} instances",
            self.stats.frames,
            self.stats.draw_calls.len(),
            self.stats.instances()
        );
        self.lifecycle.complete(Operation::EndFrame);
        Ok(())
    }

    // ── Atlas ──────────────────────────────────

    /// Write one glyph bitmap into the atlas at `rect`.
    pub fn upload_glyph(
        &mut self,
        rect: AtlasRect,
        pixels: &[u8],
        format: PixelFormat,
    ) -> Result<()> {
        self.lifecycle.check(Operation::UploadRegion)?;
        let resources = self.resources(Operation::UploadRegion)?;
        resources
            .atlas
            .upload_region(&self.queue, rect, pixels, format)?;
        self.lifecycle.complete(Operation::UploadRegion);
        Ok(())
    }

    // ── Diagnostics ────────────────────────────

    /// The whole atlas surface, row-major RGBA8.
    pub fn atlas_pixels(&mut self) -> Result<Vec<u8>> {
        self.lifecycle.check(Operation::ReadBack)?;
        let resources = self.resources(Operation::ReadBack)?;
        let pixels = resources.atlas.read_back(&self.device, &self.queue)?;
        self.lifecycle.complete(Operation::ReadBack);
        Ok(pixels)
    }

    /// Raw contents of the instance buffer, all `capacity` records.
    pub fn instance_bytes(&mut self) -> Result<Vec<u8>> {
        self.lifecycle.check(Operation::ReadBack)?;
        let resources = self.resources(Operation::ReadBack)?;
        let instances = &resources.buffers.instances;
        let bytes = readback::read_buffer(
            &self.device,
            &self.queue,
            instances.buffer(),
            instances.size(),
        )?;
        self.lifecycle.complete(Operation::ReadBack);
        Ok(bytes)
    }

    // ── Teardown ───────────────────────────────

    /// Free every GPU resource. The renderer is unusable afterwards.
    pub fn release(&mut self) -> Result<()> {
        self.lifecycle.check(Operation::Release)?;
        if let Some(resources) = self.resources.take() {
            resources.destroy();
        }
        self.projection = None;
        log::debug!("grid renderer released");
        self.lifecycle.complete(Operation::Release);
        Ok(())
    }
}
