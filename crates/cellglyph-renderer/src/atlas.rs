// Glyph atlas: one square RGBA8 texture written a sub-rectangle at a time.
//
// Which rectangle a glyph gets is the producer's business; the atlas only
// checks bounds and never grows, shrinks or evicts.

use cellglyph_core::{normalize_pixels, AtlasRect, PixelFormat, RenderError, Result};

use crate::{error_scope, readback};

pub struct GlyphAtlas {
    texture: wgpu::Texture,
    texture_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    dimension: u32,
}

impl GlyphAtlas {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
    const BYTES_PER_PIXEL: u32 = 4;

    pub fn new(device: &wgpu::Device, dimension: u32) -> Result<Self> {
        let max_dimension = device.limits().max_texture_dimension_2d;
        if dimension == 0 || dimension > max_dimension {
            return Err(RenderError::ResourceAllocation {
                resource: "glyph atlas",
                reason: format!(
                    "dimension {dimension} outside the supported range 1..={max_dimension}"
                ),
            });
        }

        let texture = error_scope::allocation(device, "glyph atlas", || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("glyph_atlas"),
                size: wgpu::Extent3d {
                    width: dimension,
                    height: dimension,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        })?;
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Clamp so glyph edges never pick up a neighbour through wrapping;
        // linear to smooth sub-pixel positioned edges.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!("created {dimension}x{dimension} glyph atlas");

        Ok(Self {
            texture,
            texture_view,
            sampler,
            dimension,
        })
    }

    /// Write a tightly packed bitmap into `rect`. Pixels outside `rect` are untouched.
    pub fn upload_region(
        &self,
        queue: &wgpu::Queue,
        rect: AtlasRect,
        pixels: &[u8],
        format: PixelFormat,
    ) -> Result<()> {
        rect.check_within(self.dimension)?;
        let rgba = normalize_pixels(pixels, rect.width, rect.height, format)?;
        if rect.is_empty() {
            return Ok(());
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.x,
                    y: rect.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(rect.width * Self::BYTES_PER_PIXEL),
                rows_per_image: Some(rect.height),
            },
            wgpu::Extent3d {
                width: rect.width,
                height: rect.height,
                depth_or_array_layers: 1,
            },
        );

        log::trace!(
            "atlas upload {}x{} at ({}, {})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Ok(())
    }

    /// The whole surface, row-major RGBA8.
    pub fn read_back(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<u8>> {
        readback::read_texture(device, queue, &self.texture)
    }

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atlas_bgl"),
            entries: &[
                // mask
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub(crate) fn destroy(&self) {
        self.texture.destroy();
    }
}
