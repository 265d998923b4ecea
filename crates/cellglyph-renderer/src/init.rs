use std::mem::size_of;
use std::sync::Arc;

use cellglyph_core::{Lifecycle, Operation, RenderError, RendererConfig, Result};

use crate::atlas::GlyphAtlas;
use crate::buffers::GlyphBuffers;
use crate::error_scope;
use crate::headless::REQUIRED_FEATURES;
use crate::shaders::TEXT_SHADER;
use crate::stats::FrameStats;
use crate::vertex::{TextUniforms, INSTANCE_LAYOUT};
use crate::{GpuResources, GridRenderer};

/// `color * mask + dst * (1 - mask)`, per channel, using the second fragment output as mask.
const SUBPIXEL_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Src1,
        dst_factor: wgpu::BlendFactor::OneMinusSrc1,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Src1,
        dst_factor: wgpu::BlendFactor::OneMinusSrc1,
        operation: wgpu::BlendOperation::Add,
    },
};

impl GridRenderer {
    /// Create an uninitialized renderer. No GPU resources exist until
    /// [`GridRenderer::initialize`].
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        config: RendererConfig,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            config,
            format,
            resources: None,
            projection: None,
            stats: FrameStats::default(),
            device,
            queue,
        }
    }

    /// Allocate buffers, atlas and program and set the fixed pipeline state.
    ///
    /// On failure the renderer stays uninitialized; partially created
    /// resources are dropped.
    pub fn initialize(&mut self) -> Result<()> {
        self.lifecycle.check(Operation::Initialize)?;
        let device = &self.device;

        if !device.features().contains(REQUIRED_FEATURES) {
            return Err(RenderError::ResourceAllocation {
                resource: "text pipeline",
                reason: format!("device was created without {REQUIRED_FEATURES:?}"),
            });
        }

        // --- Uniform buffer ---
        let uniform_buffer = error_scope::allocation(device, "uniform buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("uniform_buffer"),
                size: size_of::<TextUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("uniform_bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bg"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // --- Glyph Atlas ---
        let atlas = GlyphAtlas::new(device, self.config.atlas_dimension)?;
        let atlas_bind_group_layout = GlyphAtlas::bind_group_layout(device);
        let atlas_bind_group = atlas.bind_group(device, &atlas_bind_group_layout);

        // --- Text pipeline ---
        let text_shader = error_scope::compilation(device, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("text_shader"),
                source: wgpu::ShaderSource::Wgsl(TEXT_SHADER.into()),
            })
        })?;

        let text_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &atlas_bind_group_layout],
            push_constant_ranges: &[],
        });

        let format = self.format;
        let pipeline = error_scope::compilation(device, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("text_pipeline"),
                layout: Some(&text_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &text_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[INSTANCE_LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &text_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(SUBPIXEL_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                // Text is never depth tested or written.
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        // --- Geometry and instance storage ---
        let buffers = GlyphBuffers::initialize(device, self.config.max_instances)?;

        log::info!(
            "grid renderer ready: {} instances per batch, {}px atlas, {:?}",
            self.config.max_instances,
            self.config.atlas_dimension,
            format
        );

        self.resources = Some(GpuResources {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            atlas,
            atlas_bind_group,
            buffers,
        });
        self.lifecycle.complete(Operation::Initialize);
        Ok(())
    }
}
