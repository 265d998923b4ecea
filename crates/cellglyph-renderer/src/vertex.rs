// GPU-side view of the instance record and the per-frame uniform block.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use cellglyph_core::{Color, InstanceRecord, ProjectionState, INSTANCE_RECORD_SIZE};
use static_assertions::const_assert_eq;

/// How the shader reads one [`InstanceRecord`].
///
/// `step_mode: Instance` makes every attribute advance once per instance, so
/// all six vertices of the shared quad see the same record.
pub const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: INSTANCE_RECORD_SIZE as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        // grid coords: col, row
        wgpu::VertexAttribute {
            offset: InstanceRecord::GRID_COORDS_OFFSET as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Uint16x2,
        },
        // glyph box: left, top, width, height
        wgpu::VertexAttribute {
            offset: InstanceRecord::GLYPH_BOX_OFFSET as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Sint16x4,
        },
        // uv box: left, bot, width, height
        wgpu::VertexAttribute {
            offset: InstanceRecord::UV_BOX_OFFSET as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        },
    ],
};

/// Uniform block shared by every instance of a frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct TextUniforms {
    pub projection: [f32; 4],
    pub cell_dim: [f32; 2],
    _padding: [f32; 2],
    pub foreground: [f32; 4],
}

// WGSL aligns `foreground` (vec4) to 16 bytes.
const_assert_eq!(size_of::<TextUniforms>(), 48);

impl TextUniforms {
    pub fn new(projection: &ProjectionState, foreground: Color) -> Self {
        Self {
            projection: projection.projection(),
            cell_dim: projection.cell_dim,
            _padding: [0.0; 2],
            foreground: foreground.to_array(),
        }
    }
}
