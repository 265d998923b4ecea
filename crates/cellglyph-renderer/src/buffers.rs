// Geometry shared by all glyphs (one quad's indices) and the per-instance buffer.

use cellglyph_core::{
    check_capacity, InstanceRecord, RenderError, Result, INSTANCE_RECORD_SIZE, QUAD_INDICES,
};
use wgpu::util::DeviceExt;

use crate::error_scope;

/// Six indices describing the unit quad; the vertex stage derives the corner
/// from the index, so no vertex buffer backs it.
#[derive(Debug)]
pub struct QuadIndexBuffer(wgpu::Buffer);

impl QuadIndexBuffer {
    pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;
    pub const INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;

    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let buffer = error_scope::allocation(device, "quad index buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad_index_buffer"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;
        Ok(Self(buffer))
    }

    pub fn set(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_index_buffer(self.0.slice(..), Self::INDEX_FORMAT);
    }

    pub(crate) fn destroy(&self) {
        self.0.destroy();
    }
}

/// Fixed-capacity GPU storage for one batch of [`InstanceRecord`]s.
#[derive(Debug)]
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Result<Self> {
        let size = (capacity as u64).checked_mul(INSTANCE_RECORD_SIZE as u64);
        let max_size = device.limits().max_buffer_size;
        let size = match size {
            Some(size) if capacity > 0 && size <= max_size => size,
            _ => {
                return Err(RenderError::ResourceAllocation {
                    resource: "instance buffer",
                    reason: format!(
                        "{capacity} instances do not fit the device's {max_size} byte buffer limit"
                    ),
                })
            }
        };

        let buffer = error_scope::allocation(device, "instance buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("instance_buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        })?;

        log::debug!("allocated instance buffer for {capacity} instances ({size} bytes)");

        Ok(Self { buffer, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replace the buffer contents with `records`.
    ///
    /// Fails with `CapacityExceeded` without touching the GPU data when the
    /// batch is larger than the buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue, records: &[InstanceRecord]) -> Result<()> {
        self.upload_at(queue, 0, records)
    }

    /// Overwrite the records starting at index `first`, leaving the rest in place.
    pub fn upload_at(
        &mut self,
        queue: &wgpu::Queue,
        first: usize,
        records: &[InstanceRecord],
    ) -> Result<()> {
        check_capacity(first, records.len(), self.capacity)?;
        if records.is_empty() {
            return Ok(());
        }

        let offset = (first * INSTANCE_RECORD_SIZE) as wgpu::BufferAddress;
        let bytes = InstanceRecord::as_bytes(records);
        queue.write_buffer(&self.buffer, offset, bytes);
        Ok(())
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn size(&self) -> wgpu::BufferAddress {
        self.buffer.size()
    }

    pub(crate) fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Everything the instanced draw reads geometry from.
#[derive(Debug)]
pub struct GlyphBuffers {
    pub quad: QuadIndexBuffer,
    pub instances: InstanceBuffer,
}

impl GlyphBuffers {
    pub fn initialize(device: &wgpu::Device, max_instances: usize) -> Result<Self> {
        Ok(Self {
            quad: QuadIndexBuffer::new(device)?,
            instances: InstanceBuffer::new(device, max_instances)?,
        })
    }

    pub(crate) fn destroy(&self) {
        self.quad.destroy();
        self.instances.destroy();
    }
}
