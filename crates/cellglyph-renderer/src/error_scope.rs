// Turns wgpu's asynchronous error reporting into `RenderError`s at the call site.

use cellglyph_core::{RenderError, Result};

/// Run a resource constructor and fail with `ResourceAllocation` if the device
/// reported an out-of-memory or validation error while it ran.
pub(crate) fn allocation<T>(
    device: &wgpu::Device,
    resource: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match out_of_memory.or(validation) {
        Some(err) => {
            log::error!("failed to allocate {resource}: {err}");
            Err(RenderError::ResourceAllocation {
                resource,
                reason: err.to_string(),
            })
        }
        None => Ok(value),
    }
}

/// Run a shader or pipeline constructor; validation errors surface as
/// `ShaderCompilation` with the compiler's diagnostic text unchanged.
pub(crate) fn compilation<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(wgpu::Error::Validation { description, .. }) => {
            Err(RenderError::ShaderCompilation(description))
        }
        Some(other) => Err(RenderError::ShaderCompilation(other.to_string())),
        None => Ok(value),
    }
}
