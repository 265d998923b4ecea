//! Renderer error types.

use thiserror::Error;

use crate::lifecycle::{Operation, RendererState};

#[derive(Debug, Error)]
pub enum RenderError {
    /// A GPU buffer, texture or program could not be created.
    #[error("failed to allocate {resource}: {reason}")]
    ResourceAllocation {
        resource: &'static str,
        reason: String,
    },

    /// The batch does not fit into the instance buffer; split it and resubmit.
    #[error("batch of {requested} instances exceeds the buffer capacity of {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("atlas region ({x}, {y}) {width}x{height} exceeds the {dimension}x{dimension} atlas")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        dimension: u32,
    },

    #[error("cannot {operation} while the renderer is {state}")]
    InvalidState {
        operation: Operation,
        state: RendererState,
    },

    /// Compiler diagnostics, passed through untouched.
    #[error("shader compilation failed:\n{0}")]
    ShaderCompilation(String),

    #[error("pixel block is {actual} bytes, expected {expected}")]
    PixelDataLength { expected: usize, actual: usize },

    #[error("GPU read-back failed: {0}")]
    Readback(String),
}

impl RenderError {
    /// Whether the caller can retry after adjusting its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RenderError::CapacityExceeded { .. }
                | RenderError::OutOfBounds { .. }
                | RenderError::PixelDataLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
