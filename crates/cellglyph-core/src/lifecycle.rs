// Renderer lifecycle: Uninitialized → Ready ⇄ Drawing → Released.

use std::fmt;

use crate::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererState {
    #[default]
    Uninitialized,
    Ready,
    Drawing,
    /// Terminal. Every operation fails from here on.
    Released,
}

impl fmt::Display for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RendererState::Uninitialized => "uninitialized",
            RendererState::Ready => "ready",
            RendererState::Drawing => "drawing",
            RendererState::Released => "released",
        };
        f.write_str(name)
    }
}

/// Every orchestrator entry point, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    BeginFrame,
    Clear,
    SubmitBatch,
    EndFrame,
    UploadRegion,
    ReadBack,
    Release,
}

impl Operation {
    fn allowed_from(self, state: RendererState) -> bool {
        use RendererState::*;
        match self {
            Operation::Initialize => state == Uninitialized,
            Operation::BeginFrame => state == Ready,
            Operation::Clear | Operation::SubmitBatch | Operation::EndFrame => state == Drawing,
            Operation::UploadRegion | Operation::ReadBack => matches!(state, Ready | Drawing),
            Operation::Release => state != Released,
        }
    }

    fn next_state(self, state: RendererState) -> RendererState {
        match self {
            Operation::Initialize | Operation::EndFrame => RendererState::Ready,
            Operation::BeginFrame => RendererState::Drawing,
            Operation::Release => RendererState::Released,
            Operation::Clear
            | Operation::SubmitBatch
            | Operation::UploadRegion
            | Operation::ReadBack => state,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Initialize => "initialize",
            Operation::BeginFrame => "begin a frame",
            Operation::Clear => "clear the target",
            Operation::SubmitBatch => "submit a batch",
            Operation::EndFrame => "end a frame",
            Operation::UploadRegion => "upload an atlas region",
            Operation::ReadBack => "read back GPU data",
            Operation::Release => "release",
        };
        f.write_str(name)
    }
}

/// Tracks the renderer state and rejects out-of-order calls.
///
/// Fallible operations call [`Lifecycle::check`] first and [`Lifecycle::complete`]
/// only once their GPU work succeeded, so a failed `initialize` stays
/// `Uninitialized`.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: RendererState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn check(&self, operation: Operation) -> Result<()> {
        if operation.allowed_from(self.state) {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    pub fn complete(&mut self, operation: Operation) {
        debug_assert!(operation.allowed_from(self.state));
        let next = operation.next_state(self.state);
        if next != self.state {
            log::trace!("renderer state {} -> {}", self.state, next);
        }
        self.state = next;
    }

    /// `check` and `complete` in one step.
    #[cfg(test)]
    fn advance(&mut self, operation: Operation) -> Result<()> {
        self.check(operation)?;
        self.complete(operation);
        Ok(())
    }
}
