// Per-frame draw statistics.

/// One instanced draw of the shared quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub index_count: u32,
    pub instance_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Frames begun since initialization.
    pub frames: u64,
    /// Draws issued in the current (or last finished) frame, in order.
    pub draw_calls: Vec<DrawCall>,
}

impl FrameStats {
    pub(crate) fn begin_frame(&mut self) {
        self.frames += 1;
        self.draw_calls.clear();
    }

    pub(crate) fn record(&mut self, call: DrawCall) {
        self.draw_calls.push(call);
    }

    pub fn instances(&self) -> u64 {
        self.draw_calls
            .iter()
            .map(|c| c.instance_count as u64)
            .sum()
    }
}
