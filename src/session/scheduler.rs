/// Kind of redraw waiting for the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    /// Intermediate frame (drag in progress); subscribers are not told.
    Preview,
    /// Frame reflecting committed state; subscribers are notified once it is drawn.
    Committed,
}

/// Frame-gated dirty flag.
///
/// Mutators call [`FrameScheduler::request`]; any number of requests between two frames collapse
/// into one pending redraw. A pending commit is never downgraded by a later preview request.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    pending: Option<Redraw>,
    requests: u64,
    frames: u64,
}

impl FrameScheduler {
    /// Nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a redraw as needed.
    pub fn request(&mut self, kind: Redraw) {
        self.requests += 1;
        self.pending = self.pending.max(Some(kind));
    }

    /// The redraw waiting for the next frame, if any.
    pub fn pending(&self) -> Option<Redraw> {
        self.pending
    }

    /// Clear the pending redraw after a frame consumed it.
    pub fn complete(&mut self) {
        self.pending = None;
        self.frames += 1;
    }

    /// Drop the pending redraw without counting a frame.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Redraw requests seen so far.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Frames that actually redrew.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;
