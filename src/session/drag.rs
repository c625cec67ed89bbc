use crate::foundation::core::{Point, Position, Vec2};
use crate::model::Tiling;

/// On-screen bounds of the displayed surface, in pointer coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
}

impl SurfaceRect {
    /// Rect with its top-left corner at `(left, top)`.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// `true` when the rect has a positive, finite area.
    pub fn is_usable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Unclamped percent coordinates of `p` relative to this rect.
    pub fn percent_of(&self, p: Point) -> Vec2 {
        Vec2::new(
            (p.x - self.left) / self.width * 100.0,
            (p.y - self.top) / self.height * 100.0,
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        rect: SurfaceRect,
        origin: Vec2,
        base: Position,
        live: Option<Position>,
    },
}

/// What ended a drag and what it left behind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragRelease {
    /// Last proposed position, `None` if the pointer never moved.
    pub live: Option<Position>,
}

/// Two-state pointer drag machine (`Idle` <-> `Dragging`).
///
/// Pointer handlers are pure arithmetic; they never render. The display rect is captured once at
/// pointer-down and reused for every move of that drag.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// Idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a drag is active.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Proposed position of the active drag, if the pointer has moved.
    pub fn live(&self) -> Option<Position> {
        match self.state {
            DragState::Dragging { live, .. } => live,
            DragState::Idle => None,
        }
    }

    /// Start a drag. Returns `false` (and stays idle) when tiling is on, the rect is unusable, or
    /// a drag is already active.
    pub fn pointer_down(
        &mut self,
        point: Point,
        rect: SurfaceRect,
        committed: Position,
        tiling: Tiling,
    ) -> bool {
        if tiling == Tiling::On || !rect.is_usable() || self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            rect,
            origin: rect.percent_of(point),
            base: committed,
            live: None,
        };
        true
    }

    /// Propose `clamp(base + delta)`; returns the new live position while dragging.
    pub fn pointer_move(&mut self, point: Point) -> Option<Position> {
        let DragState::Dragging {
            rect,
            origin,
            base,
            live,
        } = &mut self.state
        else {
            return None;
        };
        let delta = rect.percent_of(point) - *origin;
        let next = base.offset(delta);
        *live = Some(next);
        Some(next)
    }

    /// End the drag (pointer up or leave). Returns `None` if no drag was active.
    pub fn release(&mut self) -> Option<DragRelease> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging { live, .. } => Some(DragRelease { live }),
        }
    }

    /// Abort the drag without committing anything.
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(&mut self.state), DragState::Dragging { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/drag.rs"]
mod tests;
