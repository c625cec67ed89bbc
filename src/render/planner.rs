use crate::foundation::core::{Point, Position};
use crate::foundation::error::{OvermarkError, OvermarkResult};
use crate::model::Tiling;

/// Upper bound on anchors produced for one surface.
pub const MAX_ANCHORS: usize = 2000;

/// Anchor points (centers of unrotated watermark instances) for one surface.
///
/// - [`Tiling::Off`]: exactly one anchor at `position` in surface percent.
/// - [`Tiling::On`]: a grid with step `(rotated_w + spacing, rotated_h + spacing)` starting one
///   step before the origin and covering `[0, w + step_x) x [0, h + step_y)`. `position` is a
///   phase offset in percent of the step, so the grid moves periodically and never changes its
///   spacing. Output is truncated at [`MAX_ANCHORS`], row by row.
pub fn plan_anchors(
    tiling: Tiling,
    position: Position,
    surface_w: u32,
    surface_h: u32,
    rotated_w: f64,
    rotated_h: f64,
    spacing: f64,
) -> OvermarkResult<Vec<Point>> {
    let position = position.clamped();
    let (w, h) = (f64::from(surface_w), f64::from(surface_h));

    if tiling == Tiling::Off {
        return Ok(vec![Point::new(w * position.x / 100.0, h * position.y / 100.0)]);
    }

    let step_x = rotated_w + spacing;
    let step_y = rotated_h + spacing;
    if !(step_x.is_finite() && step_y.is_finite() && step_x > 0.0 && step_y > 0.0) {
        return Err(OvermarkError::precondition(format!(
            "tile step must be finite and > 0, got ({step_x}, {step_y})"
        )));
    }

    let origin_x = -step_x + (step_x * position.x / 100.0).rem_euclid(step_x);
    let origin_y = -step_y + (step_y * position.y / 100.0).rem_euclid(step_y);
    let cols = axis_count(origin_x, step_x, w + step_x);
    let rows = axis_count(origin_y, step_y, h + step_y);

    let mut anchors = Vec::with_capacity(cols.saturating_mul(rows).min(MAX_ANCHORS));
    'rows: for row in 0..rows {
        let y = origin_y + row as f64 * step_y;
        for col in 0..cols {
            if anchors.len() == MAX_ANCHORS {
                break 'rows;
            }
            anchors.push(Point::new(origin_x + col as f64 * step_x, y));
        }
    }
    Ok(anchors)
}

/// Number of `k >= 0` with `start + k * step < end`.
fn axis_count(start: f64, step: f64, end: f64) -> usize {
    if start >= end {
        return 0;
    }
    let n = ((end - start) / step).ceil();
    // Guard the float boundary so `start + (n - 1) * step < end` holds exactly as evaluated.
    let mut n = n.min(MAX_ANCHORS as f64 + 1.0) as usize;
    while n > 0 && start + (n - 1) as f64 * step >= end {
        n -= 1;
    }
    n
}

#[cfg(test)]
#[path = "../../tests/unit/render/planner.rs"]
mod tests;
