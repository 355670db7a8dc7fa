//! Cosmetic smoothing of grid motion.
//!
//! Every rendered frame each segment's drawn point moves a fixed fraction of
//! the way towards its cell. The point approaches the cell geometrically and
//! never lands on it exactly; game logic only ever reads cells.

use super::state::{Snake, SmoothPoint};

/// One exponential smoothing step from `current` towards `target`
pub fn ease(current: SmoothPoint, target: SmoothPoint, alpha: f32) -> SmoothPoint {
    SmoothPoint::new(
        current.x + (target.x - current.x) * alpha,
        current.y + (target.y - current.y) * alpha,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionInterpolator {
    alpha: f32,
}

impl MotionInterpolator {
    /// `alpha` is the fraction of the remaining distance covered per frame
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }

    /// Ease every segment of the snake one frame towards its cell
    pub fn advance(&self, snake: &mut Snake) {
        let grid = snake.grid();
        for segment in snake.segments_mut() {
            segment.point = ease(segment.point, grid.to_point(segment.cell), self.alpha);
        }
    }
}
