//! Straight-segment interpolation.
//!
//! Classic integer line drawing adapted for motion: one interpolation step
//! per tick, no floating point, no residual error at the endpoint.

use crate::config::units::Point;

/// Incremental straight-line stepper between two machine positions.
///
/// Created when a motion command is accepted with a target that differs
/// from the current position; each [`advance`](Self::advance) call moves
/// the position by at most one step per axis. The error term starts at
/// `steps / 2` and loses `delta` per step; on underflow it gains `steps`
/// back and *both* axes advance, otherwise only the dominant axis does.
/// Advancing both axes on underflow keeps true 45° segments exactly
/// diagonal. After `steps` calls the position equals the target exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineInterpolator {
    step: i32,
    steps: i32,
    delta: i32,
    error: i32,
    dir_x: i32,
    dir_y: i32,
    steep: bool,
}

impl LineInterpolator {
    /// Set up interpolation from `from` to `to`.
    ///
    /// The dominant axis is the one with the larger span; ties favor X.
    pub fn new(from: Point, to: Point) -> Self {
        let span_x = (to.x.0 - from.x.0).abs();
        let span_y = (to.y.0 - from.y.0).abs();
        let steep = span_y > span_x;
        let (steps, delta) = if steep {
            (span_y, span_x)
        } else {
            (span_x, span_y)
        };

        Self {
            step: 0,
            steps,
            delta,
            error: steps / 2,
            dir_x: if from.x.0 < to.x.0 { 1 } else { -1 },
            dir_y: if from.y.0 < to.y.0 { 1 } else { -1 },
            steep,
        }
    }

    /// Execute one interpolation step, moving `position` along the segment.
    ///
    /// Returns `false` without touching the position once the segment is
    /// exhausted.
    pub fn advance(&mut self, position: &mut Point) -> bool {
        if self.step >= self.steps {
            return false;
        }

        self.step += 1;
        self.error -= self.delta;
        if self.error < 0 {
            self.error += self.steps;
            position.x.0 += self.dir_x;
            position.y.0 += self.dir_y;
        } else if self.steep {
            position.y.0 += self.dir_y;
        } else {
            position.x.0 += self.dir_x;
        }

        true
    }

    /// Whether every step of the segment has been executed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.step >= self.steps
    }

    /// Steps executed so far.
    #[inline]
    pub fn steps_taken(&self) -> u32 {
        self.step as u32
    }

    /// Total steps along the dominant axis.
    #[inline]
    pub fn steps_total(&self) -> u32 {
        self.steps as u32
    }
}
