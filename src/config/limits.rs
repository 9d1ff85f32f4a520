//! Travel envelope limits.

use super::machine::TravelConfig;
use super::units::{Point, Steps};

/// Runtime travel envelope derived from [`TravelConfig`].
///
/// Three rectangles share the Y range `0..=max_y` but differ on X:
///
/// - cutting keeps the tool on the media (`0..=max_x`),
/// - pen-up travel may follow the mat into the grip margin
///   (`-mat_edge..=max_x`),
/// - jogging spans the widest service range (`-max_x..=max_x`), wide
///   enough to roll a mat back out by hand.
#[derive(Debug, Clone)]
pub struct TravelLimits {
    max_x: Steps,
    max_y: Steps,
    mat_edge: Steps,
    home_lead: Steps,
}

impl TravelLimits {
    /// Build the envelope from configured travel geometry.
    pub fn from_config(travel: &TravelConfig) -> Self {
        Self {
            max_x: travel.max_x,
            max_y: travel.max_y,
            mat_edge: travel.mat_edge,
            home_lead: travel.home_lead,
        }
    }

    /// Whether a cut segment may end at `target`.
    pub fn allows_draw(&self, target: Point) -> bool {
        target.x >= Steps(0)
            && target.x <= self.max_x
            && target.y >= Steps(0)
            && target.y <= self.max_y
    }

    /// Whether a pen-up move may end at `target`.
    pub fn allows_move(&self, target: Point) -> bool {
        target.x >= -self.mat_edge
            && target.x <= self.max_x
            && target.y >= Steps(0)
            && target.y <= self.max_y
    }

    /// Whether a manual jog may end at `target`.
    pub fn allows_jog(&self, target: Point) -> bool {
        target.x >= -self.max_x
            && target.x <= self.max_x
            && target.y >= Steps(0)
            && target.y <= self.max_y
    }

    /// Mat grip margin below X zero.
    #[inline]
    pub fn mat_edge(&self) -> Steps {
        self.mat_edge
    }

    /// Homing approach lead above the switch.
    #[inline]
    pub fn home_lead(&self) -> Steps {
        self.home_lead
    }

    /// The pre-home position sentinel `(-mat_edge, -home_lead)`.
    ///
    /// Negative components mean no reference is established on that axis.
    #[inline]
    pub fn sentinel(&self) -> Point {
        Point::new(-self.mat_edge, -self.home_lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> TravelLimits {
        TravelLimits::from_config(&TravelConfig {
            max_x: Steps(32_000),
            max_y: Steps(4_800),
            mat_edge: Steps(250),
            home_lead: Steps(100),
        })
    }

    #[test]
    fn test_draw_envelope() {
        let l = limits();
        assert!(l.allows_draw(Point::ORIGIN));
        assert!(l.allows_draw(Point::steps(32_000, 4_800)));
        assert!(!l.allows_draw(Point::steps(-1, 0)));
        assert!(!l.allows_draw(Point::steps(0, -1)));
        assert!(!l.allows_draw(Point::steps(32_001, 0)));
        assert!(!l.allows_draw(Point::steps(0, 4_801)));
    }

    #[test]
    fn test_move_envelope_includes_mat_edge() {
        let l = limits();
        assert!(l.allows_move(Point::steps(-250, 0)));
        assert!(!l.allows_move(Point::steps(-251, 0)));
        assert!(!l.allows_move(Point::steps(0, -1)));
    }

    #[test]
    fn test_jog_envelope_spans_both_directions() {
        let l = limits();
        assert!(l.allows_jog(Point::steps(-32_000, 0)));
        assert!(l.allows_jog(Point::steps(32_000, 4_800)));
        assert!(!l.allows_jog(Point::steps(-32_001, 0)));
        assert!(!l.allows_jog(Point::steps(0, -1)));
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(limits().sentinel(), Point::steps(-250, -100));
    }
}
