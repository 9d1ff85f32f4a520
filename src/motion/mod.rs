//! Motion module for cutter-motion.
//!
//! Provides the per-tick segment interpolation used by the tick driver.

mod line;

pub use line::LineInterpolator;
