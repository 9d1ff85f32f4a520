//! Configuration module for cutter-motion.
//!
//! Provides types for loading and validating machine geometry and timing
//! from TOML files (with `std` feature) or pre-parsed data.

mod limits;
mod machine;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use limits::TravelLimits;
pub use machine::{DefaultsConfig, MachineConfig, TimingConfig, TravelConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Point, Pressure, Speed, Steps};
