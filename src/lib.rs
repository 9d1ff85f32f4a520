//! # cutter-motion
//!
//! Tick-driven two-axis motion core for stepper-based cutting machines,
//! with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Tick-driven**: one timer interrupt advances motion at most one step
//!   per axis per tick; no timing logic anywhere else
//! - **Half-step interpolation**: integer line interpolation feeding a
//!   16-phase coil table with current blending
//! - **Queue-decoupled**: commands cross from the producer context to the
//!   tick interrupt through a lock-free SPSC queue with watchdog-fed
//!   backpressure
//! - **Switch-referenced homing**: three-phase seek/release sequence that
//!   leaves the release edge as the Y reference
//! - **embedded-hal 1.0**: `OutputPin` for the pen lift, `InputPin` for
//!   switches, `SetDutyCycle` for pen pressure
//! - **no_std compatible**: core library works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cutter_motion::{Machine, MachineCell, CommandQueue, Point};
//!
//! // Load configuration from TOML
//! let config = cutter_motion::load_config("cutter.toml")?;
//!
//! // Create the machine with embedded-hal peripherals
//! let machine = Machine::builder()
//!     .config(&config)
//!     .x_coils(x_port)
//!     .y_coils(y_port)
//!     .pen(pen_pin)
//!     .pressure_pwm(pwm)
//!     .home_switch(home_pin)
//!     .stop_button(stop_pin)
//!     .step_clock(clock)
//!     .build()?;
//!
//! // Share it between the two contexts
//! let cell = MachineCell::new(machine);
//! let mut queue = CommandQueue::new();
//! let (mut port, mut ticker) = cell.attach(&mut queue, watchdog);
//!
//! // Producer side queues work; the timer interrupt calls ticker.tick()
//! port.home()?;
//! port.draw_to(Point::steps(400, 400));
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Core modules
pub mod command;
pub mod config;
pub mod error;
pub mod hal;
pub mod machine;
pub mod motion;
pub mod phase;

// Re-exports for ergonomic API
pub use command::{Command, CommandQueue, COMMAND_QUEUE_DEPTH};
pub use config::{validate_config, MachineConfig, TravelLimits};
pub use error::{ConfigError, Error, MachineError, Result};
pub use hal::{CoilPort, StepClock, Watchdog};
pub use machine::{
    CommandPort, JogDirection, Machine, MachineBuilder, MachineCell, MachineStatus, TickDriver,
};
pub use motion::LineInterpolator;
pub use phase::{coil_pattern, COILS_OFF, PHASE_PATTERNS};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Point, Pressure, Speed, Steps};
