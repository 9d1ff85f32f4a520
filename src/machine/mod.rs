//! Machine module for cutter-motion.
//!
//! Provides the tick-driven two-axis machine core and its two context
//! handles: the producer-side [`CommandPort`] and the interrupt-side
//! [`TickDriver`].

mod builder;
mod cell;
mod driver;
mod port;
mod state;

pub use builder::MachineBuilder;
pub use cell::MachineCell;
pub use driver::{Machine, TickDriver};
pub use port::{CommandPort, JogDirection};
pub use state::MachineStatus;
