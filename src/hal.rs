//! Hardware trait seams beyond embedded-hal.
//!
//! The pen pin, home switch, stop button, and pressure PWM use embedded-hal
//! 1.0 traits directly ([`OutputPin`](embedded_hal::digital::OutputPin),
//! [`InputPin`](embedded_hal::digital::InputPin),
//! [`SetDutyCycle`](embedded_hal::pwm::SetDutyCycle)). The three capabilities
//! here have no embedded-hal equivalent: whole-port coil drive, runtime tick
//! rate adjustment, and a liveness kick for blocking enqueue waits.

use crate::config::units::Speed;

/// An 8-bit output port driving the four coils of one axis motor.
///
/// Bit pairs select per-coil current: bit `2k` is the half-current line and
/// bit `2k + 1` the full-current line of coil `k`. Writing
/// [`COILS_OFF`](crate::phase::COILS_OFF) de-energizes the motor.
pub trait CoilPort {
    /// Port write error.
    type Error: core::fmt::Debug;

    /// Latch a coil-drive pattern onto the port.
    fn drive(&mut self, pattern: u8) -> Result<(), Self::Error>;
}

/// A periodic tick source whose rate can be adjusted at runtime.
///
/// The motion core calls this when a speed command reaches the head of the
/// queue; the implementation maps the opaque [`Speed`] setting onto its
/// timer reload value.
pub trait StepClock {
    /// Apply a new step rate.
    fn set_step_rate(&mut self, rate: Speed);
}

/// No-op step clock for fixed-rate setups and tests.
impl StepClock for () {
    fn set_step_rate(&mut self, _rate: Speed) {}
}

/// A liveness kick fed while a full command queue blocks the producer.
///
/// Enqueueing spins until the tick context frees a slot, which can take
/// seconds on long cuts; implementations reset their watchdog (or equivalent
/// keep-alive) on every [`feed`](Watchdog::feed).
pub trait Watchdog {
    /// Signal that the blocked producer is still alive.
    fn feed(&mut self);
}

/// No-op watchdog for setups without one.
impl Watchdog for () {
    fn feed(&mut self) {}
}
