//! Producer-context handle: validation, queueing, and direct safety ops.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::command::{Command, CommandProducer};
use crate::config::units::{Point, Pressure, Speed, Steps};
use crate::error::{Error, MachineError, Result};
use crate::hal::{CoilPort, StepClock, Watchdog};

use super::cell::MachineCell;
use super::state::MachineStatus;

/// Jog direction as seen from the front panel.
///
/// `Up` feeds the mat in (+X), `Left` moves the carriage across (+Y);
/// diagonals combine the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogDirection {
    /// Mat in (+X).
    Up,
    /// Mat in, carriage across (+X, +Y).
    UpLeft,
    /// Carriage across (+Y).
    Left,
    /// Mat out, carriage across (-X, +Y).
    DownLeft,
    /// Mat out (-X).
    Down,
    /// Mat out, carriage back (-X, -Y).
    DownRight,
    /// Carriage back (-Y).
    Right,
    /// Mat in, carriage back (+X, -Y).
    UpRight,
}

impl JogDirection {
    /// Per-axis unit signs of this direction.
    const fn unit(self) -> (i32, i32) {
        match self {
            JogDirection::Up => (1, 0),
            JogDirection::UpLeft => (1, 1),
            JogDirection::Left => (0, 1),
            JogDirection::DownLeft => (-1, 1),
            JogDirection::Down => (-1, 0),
            JogDirection::DownRight => (-1, -1),
            JogDirection::Right => (0, -1),
            JogDirection::UpRight => (1, -1),
        }
    }

    /// Scale to a position delta, `None` if the distance overflows i32.
    fn delta(self, distance: Steps) -> Option<Point> {
        let (ux, uy) = self.unit();
        Some(Point::new(
            Steps(distance.value().checked_mul(ux)?),
            Steps(distance.value().checked_mul(uy)?),
        ))
    }
}

/// Producer-context handle to a shared machine.
///
/// This is what a command decoder or front panel calls. Motion requests are
/// offset-translated and range-checked here, then queued for the tick
/// interrupt; out-of-range targets are dropped without an error, matching
/// the machine's ignore-illegal-moves policy. Direct operations (pen, home,
/// origin, media) act immediately under the cell's critical section.
///
/// Obtained from [`MachineCell::attach`] together with the matching
/// [`TickDriver`](super::TickDriver).
pub struct CommandPort<'a, XP, YP, PEN, PWM, HOME, STOP, CLK, WD>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
    WD: Watchdog,
{
    machine: &'a MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>,
    commands: CommandProducer<'a>,
    watchdog: WD,
}

impl<'a, XP, YP, PEN, PWM, HOME, STOP, CLK, WD> CommandPort<'a, XP, YP, PEN, PWM, HOME, STOP, CLK, WD>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
    WD: Watchdog,
{
    pub(crate) fn new(
        machine: &'a MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>,
        commands: CommandProducer<'a>,
        watchdog: WD,
    ) -> Self {
        Self {
            machine,
            commands,
            watchdog,
        }
    }

    /// Queue a pen-up move to logical `target`.
    ///
    /// The target is translated by the active origin offset and checked
    /// against the move envelope (which extends to `-mat_edge` on X).
    /// Out-of-range targets are dropped silently. Blocks only for queue
    /// backpressure.
    pub fn move_to(&mut self, target: Point) {
        let absolute = match self.machine.with(|m| m.move_target(target)) {
            Some(absolute) => absolute,
            None => return,
        };
        self.send(Command::Move(absolute));
    }

    /// Queue a cut to logical `target`.
    ///
    /// Same translation as [`move_to`](Self::move_to), but checked against
    /// the on-media envelope; the pen drops when the command executes.
    pub fn draw_to(&mut self, target: Point) {
        let absolute = match self.machine.with(|m| m.draw_target(target)) {
            Some(absolute) => absolute,
            None => return,
        };
        self.send(Command::Draw(absolute));
    }

    /// Queue a manual jog by `distance` in `direction`.
    ///
    /// Jogs are relative to the current absolute position, not the logical
    /// origin, and use the widest service envelope. Out-of-range jogs are
    /// dropped silently.
    ///
    /// # Errors
    ///
    /// `MachineError::Busy` if commands are still queued; jogging is a
    /// hands-near-the-machine operation and never interleaves with a job.
    pub fn jog(&mut self, direction: JogDirection, distance: Steps) -> Result<()> {
        self.ensure_idle_queue()?;

        let delta = match direction.delta(distance) {
            Some(delta) => delta,
            None => return Ok(()),
        };
        let target = match self.machine.with(|m| m.jog_target(delta)) {
            Some(target) => target,
            None => return Ok(()),
        };

        self.send(Command::Move(target));
        Ok(())
    }

    /// Queue a step-rate change; takes effect when dequeued, in FIFO order
    /// with the motion around it.
    pub fn set_speed(&mut self, rate: Speed) {
        self.send(Command::SetSpeed(rate));
    }

    /// Queue a pen-pressure change; takes effect when dequeued.
    pub fn set_pressure(&mut self, pressure: Pressure) {
        self.send(Command::SetPressure(pressure));
    }

    /// Capture the current position as the logical origin.
    ///
    /// # Errors
    ///
    /// `Busy` while commands are queued; `NotHomed` while either axis still
    /// carries a pre-home sentinel.
    pub fn set_origin_here(&mut self) -> Result<()> {
        self.ensure_idle_queue()?;
        self.machine.with(|m| m.capture_origin())
    }

    /// Start the homing sequence.
    ///
    /// Raises the pen, re-arms the sentinel position and hands control to
    /// the tick driver, which walks the carriage onto and back off the home
    /// switch. Progress is visible through [`status`](Self::status).
    ///
    /// # Errors
    ///
    /// `Busy` while commands are queued.
    pub fn home(&mut self) -> Result<()> {
        self.ensure_idle_queue()?;
        self.machine.with(|m| m.begin_homing())
    }

    /// Raise the pen immediately.
    ///
    /// Always allowed; arms the settle pause only when the pen was down.
    ///
    /// # Errors
    ///
    /// `PinError` if the lift output write fails.
    pub fn pen_up(&mut self) -> Result<()> {
        self.machine.with(|m| m.raise_pen())
    }

    /// Lower the pen immediately.
    ///
    /// # Errors
    ///
    /// `NotHomed` while either axis carries a pre-home sentinel (there is
    /// no media under the tool); `PinError` if the lift output write fails.
    pub fn pen_down(&mut self) -> Result<()> {
        self.machine.with(|m| m.lower_pen_checked())
    }

    /// Release both motors immediately.
    ///
    /// # Errors
    ///
    /// `Busy` while commands are queued; `PinError` on a port write failure.
    pub fn motors_off(&mut self) -> Result<()> {
        self.ensure_idle_queue()?;
        self.machine.with(|m| m.power_off())
    }

    /// Pull loaded media in and park at the logical origin.
    ///
    /// Re-bases X to the mat grip margin and queues the two pull-in moves.
    /// A no-op when media is already in. With an origin offset in effect
    /// the park ends at the logical origin, not the absolute one.
    ///
    /// # Errors
    ///
    /// `Busy` while commands are queued; `NotHomed` before the carriage has
    /// been homed.
    pub fn load_media(&mut self) -> Result<()> {
        self.ensure_idle_queue()?;

        let park_y = match self.machine.with(|m| m.rebase_for_media_load())? {
            Some(park_y) => park_y,
            None => return Ok(()),
        };

        // pull the mat in to X zero first, carriage where it stands
        self.move_to(Point::new(Steps(0), park_y));
        self.move_to(Point::ORIGIN);
        Ok(())
    }

    /// Roll the media back out to the mat release position.
    ///
    /// Queues a move to absolute `(-mat_edge, 0)`, compensating any active
    /// origin offset.
    ///
    /// # Errors
    ///
    /// `Busy` while commands are queued.
    pub fn unload_media(&mut self) -> Result<()> {
        self.ensure_idle_queue()?;
        let target = self.machine.with(|m| m.media_eject_target());
        self.move_to(target);
        Ok(())
    }

    /// Whether the operator stop button is held right now.
    ///
    /// # Errors
    ///
    /// `PinError` if the input read fails.
    pub fn is_stop_asserted(&mut self) -> Result<bool> {
        self.machine.with(|m| m.stop_pressed())
    }

    /// Current absolute position.
    pub fn position(&self) -> Point {
        self.machine.with(|m| m.position())
    }

    /// Active origin offset.
    pub fn offset(&self) -> Point {
        self.machine.with(|m| m.offset())
    }

    /// Activity snapshot.
    pub fn status(&self) -> MachineStatus {
        self.machine.with(|m| m.status())
    }

    /// Whether the machine is at rest with nothing queued.
    pub fn is_idle(&self) -> bool {
        self.commands.len() == 0 && self.status() == MachineStatus::Ready
    }

    /// Whether the Y reference has been established.
    pub fn is_homed(&self) -> bool {
        self.machine.with(|m| m.is_homed())
    }

    /// Whether media has been loaded (X reference established).
    pub fn is_media_loaded(&self) -> bool {
        self.machine.with(|m| m.is_media_loaded())
    }

    /// Whether the pen output holds the tool down.
    pub fn is_pen_down(&self) -> bool {
        self.machine.with(|m| m.is_pen_down())
    }

    /// Effective step rate (last applied, not last queued).
    pub fn speed(&self) -> Speed {
        self.machine.with(|m| m.speed())
    }

    /// Effective pen pressure (last applied, not last queued).
    pub fn pressure(&self) -> Pressure {
        self.machine.with(|m| m.pressure())
    }

    /// Commands waiting in the queue.
    pub fn queued(&self) -> usize {
        self.commands.len()
    }

    /// Blocking enqueue with watchdog liveness.
    ///
    /// The queue drains one command per segment, so a full queue can stall
    /// for the duration of a long cut (or indefinitely under a held stop);
    /// the watchdog is fed on every failed attempt so the wait never trips
    /// a reset.
    fn send(&mut self, command: Command) {
        let mut command = command;
        loop {
            match self.commands.enqueue(command) {
                Ok(()) => return,
                Err(rejected) => {
                    command = rejected;
                    self.watchdog.feed();
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Queue-empty gate shared by the direct safety operations.
    fn ensure_idle_queue(&self) -> Result<()> {
        if self.commands.len() == 0 {
            Ok(())
        } else {
            Err(Error::Machine(MachineError::Busy))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jog_unit_vectors() {
        assert_eq!(JogDirection::Up.unit(), (1, 0));
        assert_eq!(JogDirection::Down.unit(), (-1, 0));
        assert_eq!(JogDirection::Left.unit(), (0, 1));
        assert_eq!(JogDirection::Right.unit(), (0, -1));
        assert_eq!(JogDirection::UpLeft.unit(), (1, 1));
        assert_eq!(JogDirection::DownRight.unit(), (-1, -1));
    }

    #[test]
    fn test_jog_delta_scales_distance() {
        assert_eq!(
            JogDirection::DownLeft.delta(Steps(40)),
            Some(Point::steps(-40, 40))
        );
        assert_eq!(
            JogDirection::Right.delta(Steps(7)),
            Some(Point::steps(0, -7))
        );
    }

    #[test]
    fn test_jog_delta_overflow_is_none() {
        assert_eq!(JogDirection::Down.delta(Steps(i32::MIN)), None);
    }
}
