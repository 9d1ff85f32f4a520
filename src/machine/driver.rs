//! The tick-driven machine core.
//!
//! [`Machine`] owns every piece of hardware and every byte of mutable state;
//! it never runs on its own. The timer interrupt drives it through
//! [`TickDriver::tick`] one step at a time, and the producer context reaches
//! it through [`CommandPort`](super::CommandPort). Both go through the
//! [`MachineCell`] critical section, so no state is ever seen half-written.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::command::{Command, CommandConsumer};
use crate::config::units::{Point, Pressure, Speed, Steps};
use crate::config::{MachineConfig, TravelLimits};
use crate::error::{Error, MachineError, Result};
use crate::hal::{CoilPort, StepClock};
use crate::motion::LineInterpolator;
use crate::phase::{coil_pattern, COILS_OFF};

use super::builder::MachineBuilder;
use super::cell::MachineCell;
use super::state::{HomingPhase, MachineStatus, MotionState};

/// The two-axis machine: hardware, geometry, and motion state in one place.
///
/// Generic over:
/// - `XP`, `YP`: coil ports of the mat-feed and carriage motors ([`CoilPort`])
/// - `PEN`: pen lift output; driving it high lowers the tool ([`OutputPin`])
/// - `PWM`: pen pressure PWM ([`SetDutyCycle`])
/// - `HOME`: carriage home switch ([`InputPin`])
/// - `STOP`: operator stop button ([`InputPin`])
/// - `CLK`: adjustable tick source ([`StepClock`])
///
/// Construct with [`MachineBuilder`](super::MachineBuilder), then wrap in a
/// [`MachineCell`] and split into the two context handles with
/// [`MachineCell::attach`].
pub struct Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    /// Mat-feed (X) motor coil port.
    x_coils: XP,

    /// Carriage (Y) motor coil port.
    y_coils: YP,

    /// Pen lift output; high = tool on the media.
    pen: PEN,

    /// Pen pressure PWM.
    pressure_pwm: PWM,

    /// Carriage home switch.
    home_switch: HOME,

    /// Operator stop button, polled every tick.
    stop_button: STOP,

    /// Tick source, told about speed changes.
    step_clock: CLK,

    /// Machine name for displays/logs.
    name: heapless::String<32>,

    /// Travel envelope.
    limits: TravelLimits,

    /// Ticks to pause stepping after a pen transition.
    settle_ticks: u16,

    /// Ticks of Ready-state inactivity before coil power drops.
    idle_timeout: u16,

    /// Extra ticks between homing seek steps.
    home_seek_delay: u16,

    /// Extra ticks between homing release steps.
    home_release_delay: u16,

    /// Home switch reads low when the carriage sits on it.
    home_switch_active_low: bool,

    /// Stop button reads low while held.
    stop_button_active_low: bool,

    /// Current absolute position; starts at the pre-home sentinel.
    position: Point,

    /// User origin offset captured by `set_origin_here`.
    offset: Point,

    /// The controlling state machine.
    state: MotionState,

    /// Whether the pen output currently holds the tool down.
    pen_down: bool,

    /// Remaining settle ticks; stepping is paused while non-zero.
    settle: u16,

    /// Remaining Ready ticks before the motors power down.
    idle_ticks: u16,

    /// Effective step rate (last dequeued, or the configured default).
    speed: Speed,

    /// Effective pen pressure (last dequeued, or the configured default).
    pressure: Pressure,
}

impl<XP, YP, PEN, PWM, HOME, STOP, CLK> Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    /// Start building a machine.
    pub fn builder() -> MachineBuilder<XP, YP, PEN, PWM, HOME, STOP, CLK> {
        MachineBuilder::new()
    }

    /// Create a machine at the pre-home sentinel position.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        x_coils: XP,
        y_coils: YP,
        pen: PEN,
        pressure_pwm: PWM,
        home_switch: HOME,
        stop_button: STOP,
        step_clock: CLK,
        config: &MachineConfig,
    ) -> Self {
        let limits = TravelLimits::from_config(&config.travel);
        let position = limits.sentinel();

        Self {
            x_coils,
            y_coils,
            pen,
            pressure_pwm,
            home_switch,
            stop_button,
            step_clock,
            name: config.name.clone(),
            limits,
            settle_ticks: config.timing.settle_ticks,
            idle_timeout: config.timing.idle_timeout_ticks,
            home_seek_delay: config.timing.home_seek_delay,
            home_release_delay: config.timing.home_release_delay,
            home_switch_active_low: config.home_switch_active_low,
            stop_button_active_low: config.stop_button_active_low,
            position,
            offset: Point::ORIGIN,
            state: MotionState::Ready,
            pen_down: false,
            settle: 0,
            idle_ticks: config.timing.idle_timeout_ticks,
            speed: config.defaults.speed,
            pressure: config.defaults.pressure,
        }
    }

    /// Put the hardware into its power-on state: coils released, pen up,
    /// configured defaults applied to the PWM and step clock.
    pub(crate) fn apply_startup(&mut self) -> Result<()> {
        self.power_off()?;
        self.pen.set_low().map_err(|_| MachineError::PinError)?;
        self.apply_pressure()?;
        let rate = self.speed;
        self.step_clock.set_step_rate(rate);
        Ok(())
    }

    /// Get the machine name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Active user-origin offset.
    #[inline]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Travel envelope in effect.
    #[inline]
    pub fn limits(&self) -> &TravelLimits {
        &self.limits
    }

    /// Activity snapshot.
    #[inline]
    pub fn status(&self) -> MachineStatus {
        self.state.status()
    }

    /// Whether the pen output holds the tool down.
    #[inline]
    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    /// Whether the Y reference has been established.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.position.y >= Steps(0)
    }

    /// Whether media has been loaded (X reference established).
    #[inline]
    pub fn is_media_loaded(&self) -> bool {
        self.position.x >= Steps(0)
    }

    /// Effective step rate.
    #[inline]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Effective pen pressure.
    #[inline]
    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    // ---- producer-context operations (called under the cell) ----

    /// Absolute target for a cut to logical `target`, if it stays on media.
    pub(crate) fn draw_target(&self, target: Point) -> Option<Point> {
        let absolute = target.checked_translate(self.offset)?;
        self.limits.allows_draw(absolute).then_some(absolute)
    }

    /// Absolute target for a pen-up move to logical `target`, if in range.
    pub(crate) fn move_target(&self, target: Point) -> Option<Point> {
        let absolute = target.checked_translate(self.offset)?;
        self.limits.allows_move(absolute).then_some(absolute)
    }

    /// Absolute target for a jog by `delta` from the current position.
    pub(crate) fn jog_target(&self, delta: Point) -> Option<Point> {
        let absolute = self.position.checked_translate(delta)?;
        self.limits.allows_jog(absolute).then_some(absolute)
    }

    /// Capture the current position as the user origin.
    pub(crate) fn capture_origin(&mut self) -> Result<()> {
        if self.position.x < Steps(0) || self.position.y < Steps(0) {
            return Err(Error::Machine(MachineError::NotHomed));
        }
        self.offset = self.position;
        Ok(())
    }

    /// Raise the pen and arm the homing sequence from the sentinel position.
    pub(crate) fn begin_homing(&mut self) -> Result<()> {
        self.raise_pen()?;
        self.position = self.limits.sentinel();
        self.state = MotionState::Homing(HomingPhase::Clear);
        Ok(())
    }

    /// Re-base X for a media load.
    ///
    /// Returns the carriage Y to park at while the mat pulls in, or `None`
    /// when media is already loaded and nothing needs to move.
    pub(crate) fn rebase_for_media_load(&mut self) -> Result<Option<Steps>> {
        if self.position.y < Steps(0) {
            return Err(Error::Machine(MachineError::NotHomed));
        }
        if self.position.x >= Steps(0) {
            return Ok(None);
        }
        self.position.x = -self.limits.mat_edge();
        Ok(Some(self.position.y))
    }

    /// Logical target that rolls the media back out: absolute
    /// `(-mat_edge, 0)` once the active offset is re-applied.
    pub(crate) fn media_eject_target(&self) -> Point {
        Point::new(
            -(self.limits.mat_edge() + self.offset.x),
            -self.offset.y,
        )
    }

    /// Lower the pen, refusing observably when no reference is established.
    pub(crate) fn lower_pen_checked(&mut self) -> Result<()> {
        if self.position.x < Steps(0) || self.position.y < Steps(0) {
            return Err(Error::Machine(MachineError::NotHomed));
        }
        self.lower_pen()
    }

    /// Whether the stop button is held right now.
    pub(crate) fn stop_pressed(&mut self) -> Result<bool> {
        let level_high = self
            .stop_button
            .is_high()
            .map_err(|_| MachineError::PinError)?;
        if self.stop_button_active_low {
            Ok(!level_high)
        } else {
            Ok(level_high)
        }
    }

    // ---- tick-context operations ----

    /// Execute one tick: at most one step of motion plus housekeeping.
    pub(crate) fn run_tick(&mut self, commands: &mut CommandConsumer<'_>) -> Result<()> {
        // A pending settle delay pauses everything, including stop
        // handling; the pen mechanism must come to rest first.
        if self.settle > 0 {
            self.settle -= 1;
            return Ok(());
        }

        if self.stop_pressed()? {
            self.state = MotionState::Ready;
            while commands.dequeue().is_some() {}
            self.raise_pen()?;
            self.power_off()?;
        }

        match self.state {
            MotionState::Homing(HomingPhase::Clear) => {
                if self.position.y < Steps(0) {
                    // back away so the power-on jolt can't fake a trigger
                    self.position.y.0 += 1;
                } else {
                    self.state = MotionState::Homing(HomingPhase::Seek);
                }
            }

            MotionState::Homing(HomingPhase::Seek) => {
                self.settle = self.home_seek_delay;

                if !self.home_active()? {
                    self.position.y.0 -= 1;
                } else {
                    self.state = MotionState::Homing(HomingPhase::Release);
                }
            }

            MotionState::Homing(HomingPhase::Release) => {
                self.settle = self.home_release_delay;

                if self.home_active()? {
                    self.position.y.0 += 1;
                } else {
                    // the release edge is the Y reference
                    self.position.y = Steps(0);
                    self.offset = Point::ORIGIN;
                    self.state = MotionState::Ready;
                    #[cfg(feature = "defmt")]
                    defmt::debug!("carriage homed, Y reference set");
                }
            }

            MotionState::Ready => {
                self.begin_next_command(commands)?;
                // a freshly seeded segment takes its first step this
                // same tick, joining strokes without a dead tick
                if matches!(self.state, MotionState::Stepping(_)) {
                    self.advance_segment();
                }
            }

            MotionState::Stepping(_) => self.advance_segment(),
        }

        if matches!(self.state, MotionState::Ready) {
            // Motors run hot; drop coil power after enough idle ticks.
            if self.idle_ticks > 0 {
                self.idle_ticks -= 1;
            } else {
                self.power_off()?;
            }
        } else {
            self.drive_axes()?;
            self.idle_ticks = self.idle_timeout;
        }

        Ok(())
    }

    /// Raise the pen; arms the settle delay only on an actual transition.
    pub(crate) fn raise_pen(&mut self) -> Result<()> {
        if self.pen_down {
            self.settle = self.settle_ticks;
        }
        self.pen.set_low().map_err(|_| MachineError::PinError)?;
        self.pen_down = false;
        Ok(())
    }

    /// Lower the pen; silently left up without media, no-op when already
    /// down, settle armed only on an actual transition.
    pub(crate) fn lower_pen(&mut self) -> Result<()> {
        if self.position.x < Steps(0) || self.position.y < Steps(0) {
            // no media underneath the tool
            return Ok(());
        }
        if self.pen_down {
            return Ok(());
        }

        self.pen.set_high().map_err(|_| MachineError::PinError)?;
        self.pen_down = true;
        self.settle = self.settle_ticks;
        Ok(())
    }

    /// Release both coil ports; the motors hold no torque after this.
    pub(crate) fn power_off(&mut self) -> Result<()> {
        self.x_coils
            .drive(COILS_OFF)
            .map_err(|_| MachineError::PinError)?;
        self.y_coils
            .drive(COILS_OFF)
            .map_err(|_| MachineError::PinError)?;
        Ok(())
    }

    /// Dequeue and act on at most one command.
    fn begin_next_command(&mut self, commands: &mut CommandConsumer<'_>) -> Result<()> {
        let command = match commands.dequeue() {
            Some(command) => command,
            None => return Ok(()),
        };

        match command {
            Command::Move(target) | Command::Draw(target) => {
                if matches!(command, Command::Move(_)) {
                    self.raise_pen()?;
                } else {
                    self.lower_pen()?;
                }

                // already there on both axes, nothing to interpolate
                if self.position == target {
                    return Ok(());
                }

                self.state =
                    MotionState::Stepping(LineInterpolator::new(self.position, target));
            }

            Command::SetSpeed(rate) => {
                self.speed = rate;
                self.step_clock.set_step_rate(rate);
            }

            Command::SetPressure(pressure) => {
                self.pressure = pressure;
                self.apply_pressure()?;
            }
        }

        Ok(())
    }

    /// Take one interpolation step; back to Ready once the segment is done.
    fn advance_segment(&mut self) {
        if let MotionState::Stepping(ref mut line) = self.state {
            if !line.advance(&mut self.position) {
                self.state = MotionState::Ready;
            }
        }
    }

    /// Latch the phase patterns for the current position onto both ports.
    fn drive_axes(&mut self) -> Result<()> {
        self.x_coils
            .drive(coil_pattern(self.position.x))
            .map_err(|_| MachineError::PinError)?;
        self.y_coils
            .drive(coil_pattern(self.position.y))
            .map_err(|_| MachineError::PinError)?;
        Ok(())
    }

    /// Forward the effective pressure to the PWM as a duty fraction.
    fn apply_pressure(&mut self) -> Result<()> {
        self.pressure_pwm
            .set_duty_cycle_fraction(self.pressure.value(), Pressure::MAX.value())
            .map_err(|_| MachineError::PinError)?;
        Ok(())
    }

    /// Whether the home switch is in its active (carriage present) state.
    fn home_active(&mut self) -> Result<bool> {
        let level_high = self
            .home_switch
            .is_high()
            .map_err(|_| MachineError::PinError)?;
        if self.home_switch_active_low {
            Ok(!level_high)
        } else {
            Ok(level_high)
        }
    }
}

/// Tick-context handle: the one entry point the timer interrupt calls.
///
/// Owns the consumer half of the command queue; everything else it touches
/// goes through the [`MachineCell`] critical section.
pub struct TickDriver<'a, XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    machine: &'a MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>,
    commands: CommandConsumer<'a>,
}

impl<'a, XP, YP, PEN, PWM, HOME, STOP, CLK> TickDriver<'a, XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    pub(crate) fn new(
        machine: &'a MachineCell<XP, YP, PEN, PWM, HOME, STOP, CLK>,
        commands: CommandConsumer<'a>,
    ) -> Self {
        Self { machine, commands }
    }

    /// Execute one tick of the machine.
    ///
    /// Call this from the step timer interrupt (or a test loop). Each call
    /// performs at most one step of motion per axis plus housekeeping:
    /// settle delays, stop handling, command dequeue, homing, coil output
    /// and the idle power-down countdown.
    ///
    /// # Errors
    ///
    /// Returns `MachineError::PinError` if a pin or PWM write fails; with
    /// infallible hardware this never errors.
    pub fn tick(&mut self) -> Result<()> {
        let commands = &mut self.commands;
        self.machine.with(|machine| machine.run_tick(commands))
    }

    /// Commands waiting in the queue.
    #[inline]
    pub fn queued(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Pressure, Speed};
    use core::convert::Infallible;

    #[derive(Default)]
    struct SpyCoils {
        writes: Vec<u8>,
    }

    impl CoilPort for SpyCoils {
        type Error = Infallible;

        fn drive(&mut self, pattern: u8) -> core::result::Result<(), Self::Error> {
            self.writes.push(pattern);
            Ok(())
        }
    }

    #[derive(Default)]
    struct SpyPin {
        high: bool,
        sets: usize,
    }

    impl embedded_hal::digital::ErrorType for SpyPin {
        type Error = Infallible;
    }

    impl OutputPin for SpyPin {
        fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
            self.high = false;
            self.sets += 1;
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
            self.high = true;
            self.sets += 1;
            Ok(())
        }
    }

    /// Input level the test can steer; `high` by default, which reads as
    /// inactive for the default active-low switches.
    struct SpyInput {
        high: bool,
    }

    impl Default for SpyInput {
        fn default() -> Self {
            Self { high: true }
        }
    }

    impl embedded_hal::digital::ErrorType for SpyInput {
        type Error = Infallible;
    }

    impl InputPin for SpyInput {
        fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[derive(Default)]
    struct SpyPwm {
        fraction: Option<(u16, u16)>,
    }

    impl embedded_hal::pwm::ErrorType for SpyPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for SpyPwm {
        fn max_duty_cycle(&self) -> u16 {
            u16::MAX
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Self::Error> {
            self.fraction = Some((duty, u16::MAX));
            Ok(())
        }

        fn set_duty_cycle_fraction(
            &mut self,
            num: u16,
            denom: u16,
        ) -> core::result::Result<(), Self::Error> {
            self.fraction = Some((num, denom));
            Ok(())
        }
    }

    type TestMachine = Machine<SpyCoils, SpyCoils, SpyPin, SpyPwm, SpyInput, SpyInput, ()>;

    fn test_machine() -> TestMachine {
        Machine::new(
            SpyCoils::default(),
            SpyCoils::default(),
            SpyPin::default(),
            SpyPwm::default(),
            SpyInput::default(),
            SpyInput::default(),
            (),
            &MachineConfig::default(),
        )
    }

    /// Fake a completed home plus media load.
    fn homed_machine() -> TestMachine {
        let mut m = test_machine();
        m.position = Point::ORIGIN;
        m
    }

    #[test]
    fn test_starts_at_sentinel_unhomed() {
        let m = test_machine();
        assert_eq!(m.position(), Point::steps(-250, -100));
        assert!(!m.is_homed());
        assert!(!m.is_media_loaded());
        assert_eq!(m.status(), MachineStatus::Ready);
    }

    #[test]
    fn test_draw_target_applies_offset_and_envelope() {
        let mut m = homed_machine();
        m.offset = Point::steps(100, 50);

        assert_eq!(
            m.draw_target(Point::steps(10, 10)),
            Some(Point::steps(110, 60))
        );
        // offset pushes the target past the Y travel
        assert_eq!(m.draw_target(Point::steps(0, 4_751)), None);
        // cuts may not reach below zero even though moves may
        assert_eq!(m.draw_target(Point::steps(-101, 0)), None);
        assert_eq!(
            m.move_target(Point::steps(-101, 0)),
            Some(Point::steps(-1, 50))
        );
    }

    #[test]
    fn test_translate_overflow_rejects() {
        let mut m = homed_machine();
        m.offset = Point::steps(1, 0);
        assert_eq!(m.draw_target(Point::steps(i32::MAX, 0)), None);
    }

    #[test]
    fn test_jog_target_relative_to_position() {
        let mut m = homed_machine();
        m.position = Point::steps(10, 20);
        m.offset = Point::steps(999, 999); // jogs ignore the user origin

        assert_eq!(
            m.jog_target(Point::steps(-50, 5)),
            Some(Point::steps(-40, 25))
        );
        assert_eq!(m.jog_target(Point::steps(0, -21)), None);
    }

    #[test]
    fn test_capture_origin_requires_reference() {
        let mut m = test_machine();
        assert_eq!(
            m.capture_origin(),
            Err(Error::Machine(MachineError::NotHomed))
        );

        m.position = Point::steps(5, 7);
        assert!(m.capture_origin().is_ok());
        assert_eq!(m.offset(), Point::steps(5, 7));
    }

    #[test]
    fn test_lower_pen_blocked_without_media() {
        let mut m = test_machine();
        m.lower_pen().unwrap();
        assert!(!m.is_pen_down());
        assert_eq!(m.settle, 0);

        assert_eq!(
            m.lower_pen_checked(),
            Err(Error::Machine(MachineError::NotHomed))
        );
    }

    #[test]
    fn test_pen_settle_armed_only_on_transition() {
        let mut m = homed_machine();

        m.lower_pen().unwrap();
        assert!(m.is_pen_down());
        assert_eq!(m.settle, 50);

        m.settle = 0;
        m.lower_pen().unwrap(); // already down, no re-arm
        assert_eq!(m.settle, 0);

        m.raise_pen().unwrap();
        assert_eq!(m.settle, 50);

        m.settle = 0;
        m.raise_pen().unwrap(); // already up, no re-arm
        assert_eq!(m.settle, 0);
        assert!(!m.is_pen_down());
    }

    #[test]
    fn test_begin_homing_arms_sentinel() {
        let mut m = homed_machine();
        m.offset = Point::steps(3, 4);
        m.begin_homing().unwrap();

        assert_eq!(m.position(), Point::steps(-250, -100));
        assert_eq!(m.status(), MachineStatus::Homing);
        // offset survives until the release edge rewrites it
        assert_eq!(m.offset(), Point::steps(3, 4));
    }

    #[test]
    fn test_media_eject_target_compensates_offset() {
        let mut m = homed_machine();
        m.offset = Point::steps(40, 30);
        assert_eq!(m.media_eject_target(), Point::steps(-290, -30));
    }

    #[test]
    fn test_rebase_for_media_load() {
        let mut m = test_machine();
        assert_eq!(
            m.rebase_for_media_load(),
            Err(Error::Machine(MachineError::NotHomed))
        );

        m.position = Point::steps(-250, 0);
        assert_eq!(m.rebase_for_media_load(), Ok(Some(Steps(0))));
        assert_eq!(m.position().x, Steps(-250));

        m.position = Point::steps(10, 0);
        assert_eq!(m.rebase_for_media_load(), Ok(None));
    }

    #[test]
    fn test_settle_pauses_the_tick() {
        let mut m = homed_machine();
        m.settle = 2;
        let mut queue = crate::command::CommandQueue::new();
        let (mut tx, mut rx) = queue.split();
        tx.enqueue(Command::Move(Point::steps(5, 0))).unwrap();

        m.run_tick(&mut rx).unwrap();
        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.position(), Point::ORIGIN); // both ticks consumed by settle
        assert_eq!(rx.len(), 1);

        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.position(), Point::steps(1, 0)); // dequeued and stepped
    }

    #[test]
    fn test_same_position_command_is_a_no_op() {
        let mut m = homed_machine();
        let mut queue = crate::command::CommandQueue::new();
        let (mut tx, mut rx) = queue.split();
        tx.enqueue(Command::Move(Point::ORIGIN)).unwrap();

        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.status(), MachineStatus::Ready);
        assert_eq!(m.position(), Point::ORIGIN);
    }

    #[test]
    fn test_speed_and_pressure_cached_at_dequeue() {
        let mut m = homed_machine();
        let mut queue = crate::command::CommandQueue::new();
        let (mut tx, mut rx) = queue.split();
        tx.enqueue(Command::SetSpeed(Speed(9))).unwrap();
        tx.enqueue(Command::SetPressure(Pressure::new(400).unwrap()))
            .unwrap();

        assert_eq!(m.speed(), Speed(5));
        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.speed(), Speed(9));

        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.pressure(), Pressure::new(400).unwrap());
        assert_eq!(m.pressure_pwm.fraction, Some((400, 1023)));
    }

    #[test]
    fn test_stop_clears_queue_and_raises_pen() {
        let mut m = homed_machine();
        let mut queue = crate::command::CommandQueue::new();
        let (mut tx, mut rx) = queue.split();
        tx.enqueue(Command::Draw(Point::steps(500, 0))).unwrap();
        tx.enqueue(Command::Draw(Point::steps(500, 500))).unwrap();

        m.run_tick(&mut rx).unwrap(); // seeds the segment, pen drops
        assert!(m.is_pen_down());
        m.settle = 0; // skip the pen settle for the test

        m.stop_button.high = false; // active low: pressed
        m.run_tick(&mut rx).unwrap();

        assert_eq!(m.status(), MachineStatus::Ready);
        assert_eq!(rx.len(), 0);
        assert!(!m.is_pen_down());
        assert_eq!(m.x_coils.writes.last(), Some(&COILS_OFF));
        assert_eq!(m.y_coils.writes.last(), Some(&COILS_OFF));
    }

    #[test]
    fn test_idle_countdown_powers_off() {
        let mut m = homed_machine();
        m.idle_ticks = 2;
        let mut queue = crate::command::CommandQueue::new();
        let (_tx, mut rx) = queue.split();

        m.run_tick(&mut rx).unwrap();
        m.run_tick(&mut rx).unwrap();
        assert!(m.x_coils.writes.is_empty()); // still counting down

        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.x_coils.writes.last(), Some(&COILS_OFF));

        // held at zero: off is re-asserted, no underflow
        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.x_coils.writes.len(), 2);
    }

    #[test]
    fn test_motion_resets_idle_countdown() {
        let mut m = homed_machine();
        m.idle_ticks = 1;
        let mut queue = crate::command::CommandQueue::new();
        let (mut tx, mut rx) = queue.split();
        tx.enqueue(Command::Move(Point::steps(2, 0))).unwrap();

        m.run_tick(&mut rx).unwrap();
        assert_eq!(m.idle_ticks, m.idle_timeout);
        assert_eq!(
            m.x_coils.writes.last(),
            Some(&coil_pattern(Steps(1)))
        );
    }
}
