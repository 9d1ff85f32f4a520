//! Builder pattern for Machine.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;

use crate::config::{validate_config, MachineConfig};
use crate::error::{ConfigError, Error, Result};
use crate::hal::{CoilPort, StepClock};

use super::driver::Machine;

/// Builder for creating Machine instances.
pub struct MachineBuilder<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    x_coils: Option<XP>,
    y_coils: Option<YP>,
    pen: Option<PEN>,
    pressure_pwm: Option<PWM>,
    home_switch: Option<HOME>,
    stop_button: Option<STOP>,
    step_clock: Option<CLK>,
    config: MachineConfig,
}

impl<XP, YP, PEN, PWM, HOME, STOP, CLK> Default for MachineBuilder<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<XP, YP, PEN, PWM, HOME, STOP, CLK> MachineBuilder<XP, YP, PEN, PWM, HOME, STOP, CLK>
where
    XP: CoilPort,
    YP: CoilPort,
    PEN: OutputPin,
    PWM: SetDutyCycle,
    HOME: InputPin,
    STOP: InputPin,
    CLK: StepClock,
{
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            x_coils: None,
            y_coils: None,
            pen: None,
            pressure_pwm: None,
            home_switch: None,
            stop_button: None,
            step_clock: None,
            config: MachineConfig::default(),
        }
    }

    /// Set the mat-feed (X) coil port.
    pub fn x_coils(mut self, port: XP) -> Self {
        self.x_coils = Some(port);
        self
    }

    /// Set the carriage (Y) coil port.
    pub fn y_coils(mut self, port: YP) -> Self {
        self.y_coils = Some(port);
        self
    }

    /// Set the pen lift output (high lowers the tool).
    pub fn pen(mut self, pin: PEN) -> Self {
        self.pen = Some(pin);
        self
    }

    /// Set the pen pressure PWM.
    pub fn pressure_pwm(mut self, pwm: PWM) -> Self {
        self.pressure_pwm = Some(pwm);
        self
    }

    /// Set the carriage home switch input.
    pub fn home_switch(mut self, pin: HOME) -> Self {
        self.home_switch = Some(pin);
        self
    }

    /// Set the operator stop button input.
    pub fn stop_button(mut self, pin: STOP) -> Self {
        self.stop_button = Some(pin);
        self
    }

    /// Set the step clock (use `()` for a fixed-rate tick source).
    pub fn step_clock(mut self, clock: CLK) -> Self {
        self.step_clock = Some(clock);
        self
    }

    /// Configure from a MachineConfig.
    pub fn config(mut self, config: &MachineConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Build the Machine and put its hardware into the power-on state
    /// (coils released, pen up, configured defaults applied).
    ///
    /// # Errors
    ///
    /// Returns an error if required hardware is missing, if the
    /// configuration fails validation, or if a hardware write fails.
    pub fn build(self) -> Result<Machine<XP, YP, PEN, PWM, HOME, STOP, CLK>> {
        validate_config(&self.config)?;

        let x_coils = self.x_coils.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("x_coils is required").unwrap(),
            ))
        })?;

        let y_coils = self.y_coils.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("y_coils is required").unwrap(),
            ))
        })?;

        let pen = self.pen.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("pen is required").unwrap(),
            ))
        })?;

        let pressure_pwm = self.pressure_pwm.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("pressure_pwm is required").unwrap(),
            ))
        })?;

        let home_switch = self.home_switch.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("home_switch is required").unwrap(),
            ))
        })?;

        let stop_button = self.stop_button.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("stop_button is required").unwrap(),
            ))
        })?;

        let step_clock = self.step_clock.ok_or_else(|| {
            Error::Config(ConfigError::ParseError(
                heapless::String::try_from("step_clock is required").unwrap(),
            ))
        })?;

        let mut machine = Machine::new(
            x_coils,
            y_coils,
            pen,
            pressure_pwm,
            home_switch,
            stop_button,
            step_clock,
            &self.config,
        );
        machine.apply_startup()?;

        Ok(machine)
    }
}
