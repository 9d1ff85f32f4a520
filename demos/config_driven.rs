//! Example: Configuration-driven machine setup.
//!
//! This example demonstrates how to:
//! - Parse machine geometry, timing and defaults from TOML
//! - Validate a configuration before handing it to the builder
//! - See configured values flow through to runtime behavior
//!
//! Run with: `cargo run --example config_driven`

use cutter_motion::{
    CoilPort, CommandQueue, JogDirection, Machine, MachineCell, Point, Result, Speed, Steps,
};

/// Mock coil port for demonstration.
struct MockCoils;

impl CoilPort for MockCoils {
    type Error = core::convert::Infallible;

    fn drive(&mut self, _pattern: u8) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock pen lift pin for demonstration.
struct MockPen;

impl embedded_hal::digital::ErrorType for MockPen {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPen {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock pressure PWM for demonstration.
struct MockPwm;

impl embedded_hal::pwm::ErrorType for MockPwm {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Home switch that trips on the first seek poll.
#[derive(Default)]
struct MockHomeSwitch {
    polls: usize,
}

impl embedded_hal::digital::ErrorType for MockHomeSwitch {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for MockHomeSwitch {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        let level = self.polls != 0;
        self.polls += 1;
        Ok(level)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        self.is_high().map(|level| !level)
    }
}

/// Stop button held released.
struct MockStop;

impl embedded_hal::digital::ErrorType for MockStop {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for MockStop {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }
}

fn main() -> Result<()> {
    println!("=== Configuration-Driven Machine Example ===\n");

    // A 12-inch craft cutter at 400 steps per inch. Everything the core
    // needs is in one document; omitted keys fall back to defaults.
    let toml_content = r#"
name = "craft-12"
home_switch_active_low = true
stop_button_active_low = true

[travel]
max_x = 4800
max_y = 2400
mat_edge = 120
home_lead = 60

[timing]
settle_ticks = 40
idle_timeout_ticks = 20000
home_seek_delay = 1
home_release_delay = 4

[defaults]
speed = 7
pressure = 800
"#;

    let config = cutter_motion::parse_config(toml_content)?;
    println!("Loaded configuration for '{}'", config.name.as_str());
    println!(
        "  travel: {} x {} steps, mat edge {}, home lead {}",
        config.travel.max_x.value(),
        config.travel.max_y.value(),
        config.travel.mat_edge.value(),
        config.travel.home_lead.value(),
    );
    println!(
        "  timing: settle {}, idle timeout {}, homing delays {}/{}",
        config.timing.settle_ticks,
        config.timing.idle_timeout_ticks,
        config.timing.home_seek_delay,
        config.timing.home_release_delay,
    );
    println!(
        "  defaults: speed {}, pressure {}",
        config.defaults.speed.value(),
        config.defaults.pressure.value(),
    );

    // parse_config already validated; the explicit call shows the hook for
    // configurations assembled in code
    cutter_motion::validate_config(&config)?;
    println!("Configuration validated successfully!\n");

    let machine = Machine::builder()
        .config(&config)
        .x_coils(MockCoils)
        .y_coils(MockCoils)
        .pen(MockPen)
        .pressure_pwm(MockPwm)
        .home_switch(MockHomeSwitch::default())
        .stop_button(MockStop)
        .step_clock(())
        .build()?;

    println!("Machine '{}' built", machine.name());
    println!("  starts at {:?} (pre-home sentinel from [travel])", machine.position());
    println!("  default speed: {}", machine.speed().value());

    let cell = MachineCell::new(machine);
    let mut queue = CommandQueue::new();
    let (mut port, mut ticker) = cell.attach(&mut queue, ());

    // configured geometry in action: home, then probe the envelope
    port.home()?;
    while !port.is_idle() {
        ticker.tick()?;
    }
    println!("\nHomed at {:?}", port.position());

    // a jog beyond max_y is dropped by the configured envelope
    port.jog(JogDirection::Left, Steps(2401))?;
    while !port.is_idle() {
        ticker.tick()?;
    }
    println!("After over-range jog: {:?} (unchanged)", port.position());

    port.jog(JogDirection::Left, Steps(100))?;
    while !port.is_idle() {
        ticker.tick()?;
    }
    println!("After 100-step jog:  {:?}", port.position());

    port.load_media()?;
    while !port.is_idle() {
        ticker.tick()?;
    }
    println!("Media loaded, parked at {:?}", port.position());

    // speed is a queued command like any motion
    port.set_speed(Speed(9));
    port.draw_to(Point::steps(400, 400));
    while !port.is_idle() {
        ticker.tick()?;
    }
    println!(
        "Cut to {:?} at speed {}",
        port.position(),
        port.speed().value()
    );

    println!("\n=== Example Complete ===");
    println!("Swap the mocks for real ports and pins to drive hardware.");
    Ok(())
}
