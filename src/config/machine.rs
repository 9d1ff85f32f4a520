//! Machine configuration from TOML.
//!
//! All geometry is in microsteps and all timing in tick counts; the defaults
//! describe a 24-inch mat cutter at 400 steps per inch.

use heapless::String;
use serde::Deserialize;

use super::units::{Pressure, Speed, Steps};

/// Complete machine configuration from TOML.
///
/// Every field has a default, so an empty TOML document (or
/// `MachineConfig::default()`) yields a working configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default = "default_name")]
    pub name: String<32>,

    /// Home switch closes to ground (reads low when the carriage sits on it).
    #[serde(default = "default_true")]
    pub home_switch_active_low: bool,

    /// Stop button closes to ground (reads low while held).
    #[serde(default = "default_true")]
    pub stop_button_active_low: bool,

    /// Travel envelope geometry.
    #[serde(default)]
    pub travel: TravelConfig,

    /// Tick-denominated timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Power-on parameter defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            home_switch_active_low: true,
            stop_button_active_low: true,
            travel: TravelConfig::default(),
            timing: TimingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

/// Travel envelope geometry in steps.
#[derive(Debug, Clone, Deserialize)]
pub struct TravelConfig {
    /// Maximum mat-feed (X) travel from the origin.
    #[serde(default = "default_max_x")]
    pub max_x: Steps,

    /// Maximum carriage (Y) travel from the origin.
    #[serde(default = "default_max_y")]
    pub max_y: Steps,

    /// Mat margin below X zero where travel (pen up) is still allowed;
    /// the mat is gripped here before and after a cut.
    #[serde(default = "default_mat_edge")]
    pub mat_edge: Steps,

    /// Carriage approach lead above the home switch; homing first backs
    /// away this far so the seek never starts pressed against the switch.
    #[serde(default = "default_home_lead")]
    pub home_lead: Steps,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            max_x: default_max_x(),
            max_y: default_max_y(),
            mat_edge: default_mat_edge(),
            home_lead: default_home_lead(),
        }
    }
}

/// Tick-denominated timing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Ticks to pause stepping after a pen transition while the lift
    /// mechanism settles.
    #[serde(default = "default_settle_ticks")]
    pub settle_ticks: u16,

    /// Ticks of Ready-state inactivity before coil power is dropped.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ticks: u16,

    /// Extra ticks inserted between homing seek steps (slows the approach).
    #[serde(default = "default_home_seek_delay")]
    pub home_seek_delay: u16,

    /// Extra ticks inserted between homing release steps (slowest phase,
    /// sets the final reference accuracy).
    #[serde(default = "default_home_release_delay")]
    pub home_release_delay: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ticks: default_settle_ticks(),
            idle_timeout_ticks: default_idle_timeout(),
            home_seek_delay: default_home_seek_delay(),
            home_release_delay: default_home_release_delay(),
        }
    }
}

/// Parameter values applied once at build time.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Initial step rate handed to the step clock.
    #[serde(default = "default_speed")]
    pub speed: Speed,

    /// Initial pen pressure handed to the PWM.
    #[serde(default = "default_pressure")]
    pub pressure: Pressure,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            pressure: default_pressure(),
        }
    }
}

fn default_name() -> String<32> {
    String::try_from("cutter").unwrap_or_default()
}

fn default_true() -> bool {
    true
}

fn default_max_x() -> Steps {
    Steps(32_000)
}

fn default_max_y() -> Steps {
    Steps(4_800)
}

fn default_mat_edge() -> Steps {
    Steps(250)
}

fn default_home_lead() -> Steps {
    Steps(100)
}

fn default_settle_ticks() -> u16 {
    50
}

fn default_idle_timeout() -> u16 {
    // roughly a minute at a mid-scale step rate
    30_000
}

fn default_home_seek_delay() -> u16 {
    1
}

fn default_home_release_delay() -> u16 {
    4
}

fn default_speed() -> Speed {
    Speed(5)
}

fn default_pressure() -> Pressure {
    Pressure::MAX
}
