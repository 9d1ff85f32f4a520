//! Error types for the cutter-motion library.
//!
//! Provides unified error handling across configuration and machine control.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all cutter-motion operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Machine operation error
    Machine(MachineError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid travel extent (must be > 0)
    InvalidTravelExtent {
        /// Axis label, `'x'` or `'y'`
        axis: char,
        /// Configured extent in steps
        value: i32,
    },
    /// Invalid mat edge margin (must be > 0)
    InvalidMatEdge(i32),
    /// Invalid home approach lead (must be > 0 and within the Y travel)
    InvalidHomeLead(i32),
    /// Invalid pen pressure (must be 0-1023)
    InvalidPressure(u16),
    /// Invalid settle delay (must be > 0 ticks)
    InvalidSettleTicks(u16),
    /// Invalid homing step delay (must be > 0 ticks)
    InvalidHomingDelay(u16),
    /// Invalid idle power-down timeout (must be > 0 ticks)
    InvalidIdleTimeout(u16),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Machine operation errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineError {
    /// Command queue is not drained; the requested operation needs an idle queue
    Busy,
    /// Position reference not established (home and load media first)
    NotHomed,
    /// Pin or PWM operation failed
    PinError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Machine(e) => write!(f, "Machine error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidTravelExtent { axis, value } => {
                write!(f, "Invalid {} travel extent: {}. Must be > 0", axis, value)
            }
            ConfigError::InvalidMatEdge(v) => {
                write!(f, "Invalid mat edge margin: {}. Must be > 0", v)
            }
            ConfigError::InvalidHomeLead(v) => {
                write!(f, "Invalid home lead: {}. Must be > 0 and within Y travel", v)
            }
            ConfigError::InvalidPressure(v) => {
                write!(f, "Invalid pressure: {}. Must be 0-1023", v)
            }
            ConfigError::InvalidSettleTicks(v) => {
                write!(f, "Invalid settle delay: {} ticks. Must be > 0", v)
            }
            ConfigError::InvalidHomingDelay(v) => {
                write!(f, "Invalid homing step delay: {} ticks. Must be > 0", v)
            }
            ConfigError::InvalidIdleTimeout(v) => {
                write!(f, "Invalid idle timeout: {} ticks. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::Busy => write!(f, "Command queue not drained"),
            MachineError::NotHomed => write!(f, "Position reference not established"),
            MachineError::PinError => write!(f, "GPIO pin or PWM operation failed"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MachineError> for Error {
    fn from(e: MachineError) -> Self {
        Error::Machine(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MachineError {}
