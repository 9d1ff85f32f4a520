//! Unit types for machine quantities.
//!
//! Provides type-safe representations of step positions, coordinate pairs,
//! speed settings, and pen pressure to prevent unit confusion at compile time.

use core::ops::{Add, Mul, Neg, Sub};

use serde::Deserialize;

use crate::error::ConfigError;

/// Axis position in microsteps (absolute from the homed origin).
///
/// Negative values below zero are reserved for the pre-home travel zone:
/// the mat-edge margin on X and the home-switch approach lead on Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Steps(pub i32);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Get absolute value as u32.
    #[inline]
    pub fn abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Checked addition, `None` on i32 overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Steps {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i32> for Steps {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// A machine coordinate pair in steps.
///
/// X is the mat-feed axis, Y the carriage axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    /// Mat-feed axis position.
    pub x: Steps,
    /// Carriage axis position.
    pub y: Steps,
}

impl Point {
    /// The absolute origin `(0, 0)`.
    pub const ORIGIN: Self = Self {
        x: Steps(0),
        y: Steps(0),
    };

    /// Create a new point.
    #[inline]
    pub const fn new(x: Steps, y: Steps) -> Self {
        Self { x, y }
    }

    /// Create a point from raw step counts.
    #[inline]
    pub const fn steps(x: i32, y: i32) -> Self {
        Self {
            x: Steps(x),
            y: Steps(y),
        }
    }

    /// Translate by an offset, `None` if either axis overflows i32.
    #[inline]
    pub fn checked_translate(self, offset: Point) -> Option<Point> {
        Some(Point {
            x: self.x.checked_add(offset.x)?,
            y: self.y.checked_add(offset.y)?,
        })
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Step-rate setting forwarded to the tick source.
///
/// The scale is owned by the [`StepClock`](crate::hal::StepClock)
/// implementation; higher means faster. Front panels typically step this
/// up and down by one around a mid-scale default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Speed(pub u8);

impl Speed {
    /// Create a new Speed value.
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Pen (or blade) pressure as a 10-bit PWM setting.
///
/// Applied to the pressure PWM as a `value / 1023` duty fraction.
/// Validated at construction to stay within the 10-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pressure(u16);

impl Pressure {
    /// Full pressure (maximum duty).
    pub const MAX: Self = Self(1023);

    /// Create a new Pressure value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPressure` if the value exceeds the
    /// 10-bit range.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if value <= Self::MAX.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidPressure(value))
        }
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Pressure {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Pressure {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Pressure::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
