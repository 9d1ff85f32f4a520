//! Coil phase table for unipolar stepper drive.
//!
//! Each axis motor has four coils, each with a half-current and a
//! full-current drive line packed into one 8-bit port. Sixteen microstep
//! phases per electrical cycle blend neighbouring coils: a coil ramps
//! half, full, full-with-neighbour, then hands over. The low four bits of
//! the axis position index the table, so the pattern follows position
//! automatically in both directions.

use crate::config::units::Steps;

/// Half-current line, coil 0.
pub const COIL0_HALF: u8 = 0x01;
/// Full-current line, coil 0.
pub const COIL0_FULL: u8 = 0x02;
/// Half-current line, coil 1.
pub const COIL1_HALF: u8 = 0x04;
/// Full-current line, coil 1.
pub const COIL1_FULL: u8 = 0x08;
/// Half-current line, coil 2.
pub const COIL2_HALF: u8 = 0x10;
/// Full-current line, coil 2.
pub const COIL2_FULL: u8 = 0x20;
/// Half-current line, coil 3.
pub const COIL3_HALF: u8 = 0x40;
/// Full-current line, coil 3.
pub const COIL3_FULL: u8 = 0x80;

/// All drive lines released; the motor is unpowered and holds no torque.
pub const COILS_OFF: u8 = 0x00;

/// Microstep phases per electrical cycle.
pub const PHASE_COUNT: usize = 16;

/// The drive pattern for each of the sixteen phases.
///
/// Quarter-cycle per coil: full current alone, then blended with the next
/// coil's half and full current, then tapering to half while the next coil
/// carries full.
pub const PHASE_PATTERNS: [u8; PHASE_COUNT] = [
    COIL0_FULL,
    COIL0_FULL | COIL1_HALF,
    COIL0_FULL | COIL1_FULL,
    COIL0_HALF | COIL1_FULL,
    COIL1_FULL,
    COIL1_FULL | COIL2_HALF,
    COIL1_FULL | COIL2_FULL,
    COIL1_HALF | COIL2_FULL,
    COIL2_FULL,
    COIL2_FULL | COIL3_HALF,
    COIL2_FULL | COIL3_FULL,
    COIL2_HALF | COIL3_FULL,
    COIL3_FULL,
    COIL3_FULL | COIL0_HALF,
    COIL3_FULL | COIL0_FULL,
    COIL3_HALF | COIL0_FULL,
];

/// Look up the drive pattern for an axis position.
///
/// Indexes by the low four position bits; two's-complement AND makes
/// negative positions wrap the same cycle, so pre-home travel steps the
/// motor identically.
#[inline]
pub fn coil_pattern(position: Steps) -> u8 {
    PHASE_PATTERNS[(position.value() & 0xF) as usize]
}
