//! Waveform data: the sine table and the three-phase offsets.
//!
//! Architecture:
//! - One 256-entry u8 table, built at compile time, never mutated
//! - Three channels share it through fixed index offsets (0, 85, 170)

pub mod lut;
pub mod phase;

pub use lut::{sample, LUT_MIDPOINT, LUT_SIZE, SINE_LUT};
pub use phase::{Phase, PhaseOffsets};
