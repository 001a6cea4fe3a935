//! Three-phase offsets into the shared sine table.
//!
//! One table, three readers: each channel reads the table at the rolling
//! index shifted by a fixed offset. 85 and 170 approximate N/3 and 2N/3
//! for N = 256, so the phases sit ~120° apart (119.5° and 239.1°).

use super::lut::{sample, LUT_SIZE};

/// Output channel (one per phase).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    A = 0,
    B = 1,
    C = 2,
}

impl Phase {
    /// All phases in output order.
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Channel slot (0, 1, 2).
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// Table offsets for the three channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseOffsets {
    offsets: [u16; 3],
}

impl PhaseOffsets {
    /// 0 / 85 / 170 entries.
    pub const THREE_PHASE: Self = Self {
        offsets: [0, 85, 170],
    };

    /// Custom offsets. Values are reduced modulo the table length.
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        let n = LUT_SIZE as u16;
        Self {
            offsets: [a % n, b % n, c % n],
        }
    }

    /// Offset for one channel.
    #[inline]
    pub fn get(&self, phase: Phase) -> u16 {
        self.offsets[phase.slot()]
    }

    /// Raw offsets in channel order.
    #[inline]
    pub fn as_array(&self) -> [u16; 3] {
        self.offsets
    }

    /// Table samples for all three channels at `index`.
    #[inline]
    pub fn samples_at(&self, index: usize) -> [u8; 3] {
        [
            sample(index + self.offsets[0] as usize),
            sample(index + self.offsets[1] as usize),
            sample(index + self.offsets[2] as usize),
        ]
    }
}

impl Default for PhaseOffsets {
    fn default() -> Self {
        Self::THREE_PHASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_wrap_past_table_end() {
        let offsets = PhaseOffsets::THREE_PHASE;
        // 200 + 170 = 370 → 114
        assert_eq!(offsets.samples_at(200)[2], sample(114));
    }

    #[test]
    fn test_custom_offsets_reduced() {
        let offsets = PhaseOffsets::new(256, 341, 426);
        assert_eq!(offsets.as_array(), [0, 85, 170]);
    }
}
