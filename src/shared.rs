//! Target frequency handoff between the controller loop and the engine ISR.
//!
//! # Rules
//!
//! - Single writer (controller), single reader (engine tick)
//! - The value is one naturally aligned 32-bit word: an `f32` stored as its
//!   bit pattern in an `AtomicU32`, so a torn read is impossible
//! - Load and store never block and never spin

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Bit pattern reserved for "nothing published yet".
///
/// A NaN with all mantissa bits set; `f32::NAN` and arithmetic NaNs never
/// produce it.
const UNPUBLISHED: u32 = u32::MAX;

/// Lock-free single-word frequency cell.
///
/// # Usage
///
/// ```
/// use rust_three_phase_spwm::shared::TargetFrequency;
///
/// static TARGET: TargetFrequency = TargetFrequency::new();
///
/// assert_eq!(TARGET.load(), None);
/// TARGET.publish(60.0);
/// assert_eq!(TARGET.load(), Some(60.0));
/// ```
pub struct TargetFrequency {
    bits: AtomicU32,
}

impl TargetFrequency {
    /// Create an empty cell (engine stays IDLE until the first publish).
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(UNPUBLISHED),
        }
    }

    /// Publish a new target in Hz.
    #[inline]
    pub fn publish(&self, hz: f32) {
        self.bits.store(hz.to_bits(), Ordering::Release);
    }

    /// Latest published target, or `None` before the first publish.
    #[inline]
    pub fn load(&self) -> Option<f32> {
        match self.bits.load(Ordering::Acquire) {
            UNPUBLISHED => None,
            bits => Some(f32::from_bits(bits)),
        }
    }
}

impl Default for TargetFrequency {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative stop flag for the foreground loop.
///
/// The firmware never sets it; host runs and tests use it to bound the loop.
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
