//! Frequency ↔ timer period conversion.
//!
//! Pure arithmetic, no hardware dependencies.
//!
//! # Relations
//!
//! ```text
//! step rate  = f * N                     (table entries per second)
//! period     = clock / (prescaler * f * N)   (timer counts per entry)
//! f(actual)  = clock / (prescaler * N * period)
//! ```
//!
//! The period is rounded to the nearest count (C `round`, halves away from
//! zero) and clamped to the register range. A period that would round to 0
//! is never produced.

use crate::config::{ControllerConfig, PeriodLaw, TimerConfig};
use crate::wave::LUT_SIZE;

/// A period ready to be written to the compare register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    /// Timer counts per table step, in `[1, register max]`.
    pub counts: u32,
    /// True if the exact value exceeded the register and was clamped.
    pub clamped: bool,
}

/// Why no period could be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodError {
    /// P01: Frequency is zero (or not a positive number)
    ZeroFrequency,
    /// P02: Frequency too high, period rounds to 0 counts
    BelowMinimumStep,
}

impl PeriodError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroFrequency => "P01",
            Self::BelowMinimumStep => "P02",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ZeroFrequency => "zero frequency",
            Self::BelowMinimumStep => "period below one count",
        }
    }
}

impl core::fmt::Display for PeriodError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Map a raw analog sample to a target frequency.
///
/// `(s * max) / full_scale`. The multiplication comes first; samples above
/// full scale are treated as full scale.
#[inline]
pub fn frequency_from_raw(raw: u16, controller: &ControllerConfig) -> f32 {
    let s = raw.min(controller.full_scale) as f32;
    (s * controller.max_frequency_hz) / controller.full_scale as f32
}

/// Timer period for a target frequency.
///
/// Non-increasing in `frequency`. Returns an error instead of a zero or
/// undefined period; callers keep the previous register value.
pub fn period_for_frequency(frequency: f32, timer: &TimerConfig) -> Result<Period, PeriodError> {
    // NaN and negatives land here too
    if !(frequency > 0.0) {
        return Err(PeriodError::ZeroFrequency);
    }

    let counts = match timer.law {
        PeriodLaw::RoundedQuotient => {
            let divisor = frequency * (timer.prescaler as f32 * LUT_SIZE as f32);
            let exact = timer.clock_hz as f32 / divisor;
            let rounded = libm::roundf(exact);
            if rounded < 1.0 {
                return Err(PeriodError::BelowMinimumStep);
            }
            // Saturating cast; infinities from tiny frequencies become u32::MAX
            rounded as u32
        }
        PeriodLaw::RoundedStepRate => {
            let step_rate = libm::roundf(frequency * LUT_SIZE as f32);
            if step_rate < 1.0 {
                return Err(PeriodError::BelowMinimumStep);
            }
            let counts = (timer.clock_hz / timer.prescaler) / step_rate as u32;
            if counts == 0 {
                return Err(PeriodError::BelowMinimumStep);
            }
            counts
        }
    };

    let max = timer.register.max();
    Ok(Period {
        counts: counts.min(max),
        clamped: counts > max,
    })
}

/// Output frequency actually produced by a programmed period.
///
/// `None` for a zero period (timer not running).
#[inline]
pub fn frequency_for_period(counts: u32, timer: &TimerConfig) -> Option<f32> {
    if counts == 0 {
        return None;
    }
    let steps = timer.prescaler as f32 * LUT_SIZE as f32 * counts as f32;
    Some(timer.clock_hz as f32 / steps)
}
