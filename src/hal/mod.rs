//! Hardware seams.
//!
//! The core never touches a peripheral. Board code implements these traits;
//! tests implement them with recorders.

use crate::wave::Phase;

/// Potentiometer (or any analog source) normalized to `[0, full_scale]`.
pub trait AnalogInput {
    type Error;

    /// One blocking conversion.
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Fire-and-forget text output (serial console).
///
/// Text is written verbatim; the caller supplies the line terminator.
/// No acknowledgement, no backpressure: a sink may drop text silently.
pub trait TextSink {
    fn write_line(&mut self, line: &str);
}

impl<T: TextSink + ?Sized> TextSink for &mut T {
    #[inline]
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line)
    }
}

/// Three PWM compare registers, one per phase. Write-only.
pub trait DutyOutputs {
    fn set_duty(&mut self, phase: Phase, duty: u8);
}

/// Compare/reload register of the stepping timer. Write-only.
pub trait PeriodTimer {
    /// Program the next period in timer counts (always `>= 1`).
    fn set_period(&mut self, counts: u32);
}
