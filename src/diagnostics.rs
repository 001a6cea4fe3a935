//! Advisory counters for the waveform engine.
//!
//! # Philosophy
//!
//! > A missed deadline is phase distortion, not a fault.
//!
//! Nothing here stops the engine or asks for a retry. The ISR bumps
//! counters, the foreground loop reads a snapshot when it wants to report.

use core::sync::atomic::{AtomicU32, Ordering};

/// Kind of advisory event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagEvent {
    /// Period update suppressed (zero frequency or period below one count).
    PeriodSuppressed = 0,

    /// Period exceeded the register and was clamped.
    PeriodClamped = 1,

    /// Wrap tick with no duty update.
    DeadTick = 2,

    /// Timer fired later than the programmed period.
    LateTick = 3,

    /// Analog input read failed; previous target kept.
    AnalogReadFailed = 4,

    /// PWM duty register write failed; the channel keeps its previous duty.
    OutputWriteFailed = 5,
}

/// Thread-safe advisory counters.
///
/// # Usage
///
/// ```ignore
/// static DIAG: Diagnostics = Diagnostics::new();
///
/// // In the engine tick:
/// DIAG.record(DiagEvent::PeriodClamped);
///
/// // In the status loop:
/// let snap = DIAG.snapshot();
/// ```
pub struct Diagnostics {
    /// Total engine ticks since boot (wrapping).
    ticks: AtomicU32,

    /// Per-event counters, indexed by `DiagEvent`.
    events: [AtomicU32; 6],
}

impl Diagnostics {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            events: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
        }
    }

    /// Count one engine tick.
    #[inline]
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one event.
    #[inline]
    pub fn record(&self, event: DiagEvent) {
        self.events[event as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Current count for one event.
    #[inline]
    pub fn count(&self, event: DiagEvent) -> u32 {
        self.events[event as usize].load(Ordering::Relaxed)
    }

    /// Total ticks.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> DiagSnapshot {
        DiagSnapshot {
            ticks: self.ticks(),
            suppressed: self.count(DiagEvent::PeriodSuppressed),
            clamped: self.count(DiagEvent::PeriodClamped),
            dead_ticks: self.count(DiagEvent::DeadTick),
            late_ticks: self.count(DiagEvent::LateTick),
            read_failures: self.count(DiagEvent::AnalogReadFailed),
            output_failures: self.count(DiagEvent::OutputWriteFailed),
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagSnapshot {
    pub ticks: u32,
    pub suppressed: u32,
    pub clamped: u32,
    pub dead_ticks: u32,
    pub late_ticks: u32,
    pub read_failures: u32,
    pub output_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_basic() {
        let diag = Diagnostics::new();
        assert_eq!(diag.snapshot(), DiagSnapshot::default());

        diag.tick();
        diag.tick();
        diag.record(DiagEvent::PeriodClamped);
        diag.record(DiagEvent::LateTick);
        diag.record(DiagEvent::LateTick);

        let snap = diag.snapshot();
        assert_eq!(snap.ticks, 2);
        assert_eq!(snap.clamped, 1);
        assert_eq!(snap.late_ticks, 2);
        assert_eq!(snap.suppressed, 0);
        assert_eq!(snap.output_failures, 0);
    }

    #[test]
    fn test_output_write_failures_counted_separately() {
        let diag = Diagnostics::new();
        diag.record(DiagEvent::OutputWriteFailed);
        diag.record(DiagEvent::OutputWriteFailed);
        diag.record(DiagEvent::AnalogReadFailed);

        let snap = diag.snapshot();
        assert_eq!(snap.output_failures, 2);
        assert_eq!(snap.read_failures, 1);
        assert_eq!(diag.count(DiagEvent::OutputWriteFailed), 2);
    }
}
