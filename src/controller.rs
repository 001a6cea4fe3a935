//! Frequency controller: potentiometer → target frequency.
//!
//! Runs in the foreground loop at a low rate (every ~200 ms). Each tick
//! reads the analog input, maps it to 0–120 Hz, publishes it for the engine
//! and prints a status line. Blocking between ticks is fine; nothing here
//! has a deadline.

use core::fmt;

use crate::config::ControllerConfig;
use crate::diagnostics::{DiagEvent, Diagnostics};
use crate::hal::{AnalogInput, TextSink};
use crate::logging::{format_to_buffer, LogStream};
use crate::shared::{CancelToken, TargetFrequency};
use crate::timing::frequency_from_raw;

/// Status line buffer size ("Frequency: 120.00\r" plus slack).
const STATUS_LEN: usize = 32;

/// Controller tick failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError<E> {
    /// A01: Analog conversion failed; the previous target stays published
    AnalogRead(E),
}

impl<E> ControllerError<E> {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::AnalogRead(_) => "A01",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::AnalogRead(_) => "analog read failed",
        }
    }
}

impl<E: fmt::Debug> fmt::Display for ControllerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnalogRead(e) => write!(f, "{}: {} ({:?})", self.code(), self.message(), e),
        }
    }
}

/// Format the status line: `Frequency: <hz with 2 decimals>\r`.
///
/// Returns the number of bytes written.
pub fn format_status(buf: &mut [u8], hz: f32) -> usize {
    format_to_buffer(buf, format_args!("Frequency: {:.2}\r", hz))
}

/// Potentiometer-driven frequency controller.
pub struct FrequencyController<'a, A, W, const L: usize = { crate::logging::LOG_BUFFER_SIZE }> {
    config: ControllerConfig,
    input: A,
    sink: W,
    target: &'a TargetFrequency,
    diag: &'a Diagnostics,
    log: &'a LogStream<L>,
    last_raw: Option<u16>,
}

impl<'a, A, W, const L: usize> FrequencyController<'a, A, W, L>
where
    A: AnalogInput,
    A::Error: fmt::Debug,
    W: TextSink,
{
    pub fn new(
        config: ControllerConfig,
        input: A,
        sink: W,
        target: &'a TargetFrequency,
        diag: &'a Diagnostics,
        log: &'a LogStream<L>,
    ) -> Self {
        Self {
            config,
            input,
            sink,
            target,
            diag,
            log,
            last_raw: None,
        }
    }

    /// Sample, publish, report.
    ///
    /// On a failed read nothing is published and no status line is written.
    pub fn tick(&mut self, now_us: i64) -> Result<f32, ControllerError<A::Error>> {
        let raw = match self.input.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                self.diag.record(DiagEvent::AnalogReadFailed);
                crate::rt_warn!(self.log, now_us, "analog read failed: {:?}", e);
                return Err(ControllerError::AnalogRead(e));
            }
        };

        let hz = frequency_from_raw(raw, &self.config);
        self.target.publish(hz);

        if self.last_raw != Some(raw) {
            crate::rt_debug!(self.log, now_us, "raw {} -> {:.2} Hz", raw, hz);
            self.last_raw = Some(raw);
        }

        let mut buf = [0u8; STATUS_LEN];
        let len = format_status(&mut buf, hz);
        if let Ok(line) = core::str::from_utf8(&buf[..len]) {
            self.sink.write_line(line);
        }

        Ok(hz)
    }

    /// Tick until `cancel` is set.
    ///
    /// `now_us` supplies timestamps, `sleep_ms` blocks between ticks.
    /// Read failures are logged and counted, never fatal. Returns the number
    /// of ticks run.
    pub fn run<C, S>(&mut self, cancel: &CancelToken, mut now_us: C, mut sleep_ms: S) -> u32
    where
        C: FnMut() -> i64,
        S: FnMut(u32),
    {
        let mut ticks = 0u32;
        while !cancel.is_cancelled() {
            let _ = self.tick(now_us());
            ticks = ticks.wrapping_add(1);
            sleep_ms(self.config.interval_ms);
        }
        ticks
    }

    /// Give back the collaborators.
    pub fn free(self) -> (A, W) {
        (self.input, self.sink)
    }
}
