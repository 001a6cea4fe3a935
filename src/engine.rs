//! Waveform engine: the timer-interrupt table walker.
//!
//! Pure logic, no hardware dependencies. Consumes the published target
//! frequency, produces register writes. Fully testable on host.
//!
//! # Tick order
//!
//! 1. Read the target frequency (one atomic load)
//! 2. Recompute the timer period; zero frequency parks the outputs
//! 3. Wrap the index at the table span (optionally as a dead tick)
//! 4. Write three duty values from table offsets 0 / 85 / 170
//! 5. Advance the index
//!
//! # States
//!
//! ```text
//!            first valid period
//!   IDLE ─────────────────────────▶ RUNNING ──┐
//!   (period unset)                     ▲      │ index == span: wrap
//!                                      └──────┘
//! ```
//!
//! The engine is driven from exactly one interrupt source and takes
//! `&mut self`, so a tick cannot be re-entered.

use crate::config::{DutyScaling, GeneratorConfig, WrapPolicy};
use crate::diagnostics::{DiagEvent, Diagnostics};
use crate::hal::{DutyOutputs, PeriodTimer};
use crate::logging::LogStream;
use crate::shared::TargetFrequency;
use crate::timing::{frequency_for_period, period_for_frequency, PeriodError};
use crate::wave::{Phase, LUT_MIDPOINT, LUT_SIZE};

/// Engine mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineMode {
    /// No period programmed yet.
    Idle,
    /// Walking the table.
    Running,
}

/// Everything the engine owns between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineState {
    pub mode: EngineMode,
    /// Next table position, `[0, span]`.
    pub index: u16,
    /// Last period written to the timer.
    pub period: Option<u32>,
    /// Last duty values written, phase order.
    pub duty: [u8; 3],
}

impl EngineState {
    /// Duty held before the first tick: the waveform zero crossing.
    pub const IDLE_DUTY: [u8; 3] = [LUT_MIDPOINT; 3];

    pub const fn new() -> Self {
        Self {
            mode: EngineMode::Idle,
            index: 0,
            period: None,
            duty: Self::IDLE_DUTY,
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs sampled at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    /// Published target, `None` before the controller's first publish.
    pub frequency: Option<f32>,
    /// Timer counts since the previous tick, if the board measures it.
    pub elapsed_counts: Option<u32>,
}

impl TickInput {
    #[inline]
    pub fn at(frequency: f32) -> Self {
        Self {
            frequency: Some(frequency),
            elapsed_counts: None,
        }
    }
}

/// Advisory flags raised by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// IDLE → RUNNING on this tick.
    pub started: bool,
    /// Period not updated, and why.
    pub suppressed: Option<PeriodError>,
    /// Period clamped to the register maximum.
    pub clamped: bool,
    /// Wrap tick without a duty update.
    pub dead_tick: bool,
    /// Previous period ran long.
    pub late: bool,
}

/// Register writes produced by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterWrites {
    /// New compare value for the stepping timer.
    pub period: Option<u32>,
    /// New duty values, phase order.
    pub duty: Option<[u8; 3]>,
    pub events: TickEvents,
}

impl RegisterWrites {
    /// Push the writes to hardware. Registers without a write keep their value.
    #[inline]
    pub fn apply<O: DutyOutputs, T: PeriodTimer>(&self, outputs: &mut O, timer: &mut T) {
        if let Some(counts) = self.period {
            timer.set_period(counts);
        }
        if let Some(duty) = self.duty {
            for phase in Phase::ALL {
                outputs.set_duty(phase, duty[phase.slot()]);
            }
        }
    }
}

/// One engine tick as a pure function.
///
/// `(state, input) → (state', writes)`. No side effects; the ISR wrapper
/// and the tests both go through here.
pub fn step(
    config: &GeneratorConfig,
    state: EngineState,
    input: TickInput,
) -> (EngineState, RegisterWrites) {
    let mut next = state;
    let mut writes = RegisterWrites::default();

    if let (Some(elapsed), Some(period)) = (input.elapsed_counts, state.period) {
        writes.events.late = elapsed > period;
    }

    // Nothing published yet: stay where we are
    let Some(frequency) = input.frequency else {
        return (next, writes);
    };

    match period_for_frequency(frequency, &config.timer) {
        Ok(period) => {
            writes.period = Some(period.counts);
            writes.events.clamped = period.clamped;
            next.period = Some(period.counts);
            if next.mode == EngineMode::Idle {
                next.mode = EngineMode::Running;
                writes.events.started = true;
            }
        }
        Err(err) => {
            writes.events.suppressed = Some(err);
            // Zero frequency parks the outputs; an unrepresentable period
            // keeps stepping at the held one
            if err == PeriodError::ZeroFrequency || next.mode == EngineMode::Idle {
                return (next, writes);
            }
        }
    }

    if next.index >= config.table_span {
        next.index = 0;
        if config.wrap == WrapPolicy::DeadTick {
            writes.events.dead_tick = true;
            return (next, writes);
        }
    }

    let samples = config.offsets.samples_at(next.index as usize);
    let period = next.period.unwrap_or(LUT_SIZE as u32);
    let duty = samples.map(|s| scale_duty(s, config.scaling, period));

    writes.duty = Some(duty);
    next.duty = duty;
    next.index += 1;

    (next, writes)
}

/// Rescale a table sample to the current period.
///
/// The table is written for a full 256-count period; shorter periods shrink
/// the duty in proportion. `LegacyDivisor` keeps the truncating integer
/// divisor (`N / period`), `Proportional` rounds `sample * period / N`.
/// Periods of N counts or more leave the sample untouched.
#[inline]
pub fn scale_duty(sample: u8, scaling: DutyScaling, period: u32) -> u8 {
    let n = LUT_SIZE as u32;
    match scaling {
        DutyScaling::Unscaled => sample,
        DutyScaling::LegacyDivisor => {
            let divisor = n / period.max(1);
            if divisor == 0 {
                sample
            } else {
                (sample as u32 / divisor) as u8
            }
        }
        DutyScaling::Proportional => {
            let p = period.clamp(1, n);
            ((sample as u32 * p + n / 2) / n) as u8
        }
    }
}

/// Interrupt-side engine: state plus its shared collaborators.
///
/// # Example
///
/// ```
/// use rust_three_phase_spwm::config::GeneratorConfig;
/// use rust_three_phase_spwm::diagnostics::Diagnostics;
/// use rust_three_phase_spwm::engine::WaveformEngine;
/// use rust_three_phase_spwm::logging::LogStream;
/// use rust_three_phase_spwm::shared::TargetFrequency;
///
/// let target = TargetFrequency::new();
/// let diag = Diagnostics::new();
/// let log: LogStream = LogStream::new();
/// let mut engine = WaveformEngine::new(GeneratorConfig::ARDUINO_UNO, &target, &diag, &log);
///
/// target.publish(120.0);
/// let writes = engine.on_tick(0, None);
/// assert_eq!(writes.period, Some(2));
/// assert_eq!(writes.duty, Some([0x80, 0xEF, 0x12]));
/// ```
pub struct WaveformEngine<'a, const L: usize = { crate::logging::LOG_BUFFER_SIZE }> {
    config: GeneratorConfig,
    state: EngineState,
    last_events: TickEvents,
    target: &'a TargetFrequency,
    diag: &'a Diagnostics,
    log: &'a LogStream<L>,
}

impl<'a, const L: usize> WaveformEngine<'a, L> {
    pub fn new(
        config: GeneratorConfig,
        target: &'a TargetFrequency,
        diag: &'a Diagnostics,
        log: &'a LogStream<L>,
    ) -> Self {
        Self {
            config,
            state: EngineState::new(),
            last_events: TickEvents::default(),
            target,
            diag,
            log,
        }
    }

    #[inline]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run one tick. Call from the timer ISR, then `apply` the result.
    ///
    /// RT-safe: one atomic load, table reads, relaxed counter bumps and,
    /// on state edges only, a non-blocking log push.
    pub fn on_tick(&mut self, now_us: i64, elapsed_counts: Option<u32>) -> RegisterWrites {
        let input = TickInput {
            frequency: self.target.load(),
            elapsed_counts,
        };
        let (next, writes) = step(&self.config, self.state, input);

        self.record(&writes.events);
        self.log_edges(now_us, input.frequency, &next, &writes.events);

        self.state = next;
        self.last_events = writes.events;
        writes
    }

    fn record(&self, events: &TickEvents) {
        self.diag.tick();
        if events.suppressed.is_some() {
            self.diag.record(DiagEvent::PeriodSuppressed);
        }
        if events.clamped {
            self.diag.record(DiagEvent::PeriodClamped);
        }
        if events.dead_tick {
            self.diag.record(DiagEvent::DeadTick);
        }
        if events.late {
            self.diag.record(DiagEvent::LateTick);
        }
    }

    fn log_edges(&self, now_us: i64, frequency: Option<f32>, next: &EngineState, events: &TickEvents) {
        let prev = &self.last_events;

        if events.started {
            let counts = next.period.unwrap_or(0);
            crate::rt_info!(
                self.log,
                now_us,
                "running: target {:.2} Hz, period {} counts, actual {:.2} Hz",
                frequency.unwrap_or(0.0),
                counts,
                frequency_for_period(counts, &self.config.timer).unwrap_or(0.0)
            );
        }

        match (prev.suppressed, events.suppressed) {
            (None, Some(PeriodError::ZeroFrequency)) => {
                crate::rt_info!(self.log, now_us, "parked: zero frequency");
            }
            (None, Some(err)) => {
                crate::rt_warn!(self.log, now_us, "period held: {}", err);
            }
            (Some(_), None) if !events.started => {
                crate::rt_info!(
                    self.log,
                    now_us,
                    "resumed: period {} counts",
                    next.period.unwrap_or(0)
                );
            }
            _ => {}
        }

        if events.clamped && !prev.clamped {
            crate::rt_warn!(
                self.log,
                now_us,
                "period clamped to {} counts",
                next.period.unwrap_or(0)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: &GeneratorConfig, state: EngineState, hz: f32, ticks: usize) -> EngineState {
        let mut state = state;
        for _ in 0..ticks {
            state = step(config, state, TickInput::at(hz)).0;
        }
        state
    }

    #[test]
    fn test_idle_until_published() {
        let config = GeneratorConfig::ARDUINO_UNO;
        let (state, writes) = step(&config, EngineState::new(), TickInput::default());

        assert_eq!(state, EngineState::new());
        assert_eq!(writes, RegisterWrites::default());
    }

    #[test]
    fn test_zero_before_first_period_stays_idle() {
        let config = GeneratorConfig::ARDUINO_UNO;
        let (state, writes) = step(&config, EngineState::new(), TickInput::at(0.0));

        assert_eq!(state.mode, EngineMode::Idle);
        assert_eq!(writes.period, None);
        assert_eq!(writes.duty, None);
        assert_eq!(writes.events.suppressed, Some(PeriodError::ZeroFrequency));
    }

    #[test]
    fn test_zero_frequency_parks_outputs() {
        let config = GeneratorConfig::ARDUINO_UNO;
        let running = run(&config, EngineState::new(), 60.0, 10);

        let (parked, writes) = step(&config, running, TickInput::at(0.0));
        assert_eq!(writes.period, None);
        assert_eq!(writes.duty, None);
        assert_eq!(parked.index, running.index);
        assert_eq!(parked.duty, running.duty);
        assert_eq!(parked.period, Some(4));
    }

    #[test]
    fn test_continue_wrap_has_no_dead_tick() {
        let config = GeneratorConfig::ARDUINO_UNO;
        let state = run(&config, EngineState::new(), 60.0, 256);
        assert_eq!(state.index, 256);

        let (state, writes) = step(&config, state, TickInput::at(60.0));
        assert_eq!(writes.duty, Some([0x80, 0xEF, 0x12]));
        assert!(!writes.events.dead_tick);
        assert_eq!(state.index, 1);
    }

    #[test]
    fn test_legacy_dead_tick_on_wrap() {
        let config = GeneratorConfig::LEGACY_DIVISOR;
        let state = run(&config, EngineState::new(), 60.0, 255);
        assert_eq!(state.index, 255);

        let (state, writes) = step(&config, state, TickInput::at(60.0));
        assert!(writes.events.dead_tick);
        assert_eq!(writes.duty, None);
        // Period is still refreshed on the dead tick
        assert_eq!(writes.period, Some(4));
        assert_eq!(state.index, 0);
    }

    #[test]
    fn test_legacy_divisor_truncates() {
        // period 2 → divisor 128: 0xEF (239) / 128 = 1
        assert_eq!(scale_duty(0xEF, DutyScaling::LegacyDivisor, 2), 1);
        // period 244 → divisor 1: untouched
        assert_eq!(scale_duty(0xEF, DutyScaling::LegacyDivisor, 244), 0xEF);
        // period above N on a wide register: no scaling
        assert_eq!(scale_duty(0xEF, DutyScaling::LegacyDivisor, 6250), 0xEF);
    }

    #[test]
    fn test_proportional_rounds() {
        // 255 * 128 / 256 = 127.5 → 128
        assert_eq!(scale_duty(0xFF, DutyScaling::Proportional, 128), 128);
        assert_eq!(scale_duty(0xFF, DutyScaling::Proportional, 256), 0xFF);
        assert_eq!(scale_duty(0xFF, DutyScaling::Proportional, 9999), 0xFF);
        assert_eq!(scale_duty(0x00, DutyScaling::Proportional, 2), 0);
    }

    #[test]
    fn test_late_tick_flag() {
        let config = GeneratorConfig::ARDUINO_UNO;
        let state = run(&config, EngineState::new(), 60.0, 1);

        let input = TickInput {
            frequency: Some(60.0),
            elapsed_counts: Some(9),
        };
        let (_, writes) = step(&config, state, input);
        assert!(writes.events.late);

        let input = TickInput {
            frequency: Some(60.0),
            elapsed_counts: Some(4),
        };
        let (_, writes) = step(&config, state, input);
        assert!(!writes.events.late);
    }
}
