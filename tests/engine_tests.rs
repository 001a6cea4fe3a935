//! Waveform engine tests
//!
//! Drives `step` and `WaveformEngine` with synthetic inputs and recording
//! outputs; no hardware involved.

use std::collections::HashSet;

use rust_three_phase_spwm::config::GeneratorConfig;
use rust_three_phase_spwm::engine::{step, EngineMode, EngineState, TickInput, WaveformEngine};
use rust_three_phase_spwm::hal::{DutyOutputs, PeriodTimer};
use rust_three_phase_spwm::logging::{LogLevel, LogStream};
use rust_three_phase_spwm::{Diagnostics, Phase, PeriodError, TargetFrequency, SINE_LUT};

/// Records every duty write in order.
#[derive(Default)]
struct Registers {
    writes: Vec<(Phase, u8)>,
}

impl DutyOutputs for Registers {
    fn set_duty(&mut self, phase: Phase, duty: u8) {
        self.writes.push((phase, duty));
    }
}

/// Records every period write.
#[derive(Default)]
struct Timer {
    periods: Vec<u32>,
}

impl PeriodTimer for Timer {
    fn set_period(&mut self, counts: u32) {
        self.periods.push(counts);
    }
}

/// Lookup position used by a tick that wrote duty.
fn position(next: &EngineState) -> u16 {
    next.index - 1
}

#[test]
fn test_index_cycles_through_full_table() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let mut state = EngineState::new();
    let mut seen = Vec::new();

    for _ in 0..256 {
        let (next, writes) = step(&config, state, TickInput::at(60.0));
        assert!(writes.duty.is_some());
        seen.push(position(&next));
        state = next;
    }

    let distinct: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(distinct.len(), 256);
    assert_eq!(seen, (0..256).collect::<Vec<u16>>());

    // Tick 257 starts over
    let (next, _) = step(&config, state, TickInput::at(60.0));
    assert_eq!(position(&next), 0);
}

#[test]
fn test_duty_sequence_periodic() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let mut state = EngineState::new();
    let mut duties = Vec::new();

    for _ in 0..512 {
        let (next, writes) = step(&config, state, TickInput::at(30.0));
        duties.push(writes.duty.unwrap());
        state = next;
    }

    for i in 0..256 {
        assert_eq!(duties[i], duties[i + 256], "tick {}", i);
        assert_eq!(duties[i][0], SINE_LUT[i]);
    }
}

#[test]
fn test_legacy_span_walks_255_entries_with_dead_tick() {
    let config = GeneratorConfig::LEGACY_DIVISOR;
    let mut state = EngineState::new();
    let mut positions = HashSet::new();
    let mut dead = 0;

    // Two full cycles: 255 writes + 1 dead tick each
    for _ in 0..512 {
        let (next, writes) = step(&config, state, TickInput::at(120.0));
        if writes.events.dead_tick {
            dead += 1;
            assert_eq!(writes.duty, None);
        } else {
            positions.insert(position(&next));
        }
        state = next;
    }

    assert_eq!(dead, 2);
    assert_eq!(positions.len(), 255);
    assert!(!positions.contains(&255));
}

#[test]
fn test_legacy_divisor_duty_values() {
    // 60 Hz → 4 counts → divisor 64
    let config = GeneratorConfig::LEGACY_DIVISOR;
    let (_, writes) = step(&config, EngineState::new(), TickInput::at(60.0));
    assert_eq!(writes.period, Some(4));
    assert_eq!(writes.duty, Some([0x80 / 64, 0xEF / 64, 0x12 / 64]));
}

#[test]
fn test_frequency_change_keeps_index() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let mut state = EngineState::new();
    for _ in 0..40 {
        state = step(&config, state, TickInput::at(10.0)).0;
    }
    assert_eq!(state.period, Some(24));

    // New target takes effect on the next tick without a phase jump
    let (next, writes) = step(&config, state, TickInput::at(120.0));
    assert_eq!(writes.period, Some(2));
    assert_eq!(position(&next), 40);
    assert_eq!(writes.duty, Some([SINE_LUT[40], SINE_LUT[125], SINE_LUT[210]]));
}

#[test]
fn test_same_target_writes_identical_period() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let mut state = EngineState::new();
    let mut periods = HashSet::new();

    for _ in 0..2000 {
        let (next, writes) = step(&config, state, TickInput::at(47.3));
        periods.insert(writes.period.unwrap());
        state = next;
    }

    assert_eq!(periods.len(), 1);
}

#[test]
fn test_unrepresentable_period_holds_previous() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let (state, _) = step(&config, EngineState::new(), TickInput::at(120.0));
    assert_eq!(state.period, Some(2));

    // Far above what Timer2 can express: keep stepping at 2 counts
    let (next, writes) = step(&config, state, TickInput::at(1000.0));
    assert_eq!(writes.events.suppressed, Some(PeriodError::BelowMinimumStep));
    assert_eq!(writes.period, None);
    assert!(writes.duty.is_some());
    assert_eq!(next.period, Some(2));
    assert_eq!(next.index, state.index + 1);
}

#[test]
fn test_resume_after_park() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let mut state = EngineState::new();
    for _ in 0..5 {
        state = step(&config, state, TickInput::at(60.0)).0;
    }

    for _ in 0..10 {
        let (next, writes) = step(&config, state, TickInput::at(0.0));
        assert_eq!(writes.duty, None);
        state = next;
    }
    assert_eq!(state.index, 5);
    assert_eq!(state.mode, EngineMode::Running);

    let (next, writes) = step(&config, state, TickInput::at(60.0));
    assert!(!writes.events.started);
    assert_eq!(position(&next), 5);
}

#[test]
fn test_apply_writes_period_then_phases() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let (_, writes) = step(&config, EngineState::new(), TickInput::at(120.0));

    let mut outputs = Registers::default();
    let mut timer = Timer::default();
    writes.apply(&mut outputs, &mut timer);

    assert_eq!(timer.periods, vec![2]);
    assert_eq!(
        outputs.writes,
        vec![(Phase::A, 0x80), (Phase::B, 0xEF), (Phase::C, 0x12)]
    );
}

#[test]
fn test_apply_nothing_when_unpublished() {
    let config = GeneratorConfig::ARDUINO_UNO;
    let (_, writes) = step(&config, EngineState::new(), TickInput::default());

    let mut outputs = Registers::default();
    let mut timer = Timer::default();
    writes.apply(&mut outputs, &mut timer);

    assert!(outputs.writes.is_empty());
    assert!(timer.periods.is_empty());
}

#[test]
fn test_engine_counts_and_logs_edges() {
    let target = TargetFrequency::new();
    let diag = Diagnostics::new();
    let log: LogStream = LogStream::new();
    let mut engine = WaveformEngine::new(GeneratorConfig::ARDUINO_UNO, &target, &diag, &log);

    // Unpublished ticks count but do nothing
    engine.on_tick(0, None);
    assert_eq!(engine.state().mode, EngineMode::Idle);

    target.publish(120.0);
    for t in 1..=100 {
        engine.on_tick(t, None);
    }
    target.publish(0.0);
    for t in 101..=110 {
        engine.on_tick(t, None);
    }

    let snap = diag.snapshot();
    assert_eq!(snap.ticks, 111);
    assert_eq!(snap.suppressed, 10);
    assert_eq!(snap.dead_ticks, 0);

    // One line per edge, not per tick
    let mut lines = Vec::new();
    while let Some(entry) = log.drain() {
        lines.push((entry.level, entry.text().to_string()));
    }
    assert_eq!(lines.len(), 2, "{:?}", lines);
    assert_eq!(lines[0].0, LogLevel::Info);
    assert!(lines[0].1.starts_with("running: target 120.00 Hz, period 2 counts"));
    assert!(lines[1].1.contains("parked"));
}

#[test]
fn test_engine_clamp_counted_and_logged_once() {
    let target = TargetFrequency::new();
    let diag = Diagnostics::new();
    let log: LogStream = LogStream::new();
    let mut engine = WaveformEngine::new(GeneratorConfig::ARDUINO_UNO, &target, &diag, &log);

    // 0.5 Hz wants 488 counts on an 8-bit register
    target.publish(0.5);
    for t in 0..20 {
        let writes = engine.on_tick(t, None);
        assert_eq!(writes.period, Some(255));
    }

    assert_eq!(diag.snapshot().clamped, 20);
    let warnings = std::iter::from_fn(|| log.drain())
        .filter(|e| e.level == LogLevel::Warn)
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn test_engine_late_ticks_counted() {
    let target = TargetFrequency::new();
    let diag = Diagnostics::new();
    let log: LogStream = LogStream::new();
    let mut engine = WaveformEngine::new(GeneratorConfig::ARDUINO_UNO, &target, &diag, &log);

    target.publish(60.0);
    engine.on_tick(0, None);
    engine.on_tick(1, Some(4));
    engine.on_tick(2, Some(11));

    assert_eq!(diag.snapshot().late_ticks, 1);
}
