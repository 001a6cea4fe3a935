//! Variant presets.

use super::{
    ControllerConfig, DutyScaling, FrequencySource, GeneratorConfig, PeriodLaw, RegisterWidth,
    TimerConfig, WrapPolicy,
};
use crate::wave::{PhaseOffsets, LUT_SIZE};

/// 0–120 Hz over a 10-bit potentiometer reading, sampled every 200 ms.
const POT_0_TO_120_HZ: ControllerConfig = ControllerConfig {
    max_frequency_hz: 120.0,
    full_scale: 1023,
    interval_ms: 200,
};

/// 16 MHz ATmega328P, Timer2 in CTC mode with a /256 prescaler.
const UNO_TIMER2_DIV256: TimerConfig = TimerConfig {
    clock_hz: 16_000_000,
    prescaler: 256,
    register: RegisterWidth::Bits8,
    law: PeriodLaw::RoundedQuotient,
};

impl GeneratorConfig {
    /// Canonical design: full 256-entry walk, no dead tick, unscaled duty.
    pub const ARDUINO_UNO: Self = Self {
        timer: UNO_TIMER2_DIV256,
        table_span: LUT_SIZE as u16,
        wrap: WrapPolicy::Continue,
        scaling: DutyScaling::Unscaled,
        offsets: PhaseOffsets::THREE_PHASE,
        controller: POT_0_TO_120_HZ,
        source: FrequencySource::Potentiometer,
    };

    /// Bit-parity with the prescaled sketch: 255-entry walk, dead tick on
    /// wrap, duty divided by `256 / OCR2A`.
    pub const LEGACY_DIVISOR: Self = Self {
        timer: UNO_TIMER2_DIV256,
        table_span: (LUT_SIZE - 1) as u16,
        wrap: WrapPolicy::DeadTick,
        scaling: DutyScaling::LegacyDivisor,
        offsets: PhaseOffsets::THREE_PHASE,
        controller: POT_0_TO_120_HZ,
        source: FrequencySource::Potentiometer,
    };

    /// Unprescaled sketch: `OCR2A = sysCLK / round(f * 256)` on a wide register.
    pub const LEGACY_UNPRESCALED: Self = Self {
        timer: TimerConfig {
            clock_hz: 16_000_000,
            prescaler: 1,
            register: RegisterWidth::Bits16,
            law: PeriodLaw::RoundedStepRate,
        },
        table_span: (LUT_SIZE - 1) as u16,
        wrap: WrapPolicy::DeadTick,
        scaling: DutyScaling::Unscaled,
        offsets: PhaseOffsets::THREE_PHASE,
        controller: POT_0_TO_120_HZ,
        source: FrequencySource::Potentiometer,
    };

    /// Fixed 1/2 Hz output, no potentiometer.
    pub const FIXED_HALF_HZ: Self = Self {
        timer: TimerConfig {
            clock_hz: 16_000_000,
            prescaler: 1024,
            register: RegisterWidth::Bits8,
            law: PeriodLaw::RoundedQuotient,
        },
        source: FrequencySource::Fixed(0.5),
        ..Self::ARDUINO_UNO
    };

    /// ESP32 timer group at 1 MHz (80 MHz APB / 80), 16-bit period range.
    pub const ESP32: Self = Self {
        timer: TimerConfig {
            clock_hz: 80_000_000,
            prescaler: 80,
            register: RegisterWidth::Bits16,
            law: PeriodLaw::RoundedQuotient,
        },
        ..Self::ARDUINO_UNO
    };
}
