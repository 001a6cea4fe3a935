//! Module: config
//!
//! Purpose: Compile-time tunables for the generator.
//!
//! Architecture:
//! - `GeneratorConfig`: single source of truth, built once at startup
//! - presets.rs: board/variant presets (`ARDUINO_UNO`, `ESP32`, legacy parity)
//! - `validate()` rejects combinations the engine cannot run
//!
//! Safety: RT-safe. Config is `Copy` and read-only after startup.

mod presets;

use crate::wave::{PhaseOffsets, LUT_SIZE};

/// Width of the timer compare/reload register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterWidth {
    Bits8,
    Bits16,
}

impl RegisterWidth {
    /// Largest value the register can hold.
    #[inline]
    pub const fn max(self) -> u32 {
        match self {
            RegisterWidth::Bits8 => u8::MAX as u32,
            RegisterWidth::Bits16 => u16::MAX as u32,
        }
    }
}

/// How the timer period is derived from the target frequency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodLaw {
    /// `round(clock / (prescaler * f * N))`
    RoundedQuotient,
    /// `(clock / prescaler) / round(f * N)`, integer division
    RoundedStepRate,
}

/// What happens on the tick where the index reaches the table span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapPolicy {
    /// Reset to 0 and output entry 0 in the same tick.
    Continue,
    /// Reset to 0 and skip the duty update (one dead tick per cycle).
    DeadTick,
}

/// Duty rescaling relative to the current period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DutyScaling {
    /// Table value written as-is.
    Unscaled,
    /// `sample / (N / period)` with integer truncation.
    LegacyDivisor,
    /// `round(sample * period / N)`.
    Proportional,
}

/// Where the target frequency comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrequencySource {
    /// Potentiometer on the analog input, sampled by the controller.
    Potentiometer,
    /// Constant frequency published once at startup.
    Fixed(f32),
}

/// Timer clocking and period register.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerConfig {
    /// Timer source clock in Hz.
    pub clock_hz: u32,
    /// Integer divider ahead of the counter.
    pub prescaler: u32,
    /// Compare/reload register width.
    pub register: RegisterWidth,
    /// Period derivation.
    pub law: PeriodLaw,
}

impl TimerConfig {
    /// Counter ticks per second after the prescaler.
    #[inline]
    pub fn tick_hz(&self) -> f32 {
        self.clock_hz as f32 / self.prescaler as f32
    }
}

/// Analog-to-frequency mapping for the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Frequency at full-scale input.
    pub max_frequency_hz: f32,
    /// Largest raw analog value.
    pub full_scale: u16,
    /// Delay between controller ticks.
    pub interval_ms: u32,
}

/// Complete generator configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorConfig {
    pub timer: TimerConfig,
    /// Number of table entries walked per cycle (N or N - 1).
    pub table_span: u16,
    pub wrap: WrapPolicy,
    pub scaling: DutyScaling,
    pub offsets: PhaseOffsets,
    pub controller: ControllerConfig,
    pub source: FrequencySource,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::ARDUINO_UNO
    }
}

impl GeneratorConfig {
    /// Check the tunables before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if self.timer.prescaler == 0 {
            return Err(ConfigError::ZeroPrescaler);
        }
        let span = self.table_span as usize;
        if span != LUT_SIZE && span != LUT_SIZE - 1 {
            return Err(ConfigError::InvalidSpan);
        }
        if self.controller.full_scale == 0 {
            return Err(ConfigError::ZeroFullScale);
        }
        if !(self.controller.max_frequency_hz > 0.0) {
            return Err(ConfigError::InvalidFrequencyRange);
        }
        if let FrequencySource::Fixed(hz) = self.source {
            if !(hz > 0.0) || hz > self.controller.max_frequency_hz {
                return Err(ConfigError::InvalidFixedFrequency);
            }
        }
        Ok(())
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// C01: Timer clock is zero
    ZeroClock,
    /// C02: Prescaler is zero
    ZeroPrescaler,
    /// C03: Table span is neither N nor N - 1
    InvalidSpan,
    /// C04: Analog full scale is zero
    ZeroFullScale,
    /// C05: Maximum frequency not positive
    InvalidFrequencyRange,
    /// C06: Fixed frequency outside (0, max]
    InvalidFixedFrequency,
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroClock => "C01",
            Self::ZeroPrescaler => "C02",
            Self::InvalidSpan => "C03",
            Self::ZeroFullScale => "C04",
            Self::InvalidFrequencyRange => "C05",
            Self::InvalidFixedFrequency => "C06",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ZeroClock => "timer clock is zero",
            Self::ZeroPrescaler => "prescaler is zero",
            Self::InvalidSpan => "table span must be 255 or 256",
            Self::ZeroFullScale => "analog full scale is zero",
            Self::InvalidFrequencyRange => "maximum frequency must be positive",
            Self::InvalidFixedFrequency => "fixed frequency out of range",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
