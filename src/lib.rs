//! # RustThreePhaseSpwm
//!
//! Three-phase sinusoidal PWM generator with potentiometer frequency control.
//!
//! ## Architecture
//!
//! Two contexts, one shared word:
//! - Frequency controller (foreground loop, ~5 Hz): ADC → 0–120 Hz → [`TargetFrequency`]
//! - Waveform engine (timer ISR, up to ~30 kHz): [`TargetFrequency`] → timer
//!   period + three duty registers from one sine table at offsets 0 / 85 / 170
//!
//! The engine is pure logic over [`EngineState`]; hardware sits behind the
//! traits in [`hal`]. No locks, no allocation; the only library statics
//! are the two log streams in [`log_globals`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod engine;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod shared;
pub mod timing;
pub mod wave;

pub use config::{ConfigError, GeneratorConfig};
pub use controller::{ControllerError, FrequencyController};
pub use diagnostics::{DiagSnapshot, Diagnostics};
pub use engine::{EngineMode, EngineState, RegisterWrites, TickInput, WaveformEngine};
pub use log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
pub use shared::{CancelToken, TargetFrequency};
pub use timing::{Period, PeriodError};
pub use wave::{Phase, PhaseOffsets, SINE_LUT};
