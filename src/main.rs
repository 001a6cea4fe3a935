//! SpwmGen - Main entry point
//!
//! On ESP-IDF:
//! 1. Configure LEDC (three phases), ADC (potentiometer), stepping timer
//! 2. Hand the waveform engine to the timer ISR
//! 3. Run the frequency controller and log drain in the main task
//!
//! On the host the same loop runs against simulated peripherals for a
//! bounded number of controller ticks, which is handy for eyeballing the
//! status lines and diagnostics of a preset:
//!
//! ```text
//! spwm [uno|legacy|unprescaled|fixed|esp32]
//! ```

#[cfg(target_os = "espidf")]
mod board;

use rust_three_phase_spwm::hal::TextSink;
use rust_three_phase_spwm::{CancelToken, Diagnostics, TargetFrequency};

static TARGET: TargetFrequency = TargetFrequency::new();
static DIAG: Diagnostics = Diagnostics::new();
static CANCEL: CancelToken = CancelToken::new();

/// Console output. On ESP-IDF stdout is UART0.
struct StdoutSink;

impl TextSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        use std::io::Write;
        let mut out = std::io::stdout();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

#[cfg(target_os = "espidf")]
#[derive(Debug)]
enum AppError {
    Config(rust_three_phase_spwm::ConfigError),
    Esp(esp_idf_svc::sys::EspError),
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for AppError {
    fn from(e: esp_idf_svc::sys::EspError) -> Self {
        Self::Esp(e)
    }
}

#[cfg(target_os = "espidf")]
impl From<rust_three_phase_spwm::ConfigError> for AppError {
    fn from(e: rust_three_phase_spwm::ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(target_os = "espidf")]
fn main() -> Result<(), AppError> {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use rust_three_phase_spwm::config::FrequencySource;
    use rust_three_phase_spwm::log_drain::LogDrain;
    use rust_three_phase_spwm::{
        FrequencyController, GeneratorConfig, WaveformEngine, BG_LOG_STREAM, RT_LOG_STREAM,
    };

    esp_idf_svc::sys::link_patches();

    let now_us = || unsafe { esp_idf_svc::sys::esp_timer_get_time() };

    println!("{}\r", env!("VERSION_STRING"));

    let config = GeneratorConfig::ESP32;
    if let Err(e) = config.validate() {
        println!("[ERROR] {}: {}\r", e.code(), e.message());
        return Err(e.into());
    }

    let peripherals = Peripherals::take()?;

    let pins = peripherals.pins;

    #[cfg(not(feature = "esp32"))]
    let (pin_a, pin_b, pin_c, pot_pin) = (pins.gpio4, pins.gpio5, pins.gpio6, pins.gpio1);
    // GPIO6-11 are flash on the classic ESP32; ADC1 lives on 32-39
    #[cfg(feature = "esp32")]
    let (pin_a, pin_b, pin_c, pot_pin) = (pins.gpio25, pins.gpio26, pins.gpio27, pins.gpio34);

    let outputs = board::LedcOutputs::new(
        peripherals.ledc.timer0,
        peripherals.ledc.channel0,
        peripherals.ledc.channel1,
        peripherals.ledc.channel2,
        pin_a,
        pin_b,
        pin_c,
        &DIAG,
    )?;

    let engine = WaveformEngine::new(config, &TARGET, &DIAG, &RT_LOG_STREAM);
    let _stepping = board::start_stepping_timer(peripherals.timer00, &config, engine, outputs)?;

    let mut drain = LogDrain::default();
    let mut sink = StdoutSink;

    match config.source {
        FrequencySource::Fixed(hz) => {
            TARGET.publish(hz);
            while !CANCEL.is_cancelled() {
                drain.drain(&RT_LOG_STREAM, &BG_LOG_STREAM, &mut sink, now_us());
                FreeRtos::delay_ms(config.controller.interval_ms);
            }
        }
        FrequencySource::Potentiometer => {
            let pot = board::PotInput::new(peripherals.adc1, pot_pin)?;
            let mut controller = FrequencyController::new(
                config.controller,
                pot,
                StdoutSink,
                &TARGET,
                &DIAG,
                &BG_LOG_STREAM,
            );
            controller.run(&CANCEL, now_us, |ms| {
                drain.drain(&RT_LOG_STREAM, &BG_LOG_STREAM, &mut sink, now_us());
                FreeRtos::delay_ms(ms);
            });
        }
    }

    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<(), rust_three_phase_spwm::ConfigError> {
    sim::run(std::env::args().nth(1).as_deref())
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::cell::Cell;
    use std::convert::Infallible;

    use rust_three_phase_spwm::config::FrequencySource;
    use rust_three_phase_spwm::hal::{AnalogInput, DutyOutputs, PeriodTimer};
    use rust_three_phase_spwm::log_drain::LogDrain;
    use rust_three_phase_spwm::{
        ConfigError, FrequencyController, GeneratorConfig, Phase, WaveformEngine, BG_LOG_STREAM,
        RT_LOG_STREAM,
    };

    use super::{StdoutSink, CANCEL, DIAG, TARGET};

    const CONTROLLER_TICKS: u32 = 24;
    const MAX_ENGINE_TICKS_PER_INTERVAL: u32 = 20_000;

    /// Pot swept up then back down, stopping at both ends.
    struct SweepPot {
        raw: i32,
        step: i32,
        full_scale: i32,
    }

    impl AnalogInput for SweepPot {
        type Error = Infallible;

        fn read_raw(&mut self) -> Result<u16, Infallible> {
            let raw = self.raw.clamp(0, self.full_scale);
            self.raw += self.step;
            if self.raw > self.full_scale || self.raw < 0 {
                self.step = -self.step;
                self.raw = self.raw.clamp(0, self.full_scale);
            }
            Ok(raw as u16)
        }
    }

    #[derive(Default)]
    struct Scope {
        duty: [u8; 3],
    }

    impl DutyOutputs for Scope {
        fn set_duty(&mut self, phase: Phase, duty: u8) {
            self.duty[phase.slot()] = duty;
        }
    }

    #[derive(Default)]
    struct SimTimer {
        period: u32,
    }

    impl PeriodTimer for SimTimer {
        fn set_period(&mut self, counts: u32) {
            self.period = counts;
        }
    }

    fn preset(name: Option<&str>) -> GeneratorConfig {
        match name {
            Some("legacy") => GeneratorConfig::LEGACY_DIVISOR,
            Some("unprescaled") => GeneratorConfig::LEGACY_UNPRESCALED,
            Some("fixed") => GeneratorConfig::FIXED_HALF_HZ,
            Some("esp32") => GeneratorConfig::ESP32,
            _ => GeneratorConfig::ARDUINO_UNO,
        }
    }

    pub fn run(name: Option<&str>) -> Result<(), ConfigError> {
        let config = preset(name);
        config.validate()?;

        println!("{}", env!("VERSION_STRING"));
        println!("{:?}", config);

        let clock_us = Cell::new(0i64);
        let ticks_run = Cell::new(0u32);
        let mut engine = WaveformEngine::new(config, &TARGET, &DIAG, &RT_LOG_STREAM);
        let mut scope = Scope::default();
        let mut timer = SimTimer::default();
        let mut drain = LogDrain::default();
        let mut sink = StdoutSink;
        let tick_hz = config.timer.tick_hz();

        // Engine ticks that fit in one controller interval at the current period
        let mut advance = |ms: u32| {
            let mut budget_us = ms as i64 * 1000;
            let mut ticks = 0;
            while budget_us > 0 && ticks < MAX_ENGINE_TICKS_PER_INTERVAL {
                let writes = engine.on_tick(clock_us.get(), None);
                writes.apply(&mut scope, &mut timer);
                let period = engine.state().period.unwrap_or(config.timer.register.max());
                let step_us = ((period as f32 / tick_hz) * 1e6).max(1.0) as i64;
                budget_us -= step_us;
                ticks += 1;
            }
            clock_us.set(clock_us.get() + ms as i64 * 1000);
            drain.drain(&RT_LOG_STREAM, &BG_LOG_STREAM, &mut sink, clock_us.get());
            println!(
                "  period {:>5}  duty A/B/C {:3} {:3} {:3}  engine ticks {}",
                timer.period, scope.duty[0], scope.duty[1], scope.duty[2], ticks
            );

            ticks_run.set(ticks_run.get() + 1);
            if ticks_run.get() >= CONTROLLER_TICKS {
                CANCEL.cancel();
            }
        };

        match config.source {
            FrequencySource::Fixed(hz) => {
                TARGET.publish(hz);
                while !CANCEL.is_cancelled() {
                    advance(config.controller.interval_ms);
                }
            }
            FrequencySource::Potentiometer => {
                let pot = SweepPot {
                    raw: 0,
                    step: (config.controller.full_scale as i32 / 10).max(1),
                    full_scale: config.controller.full_scale as i32,
                };
                let mut controller = FrequencyController::new(
                    config.controller,
                    pot,
                    StdoutSink,
                    &TARGET,
                    &DIAG,
                    &BG_LOG_STREAM,
                );
                controller.run(&CANCEL, || clock_us.get(), |ms| {
                    println!();
                    advance(ms);
                });
            }
        }

        println!("{:?}", DIAG.snapshot());
        Ok(())
    }
}
