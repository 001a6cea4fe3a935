//! ESP32 board wiring.
//!
//! - LEDC timer 0, 20 kHz carrier, 8-bit resolution, channels 0–2 → phases A–C
//! - ADC1 oneshot on the potentiometer pin, 12-bit reading scaled to 10 bits
//! - Timer group 0 / timer 0 as the stepping timer; its alarm ISR runs the
//!   engine and re-arms itself with the new period
//!
//! # Hardware Setup (ESP32-S3; `esp32` feature moves phases to GPIO25-27
//! and the wiper to GPIO34)
//!
//! ```text
//! GPIO4  (LEDC ch0) ──▶ RC filter ──▶ phase A
//! GPIO5  (LEDC ch1) ──▶ RC filter ──▶ phase B
//! GPIO6  (LEDC ch2) ──▶ RC filter ──▶ phase C
//! GPIO1  (ADC1 ch0) ◀── potentiometer wiper (0–3.3 V)
//! ```

use esp_idf_svc::hal::adc::attenuation::DB_11;
use esp_idf_svc::hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_svc::hal::adc::ADCPin;
use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::ledc::config::TimerConfig as LedcTimerConfig;
use esp_idf_svc::hal::ledc::{LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, Resolution};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::timer::config::Config as StepTimerConfig;
use esp_idf_svc::hal::timer::{Timer, TimerDriver};
use esp_idf_svc::sys::{self, EspError};

use rust_three_phase_spwm::config::GeneratorConfig;
use rust_three_phase_spwm::diagnostics::{DiagEvent, Diagnostics};
use rust_three_phase_spwm::engine::WaveformEngine;
use rust_three_phase_spwm::hal::{AnalogInput, DutyOutputs, PeriodTimer};
use rust_three_phase_spwm::wave::Phase;

/// PWM carrier; far above the 120 Hz output so an RC filter recovers the sine.
const PWM_CARRIER_HZ: u32 = 20_000;

/// ESP32 ADC is 12-bit; the controller expects 10-bit.
const ADC_SHIFT: u16 = 2;

/// Three LEDC channels on one shared timer.
///
/// Failed duty writes are counted in `diag`, never reported from the ISR.
pub struct LedcOutputs {
    channels: [LedcDriver<'static>; 3],
    diag: &'static Diagnostics,
}

impl LedcOutputs {
    pub fn new<T: LedcTimer>(
        timer: impl Peripheral<P = T> + 'static,
        ch_a: impl Peripheral<P = impl LedcChannel<SpeedMode = T::SpeedMode>> + 'static,
        ch_b: impl Peripheral<P = impl LedcChannel<SpeedMode = T::SpeedMode>> + 'static,
        ch_c: impl Peripheral<P = impl LedcChannel<SpeedMode = T::SpeedMode>> + 'static,
        pin_a: impl Peripheral<P = impl OutputPin> + 'static,
        pin_b: impl Peripheral<P = impl OutputPin> + 'static,
        pin_c: impl Peripheral<P = impl OutputPin> + 'static,
        diag: &'static Diagnostics,
    ) -> Result<Self, EspError> {
        let timer_config = LedcTimerConfig::default()
            .frequency(PWM_CARRIER_HZ.Hz().into())
            .resolution(Resolution::Bits8);
        // Lives as long as the outputs, which live forever inside the ISR
        let timer: &'static LedcTimerDriver<'static, T> =
            Box::leak(Box::new(LedcTimerDriver::new(timer, &timer_config)?));

        let mut outputs = Self {
            channels: [
                LedcDriver::new(ch_a, timer, pin_a)?,
                LedcDriver::new(ch_b, timer, pin_b)?,
                LedcDriver::new(ch_c, timer, pin_c)?,
            ],
            diag,
        };
        for phase in Phase::ALL {
            outputs.set_duty(phase, rust_three_phase_spwm::wave::LUT_MIDPOINT);
        }
        Ok(outputs)
    }
}

impl DutyOutputs for LedcOutputs {
    #[inline]
    fn set_duty(&mut self, phase: Phase, duty: u8) {
        if self.channels[phase.slot()].set_duty(duty as u32).is_err() {
            self.diag.record(DiagEvent::OutputWriteFailed);
        }
    }
}

/// Potentiometer on an ADC1 pin.
pub struct PotInput<T: ADCPin + 'static> {
    channel: AdcChannelDriver<'static, T, AdcDriver<'static, T::Adc>>,
}

impl<T: ADCPin + 'static> PotInput<T> {
    pub fn new(
        adc: impl Peripheral<P = T::Adc> + 'static,
        pin: impl Peripheral<P = T> + 'static,
    ) -> Result<Self, EspError> {
        let adc = AdcDriver::new(adc)?;
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(adc, pin, &config)?;
        Ok(Self { channel })
    }
}

impl<T: ADCPin + 'static> AnalogInput for PotInput<T> {
    type Error = EspError;

    fn read_raw(&mut self) -> Result<u16, EspError> {
        Ok(self.channel.read_raw()? >> ADC_SHIFT)
    }
}

/// Alarm register of the stepping timer, written from inside its own ISR.
struct IsrAlarm {
    group: sys::timer_group_t,
    index: sys::timer_idx_t,
}

impl PeriodTimer for IsrAlarm {
    #[inline]
    fn set_period(&mut self, counts: u32) {
        // SAFETY: ISR-safe timer group calls on the timer that raised this interrupt
        unsafe {
            sys::timer_group_set_alarm_value_in_isr(self.group, self.index, counts as u64);
            sys::timer_group_enable_alarm_in_isr(self.group, self.index);
        }
    }
}

/// Start the stepping timer with the engine in its alarm ISR.
///
/// The returned driver must be kept alive; dropping it stops the waveform.
pub fn start_stepping_timer<TIMER: Timer>(
    timer: impl Peripheral<P = TIMER> + 'static,
    config: &GeneratorConfig,
    mut engine: WaveformEngine<'static>,
    mut outputs: LedcOutputs,
) -> Result<TimerDriver<'static>, EspError> {
    let timer_config = StepTimerConfig::new()
        .divider(config.timer.prescaler)
        .auto_reload(true);
    let mut driver = TimerDriver::new(timer, &timer_config)?;

    // Idle cadence until the first period arrives
    driver.set_counter(0)?;
    driver.set_alarm(config.timer.register.max() as u64)?;

    let mut alarm = IsrAlarm {
        group: TIMER::group(),
        index: TIMER::index(),
    };

    // SAFETY: the closure only touches the engine, the LEDC channels and the
    // alarm register, all owned by this ISR from here on
    unsafe {
        driver.subscribe(move || {
            let now_us = sys::esp_timer_get_time();
            let writes = engine.on_tick(now_us, None);
            writes.apply(&mut outputs, &mut alarm);
        })?;
    }

    driver.enable_interrupt()?;
    driver.enable_alarm(true)?;
    driver.enable(true)?;
    Ok(driver)
}
