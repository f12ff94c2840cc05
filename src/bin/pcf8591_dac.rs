//! Generates a signal on the PCF8591 analog output.
//!
//! ```text
//! pcf8591_dac pwm [frequency_hz] [duty_percent]   3000/1000 mV square wave (default 1000 Hz, 50 %)
//! pcf8591_dac sine [frequency_hz]                 1500 +/- 1500 mV sine (default 10 Hz)
//! ```
//!
//! Timing is best-effort: each step is an I2C write followed by a sleep.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin pcf8591_dac -- pwm 100 25
//! ```

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use pihat_kit::hal::linux::{open_i2c, Delay, I2cdev};
use pihat_kit::waveform::{SineWave, SquareWave};
use pihat_kit::{Config, Pcf8591};

const PWM_HIGH_MV: u32 = 3000;
const PWM_LOW_MV: u32 = 1000;
const SINE_OFFSET_MV: u32 = 1500;
const SINE_AMPLITUDE_MV: u32 = 1500;
const SINE_SAMPLES: u32 = 628;

fn arg_or<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> anyhow::Result<T> {
    match args.get(index) {
        Some(text) => text
            .parse()
            .ok()
            .with_context(|| format!("invalid argument '{}'", text)),
        None => Ok(default),
    }
}

fn run_pwm(dac: &mut Pcf8591<I2cdev, Delay>, wave: SquareWave) -> anyhow::Result<()> {
    println!(
        "[OK] square wave {} Hz, {} % duty, {}/{} mV",
        wave.frequency_hz, wave.duty_percent, wave.high_mv, wave.low_mv
    );
    loop {
        for (mv, hold_us) in wave.steps() {
            dac.write_millivolts(mv)?;
            thread::sleep(Duration::from_micros(hold_us));
        }
    }
}

fn run_sine(dac: &mut Pcf8591<I2cdev, Delay>, wave: SineWave) -> anyhow::Result<()> {
    let hold = Duration::from_micros(wave.sample_period_us());
    println!(
        "[OK] sine {} Hz, {} +/- {} mV, {} samples",
        wave.frequency_hz, wave.offset_mv, wave.amplitude_mv, wave.samples_per_cycle
    );
    loop {
        for mv in wave.cycle() {
            dac.write_millivolts(mv.min(dac.vref_mv()))?;
            thread::sleep(hold);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env()?;
    let mut dac = Pcf8591::new(open_i2c(&config.bus)?, Delay, config.pcf8591.address)
        .with_vref_mv(config.pcf8591.vref_mv);

    match args.first().map(String::as_str) {
        Some("pwm") | None => {
            let frequency = arg_or(&args, 1, 1000u32)?;
            let duty = arg_or(&args, 2, 50u8)?;
            run_pwm(
                &mut dac,
                SquareWave::new(PWM_HIGH_MV, PWM_LOW_MV, frequency, duty),
            )
        }
        Some("sine") => {
            let frequency = arg_or(&args, 1, 10u32)?;
            run_sine(
                &mut dac,
                SineWave::new(SINE_OFFSET_MV, SINE_AMPLITUDE_MV, frequency, SINE_SAMPLES),
            )
        }
        Some(other) => bail!("unknown mode '{}', expected 'pwm' or 'sine'", other),
    }
}
