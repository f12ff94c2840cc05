//! Prints the four PCF8591 inputs in millivolts once per second, followed by
//! a raw auto-increment scan.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin pcf8591_adc
//! ```

use std::thread;
use std::time::Duration;

use pihat_kit::hal::linux::{open_i2c, Delay};
use pihat_kit::{Config, Pcf8591};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let settings = &config.pcf8591;
    let mut adc = Pcf8591::new(open_i2c(&config.bus)?, Delay, settings.address)
        .with_vref_mv(settings.vref_mv)
        .with_input_mode(settings.input_mode)
        .with_settle_us(settings.settle_us)
        .with_scan_settle_ms(settings.scan_settle_ms);
    let interval = Duration::from_millis(u64::from(settings.sample_interval_ms));

    println!(
        "[OK] PCF8591 at 0x{:02X}, {:?}, Vref {} mV",
        settings.address, settings.input_mode, settings.vref_mv
    );

    loop {
        println!("Voltage on ADC:");
        for channel in 0..settings.input_mode.channel_count() {
            let mv = adc.read_millivolts(channel)?;
            println!("> A{} --> {} mV", channel, mv);
        }

        let codes = adc.read_all()?;
        println!("> scan --> {:02x?}", codes.as_slice());
        println!();

        thread::sleep(interval);
    }
}
