//! Copies half of the A0 input voltage to the DAC output, continuously.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin pcf8591_passthrough
//! ```

use pihat_kit::hal::linux::{open_i2c, Delay};
use pihat_kit::{Config, Pcf8591};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let settings = &config.pcf8591;
    let mut adc = Pcf8591::new(open_i2c(&config.bus)?, Delay, settings.address)
        .with_vref_mv(settings.vref_mv)
        .with_settle_us(settings.settle_us);

    adc.write_dac(0)?;
    println!("[OK] A0 / 2 -> DAC");

    loop {
        let code = adc.read_channel(0)?;
        println!("A0 data = 0x{:02x}", code);
        adc.write_dac(code / 2)?;
    }
}
