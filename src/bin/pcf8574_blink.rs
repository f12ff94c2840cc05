//! Blinks LED2 on the PCF8574 board.
//!
//! The LED is active-low on pin 4 by default (`PIHAT_LED_PIN` to change).
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin pcf8574_blink
//! ```

use std::thread;
use std::time::Duration;

use pihat_kit::hal::linux::open_i2c;
use pihat_kit::{Config, Pcf8574};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let i2c = open_i2c(&config.bus)?;
    let mut expander = Pcf8574::new(i2c, config.pcf8574.address);
    let led = config.pcf8574.led();
    let half_period = Duration::from_millis(u64::from(config.pcf8574.blink_ms));

    println!(
        "[OK] PCF8574 at 0x{:02X}, LED on pin {}",
        config.pcf8574.address, led.pin
    );

    loop {
        led.on(&mut expander)?;
        thread::sleep(half_period);
        led.off(&mut expander)?;
        thread::sleep(half_period);
    }
}
