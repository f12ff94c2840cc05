//! Prints the PCF8574 port once per second, in binary and hex.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin pcf8574_read
//! ```

use std::thread;
use std::time::Duration;

use pihat_kit::hal::linux::open_i2c;
use pihat_kit::pcf8574::binary_digits;
use pihat_kit::{Config, Pcf8574};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let mut expander = Pcf8574::new(open_i2c(&config.bus)?, config.pcf8574.address);
    // Release every pin so external signals can pull them low.
    expander.write_port(0xFF)?;

    loop {
        let port = expander.read_port()?;
        let digits = binary_digits(port);
        println!("port byte:");
        println!("   binary : 0b{}", String::from_utf8_lossy(&digits));
        println!("   hex    : 0x{:02x}", port);
        println!();
        thread::sleep(Duration::from_secs(1));
    }
}
