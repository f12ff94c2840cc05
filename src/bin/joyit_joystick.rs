//! Prints the joy-it joystick direction and lights LED2 while it is held.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin joyit_joystick
//! ```

use pihat_kit::hal::linux::{open_i2c, Delay};
use pihat_kit::{Config, JoyItPad, Pcf8574};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let expander = Pcf8574::new(open_i2c(&config.bus)?, config.pcf8574.address);
    let mut pad = JoyItPad::new(expander, config.pcf8574.led(), config.pcf8574.poll_ms)?;
    let mut delay = Delay;

    println!("[OK] joystick on PCF8574 at 0x{:02X}", config.pcf8574.address);

    loop {
        let reading = pad.wait_for_press(&mut delay)?;
        match reading.direction() {
            Some(direction) => println!("{}", direction.as_str()),
            None => println!("buttons 0b{:04b}", reading.pressed()),
        }

        pad.set_led(true)?;
        pad.wait_for_change(reading, &mut delay)?;
        pad.set_led(false)?;
    }
}
