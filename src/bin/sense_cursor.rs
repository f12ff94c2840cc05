//! Moves a red cursor over the LED matrix with the Sense HAT joystick;
//! pressing the stick paints the cell under it.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin sense_cursor
//! ```

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use pihat_kit::hal::linux::{SenseFramebuffer, SenseStick};
use pihat_kit::sense_hat::LedMatrix;
use pihat_kit::{Config, CursorPainter, StickInput};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let settings = &config.sense_hat;
    let mut matrix = LedMatrix::new(SenseFramebuffer::find(settings.framebuffer_name.as_str())?);
    matrix.set_rotation(settings.rotation, false)?;
    let mut stick = SenseStick::find(settings.stick_name.as_str())?;

    let mut painter = CursorPainter::new(Rgb565::RED, Rgb565::BLACK);
    matrix.show_frame(&painter.render())?;
    println!("[OK] move with the joystick, press to paint");

    loop {
        let event = stick.wait_for_event()?;
        println!("The joystick was {} {}", event.action.as_str(), event.direction.as_str());
        if painter.handle(event) {
            matrix.show_frame(&painter.render())?;
        }
    }
}
