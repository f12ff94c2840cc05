//! Sense HAT LED matrix tour: pixels, read-back, rotation, flips, text and a
//! colour animation that runs until interrupted.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin sense_matrix
//! ```

use std::thread;
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use pihat_kit::hal::linux::{Delay, SenseFramebuffer};
use pihat_kit::sense_hat::frame::to_raw;
use pihat_kit::sense_hat::{rgb, LedMatrix};
use pihat_kit::{Config, Rotation};

fn pause(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Invader picture, row-major.
fn invader() -> [Rgb565; 64] {
    let k = Rgb565::BLACK;
    let b = Rgb565::BLUE;
    let r = Rgb565::RED;
    let y = Rgb565::YELLOW;
    [
        k, k, b, k, k, b, k, k, //
        k, k, r, r, r, r, k, k, //
        b, k, b, y, r, y, b, k, //
        k, b, b, r, b, r, k, k, //
        k, k, y, y, y, y, k, k, //
        k, k, y, k, y, k, k, k, //
        k, k, r, r, r, r, r, k, //
        k, k, r, r, r, k, k, k, //
    ]
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let settings = &config.sense_hat;
    let fb = SenseFramebuffer::find(settings.framebuffer_name.as_str())?;
    let mut matrix = LedMatrix::new(fb);
    matrix.set_rotation(settings.rotation, false)?;
    matrix.set_low_light(settings.low_light)?;
    let mut delay = Delay;

    println!("[OK] LED matrix, rotation {}°", settings.rotation.degrees());

    // =========================================================================
    // Pixels
    // =========================================================================
    matrix.clear(Rgb565::BLACK)?;
    pause(1000);
    matrix.set_pixel(1, 1, Rgb565::RED)?;
    pause(1000);

    let mut stripes = [Rgb565::BLACK; 64];
    for (i, pixel) in stripes.iter_mut().enumerate() {
        *pixel = match i / 8 {
            0 | 6 => Rgb565::RED,
            1 | 4 => Rgb565::BLUE,
            2 | 5 => Rgb565::GREEN,
            _ => Rgb565::WHITE,
        };
    }
    matrix.set_pixels(&stripes)?;
    pause(3000);

    println!("pixel at x=4 y=6: {:#06x}", to_raw(matrix.get_pixel(4, 6)?));
    println!("mapping:");
    let pixels = matrix.get_pixels()?;
    for (row, line) in pixels.chunks(8).enumerate() {
        let words: Vec<String> = line.iter().map(|&p| format!("{:04x}", to_raw(p))).collect();
        println!("row {}: {}", row, words.join(", "));
    }

    matrix.rotate_image(Rotation::Deg270)?;
    pause(1000);

    // =========================================================================
    // Picture, flips, text
    // =========================================================================
    matrix.set_pixels(&invader())?;
    pause(1000);
    matrix.flip_h(true)?;
    pause(1000);
    matrix.flip_v(true)?;
    pause(1000);

    let grey = rgb(150, 150, 150);
    matrix.clear(grey)?;
    pause(1000);
    matrix.show_letter('H', Rgb565::RED, grey)?;
    pause(1000);
    matrix.show_message(
        "Hello World!",
        settings.scroll_ms,
        Rgb565::BLUE,
        Rgb565::BLACK,
        &mut delay,
    )?;

    // =========================================================================
    // Animation
    // =========================================================================
    let colors = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE];
    let mut sweep = true;
    loop {
        for color in colors {
            if sweep {
                for x in 0..8 {
                    for y in 0..8 {
                        matrix.set_pixel(x, y, color)?;
                        pause(50);
                    }
                }
            } else {
                matrix.set_pixel(0, 0, color)?;
                for i in 0..8 {
                    for j in 0..i {
                        matrix.set_pixel(i, j, color)?;
                        matrix.set_pixel(j, i, color)?;
                    }
                    matrix.set_pixel(i, i, color)?;
                    pause(100);
                }
            }
        }
        sweep = !sweep;
    }
}
