//! Sense HAT 8×8 RGB LED matrix.
//!
//! The matrix is driven through a [`PixelBuffer`]: on a Raspberry Pi that is
//! the `RPi-Sense FB` framebuffer mapped into memory, in tests it is
//! [`MockFrameBuffer`](crate::hal::MockFrameBuffer).
//!
//! All coordinates are logical: `(0, 0)` is the top-left LED as seen after
//! the configured [`Rotation`] is applied.
//!
//! # Example
//!
//! ```rust
//! use embedded_graphics::pixelcolor::Rgb565;
//! use embedded_graphics::prelude::*;
//! use pihat_kit::hal::MockFrameBuffer;
//! use pihat_kit::sense_hat::LedMatrix;
//!
//! let mut matrix = LedMatrix::new(MockFrameBuffer::new());
//! matrix.clear(Rgb565::BLACK).unwrap();
//! matrix.set_pixel(1, 1, Rgb565::RED).unwrap();
//!
//! assert_eq!(matrix.get_pixel(1, 1).unwrap(), Rgb565::RED);
//! assert_eq!(matrix.get_pixel(4, 6).unwrap(), Rgb565::BLACK);
//! ```

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::delay::DelayNs;
use log::debug;

use super::frame::{from_raw, to_raw, Canvas, Frame, Rotation, SIZE};
use crate::traits::{GammaControl, PixelBuffer, PIXEL_COUNT};

/// Width of one glyph cell when scrolling text (5 px glyph + 1 px gap).
const GLYPH_ADVANCE: u32 = 6;

/// Highest value a gamma table entry may hold.
pub const GAMMA_MAX: u8 = 31;

/// Errors from LED matrix operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError<E> {
    /// Framebuffer access failed.
    #[error("framebuffer access failed: {0:?}")]
    Backend(E),

    /// Coordinates outside the 8×8 matrix.
    #[error("pixel ({x}, {y}) is outside the 8x8 matrix")]
    OutOfBounds {
        /// Requested column.
        x: u8,
        /// Requested row.
        y: u8,
    },

    /// Gamma entry above [`GAMMA_MAX`].
    #[error("gamma entry {index} is {value}, maximum is 31")]
    InvalidGamma {
        /// Table position.
        index: usize,
        /// Offending value.
        value: u8,
    },
}

/// LED matrix driver.
pub struct LedMatrix<F> {
    fb: F,
    rotation: Rotation,
    low_light: bool,
}

impl<F: PixelBuffer> LedMatrix<F> {
    /// Wraps a framebuffer. The picture is not touched.
    pub fn new(fb: F) -> Self {
        Self {
            fb,
            rotation: Rotation::Deg0,
            low_light: false,
        }
    }

    /// Returns the framebuffer, consuming the driver.
    pub fn release(self) -> F {
        self.fb
    }

    /// Current rotation.
    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn check(x: u8, y: u8) -> Result<(), MatrixError<F::Error>> {
        if x >= SIZE || y >= SIZE {
            return Err(MatrixError::OutOfBounds { x, y });
        }
        Ok(())
    }

    fn physical_index(&self, x: u8, y: u8) -> usize {
        let (px, py) = self.rotation.map(x, y);
        usize::from(px) + usize::from(py) * usize::from(SIZE)
    }

    /// Sets every LED to `color`.
    pub fn clear(&mut self, color: Rgb565) -> Result<(), MatrixError<F::Error>> {
        self.fb
            .write_pixels(&[to_raw(color); PIXEL_COUNT])
            .map_err(MatrixError::Backend)
    }

    /// Sets one LED.
    pub fn set_pixel(&mut self, x: u8, y: u8, color: Rgb565) -> Result<(), MatrixError<F::Error>> {
        Self::check(x, y)?;
        let index = self.physical_index(x, y);
        self.fb
            .write_pixel(index, to_raw(color))
            .map_err(MatrixError::Backend)
    }

    /// Reads one LED.
    pub fn get_pixel(&mut self, x: u8, y: u8) -> Result<Rgb565, MatrixError<F::Error>> {
        Self::check(x, y)?;
        let mut raw = [0u16; PIXEL_COUNT];
        self.fb.read_pixels(&mut raw).map_err(MatrixError::Backend)?;
        Ok(from_raw(raw[self.physical_index(x, y)]))
    }

    /// Replaces the whole picture with 64 row-major pixels.
    pub fn set_pixels(&mut self, pixels: &[Rgb565; PIXEL_COUNT]) -> Result<(), MatrixError<F::Error>> {
        self.show_frame(&Frame::from_pixels(*pixels))
    }

    /// Reads the whole picture as 64 row-major pixels.
    pub fn get_pixels(&mut self) -> Result<[Rgb565; PIXEL_COUNT], MatrixError<F::Error>> {
        Ok(*self.frame()?.pixels())
    }

    /// Displays a frame.
    pub fn show_frame(&mut self, frame: &Frame) -> Result<(), MatrixError<F::Error>> {
        let physical = frame.rotated(self.rotation);
        self.fb
            .write_pixels(&physical.to_raw())
            .map_err(MatrixError::Backend)
    }

    /// Reads the displayed picture in logical orientation.
    pub fn frame(&mut self) -> Result<Frame, MatrixError<F::Error>> {
        let mut raw = [0u16; PIXEL_COUNT];
        self.fb.read_pixels(&mut raw).map_err(MatrixError::Backend)?;
        Ok(Frame::from_raw(&raw).rotated(self.rotation.inverse()))
    }

    /// Mirrors the picture left to right and returns the result.
    ///
    /// With `redraw == false` only the returned frame is flipped.
    pub fn flip_h(&mut self, redraw: bool) -> Result<Frame, MatrixError<F::Error>> {
        let flipped = self.frame()?.flipped_h();
        if redraw {
            self.show_frame(&flipped)?;
        }
        Ok(flipped)
    }

    /// Mirrors the picture top to bottom and returns the result.
    pub fn flip_v(&mut self, redraw: bool) -> Result<Frame, MatrixError<F::Error>> {
        let flipped = self.frame()?.flipped_v();
        if redraw {
            self.show_frame(&flipped)?;
        }
        Ok(flipped)
    }

    /// Changes the logical orientation.
    ///
    /// With `redraw` the current picture is re-displayed in the new
    /// orientation, so it visibly turns.
    pub fn set_rotation(&mut self, rotation: Rotation, redraw: bool) -> Result<(), MatrixError<F::Error>> {
        if redraw {
            let current = self.frame()?;
            self.rotation = rotation;
            self.show_frame(&current)
        } else {
            self.rotation = rotation;
            Ok(())
        }
    }

    /// Turns the displayed picture clockwise by `rotation`.
    pub fn rotate_image(&mut self, rotation: Rotation) -> Result<(), MatrixError<F::Error>> {
        let turned = self.frame()?.rotated(rotation);
        self.show_frame(&turned)
    }

    /// Shows one character in `fg` on a `bg` background.
    pub fn show_letter(&mut self, letter: char, fg: Rgb565, bg: Rgb565) -> Result<(), MatrixError<F::Error>> {
        let mut frame = Frame::filled(bg);
        draw_char(&mut frame, letter, Point::new(1, 0), fg);
        self.show_frame(&frame)
    }

    /// Scrolls `text` right to left, one column every `scroll_ms`.
    ///
    /// The message enters from the right edge and leaves the matrix blank
    /// (filled with `bg`) at the end.
    pub fn show_message<D: DelayNs>(
        &mut self,
        text: &str,
        scroll_ms: u32,
        fg: Rgb565,
        bg: Rgb565,
        delay: &mut D,
    ) -> Result<(), MatrixError<F::Error>> {
        let canvas = message_canvas(text, fg, bg);
        debug!(
            "scrolling {} chars over {} steps",
            text.chars().count(),
            canvas.scroll_steps()
        );
        for offset in 0..canvas.scroll_steps() {
            self.show_frame(&canvas.window(offset))?;
            delay.delay_ms(scroll_ms);
        }
        Ok(())
    }
}

impl<F> LedMatrix<F>
where
    F: PixelBuffer + GammaControl<Error = <F as PixelBuffer>::Error>,
{
    /// Reads the LED gamma table.
    pub fn gamma(&mut self) -> Result<[u8; 32], MatrixError<<F as PixelBuffer>::Error>> {
        self.fb.gamma().map_err(MatrixError::Backend)
    }

    /// Replaces the LED gamma table; every entry must be 0..=31.
    pub fn set_gamma(&mut self, table: &[u8; 32]) -> Result<(), MatrixError<<F as PixelBuffer>::Error>> {
        if let Some((index, &value)) = table.iter().enumerate().find(|(_, &v)| v > GAMMA_MAX) {
            return Err(MatrixError::InvalidGamma { index, value });
        }
        self.fb.set_gamma(table).map_err(MatrixError::Backend)
    }

    /// Restores the default gamma table.
    pub fn reset_gamma(&mut self) -> Result<(), MatrixError<<F as PixelBuffer>::Error>> {
        self.fb.reset_gamma(false).map_err(MatrixError::Backend)?;
        self.low_light = false;
        Ok(())
    }

    /// Switches between the default and the dimmed gamma table.
    pub fn set_low_light(&mut self, enabled: bool) -> Result<(), MatrixError<<F as PixelBuffer>::Error>> {
        self.fb.reset_gamma(enabled).map_err(MatrixError::Backend)?;
        self.low_light = enabled;
        Ok(())
    }

    /// Whether the low-light table was last selected.
    pub fn low_light(&self) -> bool {
        self.low_light
    }
}

fn draw_char<T>(target: &mut T, letter: char, origin: Point, fg: Rgb565)
where
    T: DrawTarget<Color = Rgb565, Error = core::convert::Infallible>,
{
    let mut buf = [0u8; 4];
    let glyph = letter.encode_utf8(&mut buf);
    let style = MonoTextStyle::new(&FONT_5X8, fg);
    let drawn = Text::with_baseline(glyph, origin, style, Baseline::Top).draw(target);
    if let Err(never) = drawn {
        match never {}
    }
}

/// Renders `text` into a strip with a blank screen-width margin on each side.
pub fn message_canvas(text: &str, fg: Rgb565, bg: Rgb565) -> Canvas {
    let chars = text.chars().count() as u32;
    let margin = u32::from(SIZE);
    let mut canvas = Canvas::new(margin * 2 + chars * GLYPH_ADVANCE, bg);
    for (i, letter) in text.chars().enumerate() {
        let x = margin + i as u32 * GLYPH_ADVANCE;
        draw_char(&mut canvas, letter, Point::new(x as i32, 0), fg);
    }
    canvas
}
