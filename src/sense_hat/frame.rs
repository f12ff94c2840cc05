//! Off-screen pixel buffers for the LED matrix.
//!
//! [`Frame`] is one 8×8 picture and [`Canvas`] is an 8-pixel-high strip of
//! any width used to scroll text. Both implement embedded-graphics'
//! [`DrawTarget`], so fonts and primitives can be drawn into them before the
//! result is pushed to the framebuffer.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565, Rgb888};
use embedded_graphics::prelude::*;

use crate::traits::PIXEL_COUNT;

/// Matrix width and height in pixels.
pub const SIZE: u8 = 8;

/// Builds an RGB565 colour from 8-bit channels.
///
/// ```rust
/// use embedded_graphics::pixelcolor::Rgb565;
/// use embedded_graphics::prelude::*;
/// use pihat_kit::sense_hat::rgb;
///
/// assert_eq!(rgb(255, 0, 0), Rgb565::RED);
/// assert_eq!(rgb(0, 0, 0), Rgb565::BLACK);
/// ```
pub fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::from(Rgb888::new(r, g, b))
}

/// Converts a colour to the framebuffer word.
#[inline]
pub fn to_raw(color: Rgb565) -> u16 {
    color.into_storage()
}

/// Converts a framebuffer word to a colour.
#[inline]
pub fn from_raw(raw: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(raw))
}

/// Clockwise rotation applied between logical and physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90° clockwise.
    Deg90,
    /// 180°.
    Deg180,
    /// 270° clockwise (90° counter-clockwise).
    Deg270,
}

impl Rotation {
    /// Parses 0, 90, 180 or 270 (also accepts negatives and multiples of 360).
    pub const fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Angle in degrees.
    pub const fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotation that undoes this one.
    pub const fn inverse(&self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// Where logical pixel `(x, y)` lands after rotating the picture.
    pub const fn map(&self, x: u8, y: u8) -> (u8, u8) {
        let max = SIZE - 1;
        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (max - y, x),
            Rotation::Deg180 => (max - x, max - y),
            Rotation::Deg270 => (y, max - x),
        }
    }
}

#[inline]
fn index(x: u8, y: u8) -> usize {
    usize::from(x) + usize::from(y) * usize::from(SIZE)
}

/// One 8×8 picture, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pixels: [Rgb565; PIXEL_COUNT],
}

impl Default for Frame {
    fn default() -> Self {
        Self::filled(Rgb565::BLACK)
    }
}

impl Frame {
    /// A frame with every pixel set to `color`.
    pub const fn filled(color: Rgb565) -> Self {
        Self {
            pixels: [color; PIXEL_COUNT],
        }
    }

    /// Wraps 64 row-major pixels.
    pub const fn from_pixels(pixels: [Rgb565; PIXEL_COUNT]) -> Self {
        Self { pixels }
    }

    /// Decodes framebuffer words.
    pub fn from_raw(raw: &[u16; PIXEL_COUNT]) -> Self {
        let mut frame = Self::default();
        for (pixel, &word) in frame.pixels.iter_mut().zip(raw.iter()) {
            *pixel = from_raw(word);
        }
        frame
    }

    /// Encodes to framebuffer words.
    pub fn to_raw(&self) -> [u16; PIXEL_COUNT] {
        let mut raw = [0u16; PIXEL_COUNT];
        for (word, &pixel) in raw.iter_mut().zip(self.pixels.iter()) {
            *word = to_raw(pixel);
        }
        raw
    }

    /// Row-major pixels.
    pub const fn pixels(&self) -> &[Rgb565; PIXEL_COUNT] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the matrix.
    pub fn get(&self, x: u8, y: u8) -> Option<Rgb565> {
        if x < SIZE && y < SIZE {
            Some(self.pixels[index(x, y)])
        } else {
            None
        }
    }

    /// Sets the pixel at `(x, y)`; returns `false` outside the matrix.
    pub fn set(&mut self, x: u8, y: u8, color: Rgb565) -> bool {
        if x < SIZE && y < SIZE {
            self.pixels[index(x, y)] = color;
            true
        } else {
            false
        }
    }

    /// Mirror image left to right.
    pub fn flipped_h(&self) -> Self {
        let mut out = *self;
        for row in out.pixels.chunks_exact_mut(usize::from(SIZE)) {
            row.reverse();
        }
        out
    }

    /// Mirror image top to bottom.
    pub fn flipped_v(&self) -> Self {
        let mut out = *self;
        for y in 0..SIZE {
            for x in 0..SIZE {
                out.pixels[index(x, y)] = self.pixels[index(x, SIZE - 1 - y)];
            }
        }
        out
    }

    /// The picture rotated clockwise by `rotation`.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let mut out = *self;
        for y in 0..SIZE {
            for x in 0..SIZE {
                let (rx, ry) = rotation.map(x, y);
                out.pixels[index(rx, ry)] = self.pixels[index(x, y)];
            }
        }
        out
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(u32::from(SIZE), u32::from(SIZE))
    }
}

impl DrawTarget for Frame {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u8::try_from(point.x), u8::try_from(point.y)) {
                self.set(x, y, color);
            }
        }
        Ok(())
    }
}

/// An 8-pixel-high strip wider than the matrix, for scrolling.
///
/// ```rust
/// use embedded_graphics::pixelcolor::Rgb565;
/// use embedded_graphics::prelude::*;
/// use pihat_kit::sense_hat::Canvas;
///
/// let mut canvas = Canvas::new(20, Rgb565::BLACK);
/// canvas.set(12, 3, Rgb565::GREEN);
///
/// let frame = canvas.window(8);
/// assert_eq!(frame.get(4, 3), Some(Rgb565::GREEN));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    pixels: Vec<Rgb565>,
}

impl Canvas {
    /// A strip `width` pixels wide filled with `background`.
    pub fn new(width: u32, background: Rgb565) -> Self {
        let width = width.max(u32::from(SIZE));
        Self {
            width,
            pixels: vec![background; width as usize * usize::from(SIZE)],
        }
    }

    /// Strip width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Sets one pixel; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Rgb565) {
        if x < self.width && y < u32::from(SIZE) {
            let i = (y * self.width + x) as usize;
            self.pixels[i] = color;
        }
    }

    /// Number of scroll positions: every window start from 0 to `width - 8`.
    pub fn scroll_steps(&self) -> u32 {
        self.width - u32::from(SIZE) + 1
    }

    /// The 8×8 window whose left edge is at column `offset`.
    pub fn window(&self, offset: u32) -> Frame {
        let offset = offset.min(self.width - u32::from(SIZE));
        let mut frame = Frame::default();
        for y in 0..SIZE {
            for x in 0..SIZE {
                let i = (u32::from(y) * self.width + offset + u32::from(x)) as usize;
                frame.set(x, y, self.pixels[i]);
            }
        }
        frame
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, u32::from(SIZE))
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered() -> Frame {
        let mut frame = Frame::default();
        for y in 0..SIZE {
            for x in 0..SIZE {
                frame.set(x, y, from_raw(u16::from(x) + 10 * u16::from(y)));
            }
        }
        frame
    }

    #[test]
    fn raw_roundtrip_preserves_words() {
        let raw = [0xF800u16; PIXEL_COUNT];
        assert_eq!(Frame::from_raw(&raw).to_raw(), raw);
        assert_eq!(to_raw(Rgb565::RED), 0xF800);
        assert_eq!(to_raw(Rgb565::BLUE), 0x001F);
    }

    #[test]
    fn bounds() {
        let mut frame = Frame::default();
        assert!(!frame.set(8, 0, Rgb565::RED));
        assert_eq!(frame.get(0, 8), None);
        assert!(frame.set(7, 7, Rgb565::RED));
        assert_eq!(frame.get(7, 7), Some(Rgb565::RED));
    }

    #[test]
    fn flips() {
        let frame = numbered();
        assert_eq!(frame.flipped_h().get(0, 2), frame.get(7, 2));
        assert_eq!(frame.flipped_v().get(3, 0), frame.get(3, 7));
        assert_eq!(frame.flipped_h().flipped_h(), frame);
    }

    #[test]
    fn rotation_moves_corners_clockwise() {
        let mut frame = Frame::default();
        frame.set(0, 0, Rgb565::RED);
        assert_eq!(frame.rotated(Rotation::Deg90).get(7, 0), Some(Rgb565::RED));
        assert_eq!(frame.rotated(Rotation::Deg180).get(7, 7), Some(Rgb565::RED));
        assert_eq!(frame.rotated(Rotation::Deg270).get(0, 7), Some(Rgb565::RED));
    }

    #[test]
    fn rotation_inverse_restores() {
        let frame = numbered();
        for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            assert_eq!(frame.rotated(rotation).rotated(rotation.inverse()), frame);
        }
    }

    #[test]
    fn counter_clockwise_turn_matches_column_read() {
        // new(x, y) = old(7 - y, x)
        let frame = numbered();
        let turned = frame.rotated(Rotation::Deg270);
        for y in 0..SIZE {
            for x in 0..SIZE {
                assert_eq!(turned.get(x, y), frame.get(7 - y, x));
            }
        }
    }

    #[test]
    fn degrees_parsing() {
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Deg180.degrees(), 180);
    }

    #[test]
    fn canvas_window_clamps() {
        let mut canvas = Canvas::new(10, Rgb565::BLACK);
        canvas.set(9, 0, Rgb565::WHITE);
        assert_eq!(canvas.scroll_steps(), 3);
        assert_eq!(canvas.window(99).get(7, 0), Some(Rgb565::WHITE));
        assert_eq!(Canvas::new(2, Rgb565::BLACK).width(), 8);
    }

    #[test]
    fn draw_target_clips() {
        let mut frame = Frame::default();
        Pixel(Point::new(-1, 0), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(8, 8), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(2, 3), Rgb565::RED).draw(&mut frame).unwrap();
        assert_eq!(frame.get(2, 3), Some(Rgb565::RED));
        assert_eq!(frame.pixels().iter().filter(|&&p| p == Rgb565::RED).count(), 1);
    }
}
