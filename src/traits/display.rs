//! Framebuffer abstraction for the Sense HAT LED matrix.
//!
//! The Sense HAT kernel driver exposes the 8×8 matrix as a 128-byte
//! framebuffer of RGB565 words. [`PixelBuffer`] is the minimal access the
//! [`LedMatrix`](crate::sense_hat::LedMatrix) driver needs; [`GammaControl`]
//! covers the driver's private gamma ioctls.

/// Number of pixels on the Sense HAT matrix.
pub const PIXEL_COUNT: usize = 64;

/// Raw framebuffer access: 64 RGB565 words, row-major, index `x + 8 * y`.
///
/// # Example Implementation
///
/// ```rust
/// use pihat_kit::traits::{PixelBuffer, PIXEL_COUNT};
///
/// struct RamBuffer([u16; PIXEL_COUNT]);
///
/// impl PixelBuffer for RamBuffer {
///     type Error = core::convert::Infallible;
///
///     fn read_pixels(&mut self, out: &mut [u16; PIXEL_COUNT]) -> Result<(), Self::Error> {
///         *out = self.0;
///         Ok(())
///     }
///
///     fn write_pixels(&mut self, pixels: &[u16; PIXEL_COUNT]) -> Result<(), Self::Error> {
///         self.0 = *pixels;
///         Ok(())
///     }
/// }
///
/// let mut fb = RamBuffer([0; PIXEL_COUNT]);
/// fb.write_pixel(9, 0xF800).unwrap();
/// assert_eq!(fb.0[9], 0xF800);
/// ```
pub trait PixelBuffer {
    /// Error type for framebuffer access.
    type Error;

    /// Copies the whole framebuffer into `out`.
    fn read_pixels(&mut self, out: &mut [u16; PIXEL_COUNT]) -> Result<(), Self::Error>;

    /// Replaces the whole framebuffer.
    fn write_pixels(&mut self, pixels: &[u16; PIXEL_COUNT]) -> Result<(), Self::Error>;

    /// Writes a single word.
    ///
    /// Default implementation does a read-modify-write of the whole buffer;
    /// memory-mapped backends should override it.
    fn write_pixel(&mut self, index: usize, value: u16) -> Result<(), Self::Error> {
        let mut pixels = [0u16; PIXEL_COUNT];
        self.read_pixels(&mut pixels)?;
        if let Some(slot) = pixels.get_mut(index) {
            *slot = value;
        }
        self.write_pixels(&pixels)
    }
}

/// Sense HAT gamma table control.
///
/// The driver converts RGB565 to 5-bit-per-channel values and looks each one
/// up in a 32-entry table before sending it to the LED controller.
pub trait GammaControl {
    /// Error type for gamma operations.
    type Error;

    /// Reads the current 32-entry gamma table.
    fn gamma(&mut self) -> Result<[u8; 32], Self::Error>;

    /// Replaces the gamma table. Entries are 0..=31.
    fn set_gamma(&mut self, table: &[u8; 32]) -> Result<(), Self::Error>;

    /// Restores a built-in table: the default one, or the low-light one.
    fn reset_gamma(&mut self, low_light: bool) -> Result<(), Self::Error>;
}
