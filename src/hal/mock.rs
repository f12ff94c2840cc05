//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the bus and every hardware trait,
//! so the drivers and demos can be developed and tested on a desktop.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockI2c`] | [`I2c`] | Register map, queued raw reads, transfer log |
//! | [`MockDelay`] | [`DelayNs`] | Accumulates requested delay instead of sleeping |
//! | [`MockFrameBuffer`] | [`PixelBuffer`], [`GammaControl`] | In-memory LED matrix |
//! | [`MockStick`] | [`StickInput`] | Queued joystick events |
//! | [`MockCamera`] | [`StillCamera`] | Records capture paths |
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::hal::{MockDelay, MockI2c};
//! use pihat_kit::pcf8591::Pcf8591;
//!
//! let mut i2c = MockI2c::new();
//! i2c.queue_read(&[0x00, 0xFF]);
//!
//! let mut adc = Pcf8591::new(i2c, MockDelay::new(), 0x48);
//! assert_eq!(adc.read_millivolts(0).unwrap(), 3300);
//!
//! let (i2c, delay) = adc.release();
//! assert_eq!(i2c.writes, vec![(0x48, vec![0x40])]);
//! assert_eq!(delay.elapsed_us(), 100);
//! ```
//!
//! [`I2c`]: embedded_hal::i2c::I2c
//! [`DelayNs`]: embedded_hal::delay::DelayNs
//! [`PixelBuffer`]: crate::traits::PixelBuffer
//! [`GammaControl`]: crate::traits::GammaControl
//! [`StickInput`]: crate::traits::StickInput
//! [`StillCamera`]: crate::traits::StillCamera

use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};

use crate::register::AUTO_INCREMENT;
use crate::sense_hat::StickEvent;
use crate::traits::{GammaControl, PixelBuffer, StickInput, StillCamera, PIXEL_COUNT};

// ============================================================================
// Bus Mocks
// ============================================================================

/// Mock I2C bus.
///
/// Two read models cover the chips in this crate:
///
/// - **Register reads**: a write followed by a read in the same transaction
///   (`write_read`) serves bytes from the register map, starting at the
///   written sub-address with the auto-increment bit masked off. Unset
///   registers read `0x00`.
/// - **Raw reads**: a read with no preceding write pops the next queued
///   reply (PCF8574 port, PCF8591 conversions). An empty queue reads as
///   `0xFF`, the idle level of a pulled-up bus.
///
/// Writes never modify the register map, so self-clearing bits stay as
/// configured. Every write and read is logged for inspection.
///
/// # Example
///
/// ```rust
/// use embedded_hal::i2c::I2c;
/// use pihat_kit::hal::MockI2c;
///
/// let mut i2c = MockI2c::new().with_register(0x5F, 0x0F, 0xBC);
/// let mut id = [0u8; 1];
/// i2c.write_read(0x5F, &[0x0F], &mut id).unwrap();
/// assert_eq!(id[0], 0xBC);
///
/// let mut port = [0u8; 1];
/// i2c.read(0x20, &mut port).unwrap();
/// assert_eq!(port[0], 0xFF);
/// ```
#[derive(Debug)]
pub struct MockI2c {
    /// Every write as `(address, bytes)`, in order.
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Every read as `(address, length)`, in order.
    pub reads: Vec<(u8, usize)>,
    registers: BTreeMap<(u8, u8), u8>,
    read_queue: VecDeque<Vec<u8>>,
    idle_byte: u8,
    fail_next: Option<ErrorKind>,
}

impl Default for MockI2c {
    fn default() -> Self {
        Self {
            writes: Vec::new(),
            reads: Vec::new(),
            registers: BTreeMap::new(),
            read_queue: VecDeque::new(),
            idle_byte: 0xFF,
            fail_next: None,
        }
    }
}

impl MockI2c {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Presets a register (builder form).
    pub fn with_register(mut self, address: u8, reg: u8, value: u8) -> Self {
        self.set_register(address, reg, value);
        self
    }

    /// Presets a block of consecutive registers (builder form).
    pub fn with_registers(mut self, address: u8, start: u8, values: &[u8]) -> Self {
        for (offset, &value) in values.iter().enumerate() {
            self.set_register(address, start.wrapping_add(offset as u8), value);
        }
        self
    }

    /// Sets a register value.
    pub fn set_register(&mut self, address: u8, reg: u8, value: u8) {
        self.registers.insert((address, reg & !AUTO_INCREMENT), value);
    }

    /// Current value of a register.
    pub fn register(&self, address: u8, reg: u8) -> u8 {
        self.registers
            .get(&(address, reg & !AUTO_INCREMENT))
            .copied()
            .unwrap_or(0)
    }

    /// Queues the reply for the next raw read.
    pub fn queue_read(&mut self, bytes: &[u8]) {
        self.read_queue.push_back(bytes.to_vec());
    }

    /// Makes the next transaction fail with `kind`.
    pub fn fail_next(&mut self, kind: ErrorKind) {
        self.fail_next = Some(kind);
    }

    /// Sub-addresses written to `address` as single-byte register writes
    /// `[reg, value]`, in order.
    pub fn register_writes(&self, address: u8) -> Vec<(u8, u8)> {
        self.writes
            .iter()
            .filter(|(a, bytes)| *a == address && bytes.len() == 2)
            .map(|(_, bytes)| (bytes[0], bytes[1]))
            .collect()
    }

    fn serve_raw(&mut self, buf: &mut [u8]) {
        let reply = self.read_queue.pop_front().unwrap_or_default();
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = reply.get(i).copied().unwrap_or(self.idle_byte);
        }
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if let Some(kind) = self.fail_next.take() {
            return Err(kind);
        }

        let mut pointer: Option<u8> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push((address, bytes.to_vec()));
                    pointer = bytes.first().map(|reg| reg & !AUTO_INCREMENT);
                }
                Operation::Read(buf) => {
                    self.reads.push((address, buf.len()));
                    match pointer {
                        Some(start) => {
                            for (i, slot) in buf.iter_mut().enumerate() {
                                *slot = self.register(address, start.wrapping_add(i as u8));
                            }
                        }
                        None => self.serve_raw(buf),
                    }
                }
            }
        }
        Ok(())
    }
}

/// Mock delay that records how long the caller asked to wait.
///
/// # Example
///
/// ```rust
/// use embedded_hal::delay::DelayNs;
/// use pihat_kit::hal::MockDelay;
///
/// let mut delay = MockDelay::new();
/// delay.delay_ms(25);
/// delay.delay_us(500);
/// assert_eq!(delay.elapsed_us(), 25_500);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    /// Creates a delay with nothing elapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay in nanoseconds.
    pub fn elapsed_ns(&self) -> u64 {
        self.total_ns
    }

    /// Total requested delay in microseconds.
    pub fn elapsed_us(&self) -> u64 {
        self.total_ns / 1_000
    }

    /// Total requested delay in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_ns += u64::from(us) * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

// ============================================================================
// Sense HAT Mocks
// ============================================================================

/// In-memory Sense HAT framebuffer.
///
/// The gamma table starts out as the driver's default ramp.
#[derive(Debug, Clone)]
pub struct MockFrameBuffer {
    /// Raw RGB565 words, row-major.
    pub pixels: [u16; PIXEL_COUNT],
    /// Current gamma table.
    pub gamma: [u8; 32],
    /// Arguments of every `reset_gamma` call (`true` = low light).
    pub gamma_resets: Vec<bool>,
    /// Number of whole-buffer writes.
    pub write_count: usize,
}

/// Default gamma ramp of the Sense HAT driver.
pub const DEFAULT_GAMMA: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 17, 18, 20, 21, 23,
    25, 27, 29, 31,
];

/// Low-light gamma ramp of the Sense HAT driver.
pub const LOW_LIGHT_GAMMA: [u8; 32] = [
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 10,
    10,
];

impl Default for MockFrameBuffer {
    fn default() -> Self {
        Self {
            pixels: [0; PIXEL_COUNT],
            gamma: DEFAULT_GAMMA,
            gamma_resets: Vec::new(),
            write_count: 0,
        }
    }
}

impl MockFrameBuffer {
    /// Creates a blank framebuffer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PixelBuffer for MockFrameBuffer {
    type Error = ();

    fn read_pixels(&mut self, out: &mut [u16; PIXEL_COUNT]) -> Result<(), ()> {
        *out = self.pixels;
        Ok(())
    }

    fn write_pixels(&mut self, pixels: &[u16; PIXEL_COUNT]) -> Result<(), ()> {
        self.pixels = *pixels;
        self.write_count += 1;
        Ok(())
    }
}

impl GammaControl for MockFrameBuffer {
    type Error = ();

    fn gamma(&mut self) -> Result<[u8; 32], ()> {
        Ok(self.gamma)
    }

    fn set_gamma(&mut self, table: &[u8; 32]) -> Result<(), ()> {
        self.gamma = *table;
        Ok(())
    }

    fn reset_gamma(&mut self, low_light: bool) -> Result<(), ()> {
        self.gamma = if low_light { LOW_LIGHT_GAMMA } else { DEFAULT_GAMMA };
        self.gamma_resets.push(low_light);
        Ok(())
    }
}

/// Mock joystick that replays queued events.
///
/// `wait_for_event` returns `Err(())` once the queue is empty, which ends
/// event loops in tests.
#[derive(Debug, Default)]
pub struct MockStick {
    events: VecDeque<StickEvent>,
}

impl MockStick {
    /// Creates a stick with no pending events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event.
    pub fn queue(&mut self, event: StickEvent) {
        self.events.push_back(event);
    }

    /// Number of events not yet delivered.
    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl StickInput for MockStick {
    type Error = ();

    fn wait_for_event(&mut self) -> Result<StickEvent, ()> {
        self.events.pop_front().ok_or(())
    }
}

// ============================================================================
// Camera Mock
// ============================================================================

/// Mock still camera.
///
/// # Example
///
/// ```rust
/// use pihat_kit::hal::MockCamera;
/// use pihat_kit::traits::StillCamera;
///
/// let mut camera = MockCamera::new();
/// camera.capture("/tmp/image.jpg").unwrap();
/// assert_eq!(camera.captures, vec!["/tmp/image.jpg".to_string()]);
///
/// camera.fail = true;
/// assert!(camera.capture("/tmp/next.jpg").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockCamera {
    /// Paths of successful captures.
    pub captures: Vec<String>,
    /// Makes every capture fail while set.
    pub fail: bool,
}

impl MockCamera {
    /// Creates a working camera.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StillCamera for MockCamera {
    type Error = ();

    fn capture(&mut self, path: &str) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.captures.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sense_hat::{StickAction, StickDirection};

    #[test]
    fn register_block_read_masks_auto_increment() {
        let mut i2c = MockI2c::new().with_registers(0x5C, 0x28, &[1, 2, 3]);
        let mut buf = [0u8; 3];
        i2c.write_read(0x5C, &[0xA8], &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(i2c.reads, vec![(0x5C, 3)]);
    }

    #[test]
    fn raw_reads_pad_with_idle() {
        let mut i2c = MockI2c::new();
        i2c.queue_read(&[0x12]);
        let mut buf = [0u8; 3];
        i2c.read(0x48, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0xFF, 0xFF]);
    }

    #[test]
    fn writes_do_not_touch_registers() {
        let mut i2c = MockI2c::new();
        i2c.write(0x5F, &[0x21, 0x01]).unwrap();
        assert_eq!(i2c.register(0x5F, 0x21), 0);
        assert_eq!(i2c.register_writes(0x5F), vec![(0x21, 0x01)]);
    }

    #[test]
    fn failure_is_one_shot() {
        let mut i2c = MockI2c::new();
        i2c.fail_next(ErrorKind::NoAcknowledge(embedded_hal::i2c::NoAcknowledgeSource::Address));
        assert!(i2c.write(0x20, &[0x00]).is_err());
        assert!(i2c.write(0x20, &[0x00]).is_ok());
        assert_eq!(i2c.writes.len(), 1);
    }

    #[test]
    fn stick_drains_queue() {
        let mut stick = MockStick::new();
        stick.queue(StickEvent::new(StickDirection::Left, StickAction::Pressed));
        assert_eq!(stick.pending(), 1);
        assert!(stick.wait_for_event().is_ok());
        assert!(stick.wait_for_event().is_err());
    }

    #[test]
    fn framebuffer_gamma_reset() {
        let mut fb = MockFrameBuffer::new();
        fb.reset_gamma(true).unwrap();
        assert_eq!(fb.gamma, LOW_LIGHT_GAMMA);
        fb.reset_gamma(false).unwrap();
        assert_eq!(fb.gamma, DEFAULT_GAMMA);
    }
}
