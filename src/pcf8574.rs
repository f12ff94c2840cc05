//! PCF8574 remote 8-bit I/O expander.
//!
//! The chip has no registers. A one-byte write sets the output latch, a
//! one-byte read returns the level of all eight pins. Outputs are
//! quasi-bidirectional: a pin latched high is weakly pulled up and can be
//! driven low from outside, which is how inputs are read. A pin latched low
//! sinks current, so LEDs wired to VCC light up when their pin is low.
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::hal::MockI2c;
//! use pihat_kit::pcf8574::{Pcf8574, PinLevel};
//!
//! let mut expander = Pcf8574::new(MockI2c::new(), 0x20);
//! expander.set_pin(4, PinLevel::Low).unwrap();
//! assert_eq!(expander.latch(), 0b1110_1111);
//!
//! let i2c = expander.release();
//! assert_eq!(i2c.writes.last().unwrap().1, vec![0b1110_1111]);
//! ```

use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::{Error, Result};

/// Default I2C address (A2..A0 tied low).
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Electrical level of an expander pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinLevel {
    /// Pin pulled/driven low.
    Low,
    /// Pin released high.
    High,
}

impl PinLevel {
    /// Level of `pin` in a port byte.
    #[inline]
    pub const fn of(port: u8, pin: u8) -> Self {
        if port & (1 << pin) != 0 {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }

    /// Returns the opposite level.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        }
    }
}

/// PCF8574 driver with a local copy of the output latch.
///
/// The latch starts at `0xFF` (every pin released), matching the chip's
/// power-on state.
#[derive(Debug)]
pub struct Pcf8574<I2C> {
    i2c: I2C,
    address: u8,
    latch: u8,
}

impl<I2C: I2c> Pcf8574<I2C> {
    /// Creates a driver. No bus traffic happens until the first operation.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            latch: 0xFF,
        }
    }

    /// Returns the bus and consumes the driver.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// I2C address of the chip.
    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Last value written to the output latch.
    #[inline]
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Reads the current level of all eight pins.
    pub fn read_port(&mut self) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.read(self.address, &mut buf).map_err(Error::Bus)?;
        Ok(buf[0])
    }

    /// Writes the whole output latch.
    pub fn write_port(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[value]).map_err(Error::Bus)?;
        debug!("pcf8574@{:#04x} latch {:#010b}", self.address, value);
        self.latch = value;
        Ok(())
    }

    /// Drives one pin to `level`, leaving the others as latched.
    pub fn set_pin(&mut self, pin: u8, level: PinLevel) -> Result<(), I2C::Error> {
        let mask = pin_mask(pin)?;
        let value = match level {
            PinLevel::High => self.latch | mask,
            PinLevel::Low => self.latch & !mask,
        };
        self.write_port(value)
    }

    /// Inverts one latched pin.
    pub fn toggle_pin(&mut self, pin: u8) -> Result<(), I2C::Error> {
        let mask = pin_mask(pin)?;
        self.write_port(self.latch ^ mask)
    }

    /// Reads the live level of one pin from the chip.
    pub fn read_pin(&mut self, pin: u8) -> Result<PinLevel, I2C::Error> {
        pin_mask(pin)?;
        let port = self.read_port()?;
        Ok(PinLevel::of(port, pin))
    }

    /// Releases the pins in `mask` (latch high) so they can be used as inputs.
    pub fn release_pins(&mut self, mask: u8) -> Result<(), I2C::Error> {
        self.write_port(self.latch | mask)
    }
}

fn pin_mask<E>(pin: u8) -> Result<u8, E> {
    if pin > 7 {
        return Err(Error::InvalidPin(pin));
    }
    Ok(1 << pin)
}

/// An LED on an expander pin.
///
/// LEDs on the RPi Explorer and joy-it boards are wired to VCC through a
/// resistor, so they are active-low: "on" pulls the pin low.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Led {
    /// Expander pin number.
    pub pin: u8,
    /// Whether the LED lights when the pin is low.
    pub active_low: bool,
}

impl Led {
    /// An active-low LED on `pin`.
    pub const fn active_low(pin: u8) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// An active-high LED on `pin`.
    pub const fn active_high(pin: u8) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Pin level that lights the LED.
    pub const fn on_level(&self) -> PinLevel {
        if self.active_low {
            PinLevel::Low
        } else {
            PinLevel::High
        }
    }

    /// Switches the LED on.
    pub fn on<I2C: I2c>(&self, expander: &mut Pcf8574<I2C>) -> Result<(), I2C::Error> {
        expander.set_pin(self.pin, self.on_level())
    }

    /// Switches the LED off.
    pub fn off<I2C: I2c>(&self, expander: &mut Pcf8574<I2C>) -> Result<(), I2C::Error> {
        expander.set_pin(self.pin, self.on_level().inverted())
    }

    /// Switches the LED on or off.
    pub fn set<I2C: I2c>(&self, expander: &mut Pcf8574<I2C>, lit: bool) -> Result<(), I2C::Error> {
        if lit {
            self.on(expander)
        } else {
            self.off(expander)
        }
    }

    /// Whether the latch currently lights the LED.
    pub fn is_on<I2C: I2c>(&self, expander: &Pcf8574<I2C>) -> bool {
        PinLevel::of(expander.latch(), self.pin) == self.on_level()
    }
}

/// Formats a port byte as `0bxxxxxxxx` without allocating.
///
/// ```rust
/// use pihat_kit::pcf8574::binary_digits;
///
/// assert_eq!(&binary_digits(0xA5), b"10100101");
/// ```
pub fn binary_digits(value: u8) -> [u8; 8] {
    let mut digits = [b'0'; 8];
    for (i, digit) in digits.iter_mut().enumerate() {
        if value & (0x80 >> i) != 0 {
            *digit = b'1';
        }
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockI2c;
    use alloc::vec;

    #[test]
    fn latch_starts_released() {
        let expander = Pcf8574::new(MockI2c::new(), DEFAULT_ADDRESS);
        assert_eq!(expander.latch(), 0xFF);
    }

    #[test]
    fn set_pin_low_then_high() {
        let mut expander = Pcf8574::new(MockI2c::new(), DEFAULT_ADDRESS);
        expander.set_pin(4, PinLevel::Low).unwrap();
        expander.set_pin(0, PinLevel::Low).unwrap();
        expander.set_pin(4, PinLevel::High).unwrap();
        assert_eq!(expander.latch(), 0b1111_1110);

        let i2c = expander.release();
        assert_eq!(
            i2c.writes,
            vec![
                (0x20, vec![0b1110_1111]),
                (0x20, vec![0b1110_1110]),
                (0x20, vec![0b1111_1110]),
            ]
        );
    }

    #[test]
    fn invalid_pin_rejected_without_traffic() {
        let mut expander = Pcf8574::new(MockI2c::new(), DEFAULT_ADDRESS);
        assert_eq!(expander.set_pin(8, PinLevel::Low), Err(Error::InvalidPin(8)));
        assert_eq!(expander.read_pin(200), Err(Error::InvalidPin(200)));
        assert!(expander.release().writes.is_empty());
    }

    #[test]
    fn read_pin_uses_live_port() {
        let mut i2c = MockI2c::new();
        i2c.queue_read(&[0b0000_0100]);
        let mut expander = Pcf8574::new(i2c, DEFAULT_ADDRESS);
        assert_eq!(expander.read_pin(2).unwrap(), PinLevel::High);
        // Queue drained: mock answers with its idle byte (0xFF).
        assert_eq!(expander.read_pin(5).unwrap(), PinLevel::High);
    }

    #[test]
    fn toggle_and_release() {
        let mut expander = Pcf8574::new(MockI2c::new(), DEFAULT_ADDRESS);
        expander.write_port(0x00).unwrap();
        expander.toggle_pin(7).unwrap();
        assert_eq!(expander.latch(), 0x80);
        expander.release_pins(0x0F).unwrap();
        assert_eq!(expander.latch(), 0x8F);
    }

    #[test]
    fn led_polarity() {
        let mut expander = Pcf8574::new(MockI2c::new(), DEFAULT_ADDRESS);
        let led = Led::active_low(4);
        led.on(&mut expander).unwrap();
        assert_eq!(expander.latch(), 0xEF);
        assert!(led.is_on(&expander));
        led.off(&mut expander).unwrap();
        assert_eq!(expander.latch(), 0xFF);

        let led = Led::active_high(1);
        led.set(&mut expander, true).unwrap();
        assert_eq!(expander.latch(), 0xFF);
        led.set(&mut expander, false).unwrap();
        assert_eq!(expander.latch(), 0xFD);
    }

    #[test]
    fn bus_failure_keeps_latch() {
        let mut i2c = MockI2c::new();
        i2c.fail_next(embedded_hal::i2c::ErrorKind::Bus);
        let mut expander = Pcf8574::new(i2c, DEFAULT_ADDRESS);
        assert!(expander.write_port(0x00).is_err());
        assert_eq!(expander.latch(), 0xFF);
    }

    #[test]
    fn binary_digits_edges() {
        assert_eq!(&binary_digits(0x00), b"00000000");
        assert_eq!(&binary_digits(0xFF), b"11111111");
        assert_eq!(&binary_digits(0x01), b"00000001");
    }
}
