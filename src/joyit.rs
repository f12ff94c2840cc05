//! joy-it button joystick read through a PCF8574.
//!
//! The joystick is four push buttons on the low nibble of the expander port,
//! active-low (a pressed button pulls its pin to ground):
//!
//! ```text
//!  bit     7   6   5   4   3      2     1    0
//!  button  x   x   x   x   right  down  up   left
//! ```
//!
//! Diagonals press two adjacent buttons at once, e.g. `0xF5` is up + right.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::Result;
use crate::pcf8574::{Led, Pcf8574};

/// Mask of the button bits in the port byte.
pub const BUTTON_MASK: u8 = 0x0F;

const LEFT: u8 = 1 << 0;
const UP: u8 = 1 << 1;
const DOWN: u8 = 1 << 2;
const RIGHT: u8 = 1 << 3;

/// Direction reported by the joystick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadDirection {
    /// Left button.
    Left,
    /// Up button.
    Up,
    /// Down button.
    Down,
    /// Right button.
    Right,
    /// Up and left together.
    UpLeft,
    /// Up and right together.
    UpRight,
    /// Down and left together.
    DownLeft,
    /// Down and right together.
    DownRight,
}

impl PadDirection {
    /// Upper-case name, as printed by the demo.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PadDirection::Left => "LEFT",
            PadDirection::Up => "UP",
            PadDirection::Down => "DOWN",
            PadDirection::Right => "RIGHT",
            PadDirection::UpLeft => "UP-LEFT",
            PadDirection::UpRight => "UP-RIGHT",
            PadDirection::DownLeft => "DOWN-LEFT",
            PadDirection::DownRight => "DOWN-RIGHT",
        }
    }

    /// Direction for an active-high pressed mask, if the combination is one.
    pub const fn from_pressed(pressed: u8) -> Option<Self> {
        match pressed & BUTTON_MASK {
            LEFT => Some(PadDirection::Left),
            UP => Some(PadDirection::Up),
            DOWN => Some(PadDirection::Down),
            RIGHT => Some(PadDirection::Right),
            m if m == UP | LEFT => Some(PadDirection::UpLeft),
            m if m == UP | RIGHT => Some(PadDirection::UpRight),
            m if m == DOWN | LEFT => Some(PadDirection::DownLeft),
            m if m == DOWN | RIGHT => Some(PadDirection::DownRight),
            _ => None,
        }
    }
}

/// Decoded button state from one port read.
///
/// # Example
///
/// ```rust
/// use pihat_kit::joyit::{PadDirection, PadReading};
///
/// let reading = PadReading::from_port(0xF5);
/// assert!(reading.any_pressed());
/// assert_eq!(reading.direction(), Some(PadDirection::UpRight));
///
/// assert!(!PadReading::from_port(0xFF).any_pressed());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PadReading {
    pressed: u8,
}

impl PadReading {
    /// Decodes a raw port byte; the upper nibble is ignored.
    pub const fn from_port(port: u8) -> Self {
        Self {
            pressed: !port & BUTTON_MASK,
        }
    }

    /// Active-high mask of pressed buttons (bit0 left .. bit3 right).
    pub const fn pressed(&self) -> u8 {
        self.pressed
    }

    /// Whether any button is down.
    pub const fn any_pressed(&self) -> bool {
        self.pressed != 0
    }

    /// Direction, if the pressed buttons form one.
    pub const fn direction(&self) -> Option<PadDirection> {
        PadDirection::from_pressed(self.pressed)
    }
}

/// joy-it joystick with an indicator LED on the same expander.
pub struct JoyItPad<I2C> {
    expander: Pcf8574<I2C>,
    led: Led,
    poll_ms: u32,
}

impl<I2C: I2c> JoyItPad<I2C> {
    /// Wraps an expander and releases every pin so the buttons can be read.
    pub fn new(mut expander: Pcf8574<I2C>, led: Led, poll_ms: u32) -> Result<Self, I2C::Error> {
        expander.write_port(0xFF)?;
        Ok(Self {
            expander,
            led,
            poll_ms,
        })
    }

    /// Reads the buttons once.
    pub fn poll(&mut self) -> Result<PadReading, I2C::Error> {
        Ok(PadReading::from_port(self.expander.read_port()?))
    }

    /// Blocks until at least one button is pressed.
    pub fn wait_for_press<D: DelayNs>(&mut self, delay: &mut D) -> Result<PadReading, I2C::Error> {
        loop {
            let reading = self.poll()?;
            if reading.any_pressed() {
                return Ok(reading);
            }
            delay.delay_ms(self.poll_ms);
        }
    }

    /// Blocks until the buttons differ from `previous`.
    pub fn wait_for_change<D: DelayNs>(
        &mut self,
        previous: PadReading,
        delay: &mut D,
    ) -> Result<PadReading, I2C::Error> {
        loop {
            let reading = self.poll()?;
            if reading != previous {
                return Ok(reading);
            }
            delay.delay_ms(self.poll_ms);
        }
    }

    /// Switches the indicator LED.
    pub fn set_led(&mut self, lit: bool) -> Result<(), I2C::Error> {
        self.led.set(&mut self.expander, lit)
    }

    /// Borrows the underlying expander.
    pub fn expander(&mut self) -> &mut Pcf8574<I2C> {
        &mut self.expander
    }
}
