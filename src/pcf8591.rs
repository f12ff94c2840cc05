//! PCF8591 8-bit A/D and D/A converter.
//!
//! # Control Byte
//!
//! Every transfer starts with a control byte:
//!
//! ```text
//!  bit   7   6             5..4           3   2                1..0
//!        0   analog out    input mode     0   auto-increment   channel
//! ```
//!
//! The byte written after the control byte goes into the DAC register. Reads
//! return conversion results, and the first byte of every read is the result
//! of the *previous* conversion, so it is always discarded.
//!
//! # Conversions
//!
//! The DAC output is `Vout = Vref * code / 255`; ADC codes use the same
//! scale. With the default 3300 mV reference one step is about 12.9 mV.
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::hal::{MockDelay, MockI2c};
//! use pihat_kit::pcf8591::Pcf8591;
//!
//! let mut i2c = MockI2c::new();
//! i2c.queue_read(&[0x00, 0x80]); // stale byte, then the fresh conversion
//!
//! let mut adc = Pcf8591::new(i2c, MockDelay::new(), 0x48);
//! assert_eq!(adc.read_channel(0).unwrap(), 0x80);
//! assert_eq!(adc.code_to_millivolts(0x80), 1656);
//! ```

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::debug;

use crate::error::{Error, Result};

/// Default I2C address (A2..A0 tied low).
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Default reference voltage in millivolts (Raspberry Pi 3.3 V rail).
pub const DEFAULT_VREF_MV: u32 = 3300;

/// Full-scale code of the ADC and DAC.
pub const FULL_SCALE: u32 = 255;

const OUTPUT_ENABLE: u8 = 0x40;
const AUTO_INCREMENT: u8 = 0x04;

/// Analog input programming (control bits 5..4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputMode {
    /// Four single-ended inputs AIN0..AIN3.
    #[default]
    FourSingleEnded,
    /// Three differential inputs AIN0-AIN3, AIN1-AIN3, AIN2-AIN3.
    ThreeDifferential,
    /// AIN0 and AIN1 single-ended, AIN2-AIN3 differential.
    MixedSingleDifferential,
    /// Two differential inputs AIN0-AIN1 and AIN2-AIN3.
    TwoDifferential,
}

impl InputMode {
    /// Number of ADC channels this mode exposes.
    pub const fn channel_count(&self) -> u8 {
        match self {
            InputMode::FourSingleEnded => 4,
            InputMode::ThreeDifferential | InputMode::MixedSingleDifferential => 3,
            InputMode::TwoDifferential => 2,
        }
    }

    const fn bits(&self) -> u8 {
        match self {
            InputMode::FourSingleEnded => 0b00,
            InputMode::ThreeDifferential => 0b01,
            InputMode::MixedSingleDifferential => 0b10,
            InputMode::TwoDifferential => 0b11,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => InputMode::FourSingleEnded,
            0b01 => InputMode::ThreeDifferential,
            0b10 => InputMode::MixedSingleDifferential,
            _ => InputMode::TwoDifferential,
        }
    }
}

/// Structured PCF8591 control byte.
///
/// ```rust
/// use pihat_kit::pcf8591::{ControlByte, InputMode};
///
/// let ctrl = ControlByte {
///     output_enable: true,
///     input_mode: InputMode::FourSingleEnded,
///     auto_increment: false,
///     channel: 2,
/// };
/// assert_eq!(ctrl.to_byte(), 0x42);
/// assert_eq!(ControlByte::from_byte(0x42), ctrl);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ControlByte {
    /// Analog output (DAC amplifier) enabled.
    pub output_enable: bool,
    /// Analog input programming.
    pub input_mode: InputMode,
    /// Cycle through the channels on successive reads.
    pub auto_increment: bool,
    /// A/D channel number.
    pub channel: u8,
}

impl ControlByte {
    /// Encodes the control byte. Reserved bits 7 and 3 are always zero.
    pub const fn to_byte(&self) -> u8 {
        let mut byte = (self.input_mode.bits() << 4) | (self.channel & 0b11);
        if self.output_enable {
            byte |= OUTPUT_ENABLE;
        }
        if self.auto_increment {
            byte |= AUTO_INCREMENT;
        }
        byte
    }

    /// Decodes a control byte, ignoring the reserved bits.
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            output_enable: byte & OUTPUT_ENABLE != 0,
            input_mode: InputMode::from_bits(byte >> 4),
            auto_increment: byte & AUTO_INCREMENT != 0,
            channel: byte & 0b11,
        }
    }
}

impl fmt::Display for ControlByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.to_byte())
    }
}

/// PCF8591 driver.
///
/// Keeps the last DAC code so the analog output can be re-enabled without
/// changing its level.
pub struct Pcf8591<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    vref_mv: u32,
    input_mode: InputMode,
    settle_us: u32,
    scan_settle_ms: u32,
    dac_code: u8,
    output_enabled: bool,
}

impl<I2C: I2c, D: DelayNs> Pcf8591<I2C, D> {
    /// Creates a driver with the default reference and single-ended inputs.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            vref_mv: DEFAULT_VREF_MV,
            input_mode: InputMode::FourSingleEnded,
            settle_us: 100,
            scan_settle_ms: 100,
            dac_code: 0,
            output_enabled: false,
        }
    }

    /// Sets the reference voltage used for millivolt conversions.
    pub fn with_vref_mv(mut self, vref_mv: u32) -> Self {
        self.vref_mv = vref_mv.max(1);
        self
    }

    /// Sets the analog input programming.
    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    /// Sets the wait between channel selection and a single read.
    pub fn with_settle_us(mut self, us: u32) -> Self {
        self.settle_us = us;
        self
    }

    /// Sets the wait between starting an auto-increment scan and reading it.
    pub fn with_scan_settle_ms(mut self, ms: u32) -> Self {
        self.scan_settle_ms = ms;
        self
    }

    /// Returns the bus and delay, consuming the driver.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Reference voltage in millivolts.
    #[inline]
    pub fn vref_mv(&self) -> u32 {
        self.vref_mv
    }

    /// Current input programming.
    #[inline]
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Last code written to the DAC.
    #[inline]
    pub fn dac_code(&self) -> u8 {
        self.dac_code
    }

    /// Converts an 8-bit code to millivolts.
    pub fn code_to_millivolts(&self, code: u8) -> u32 {
        u32::from(code) * self.vref_mv / FULL_SCALE
    }

    /// Converts millivolts to an 8-bit code.
    pub fn millivolts_to_code(&self, millivolts: u32) -> Result<u8, I2C::Error> {
        if millivolts > self.vref_mv {
            return Err(Error::VoltageOutOfRange {
                millivolts,
                max_mv: self.vref_mv,
            });
        }
        // Bounded by the check above.
        Ok((millivolts * FULL_SCALE / self.vref_mv) as u8)
    }

    fn control(&self, channel: u8, auto_increment: bool, output_enable: bool) -> ControlByte {
        ControlByte {
            output_enable,
            input_mode: self.input_mode,
            auto_increment,
            channel,
        }
    }

    fn check_channel(&self, channel: u8) -> Result<(), I2C::Error> {
        if channel >= self.input_mode.channel_count() {
            return Err(Error::InvalidChannel {
                channel,
                mode: self.input_mode,
            });
        }
        Ok(())
    }

    /// Reads one channel and returns its 8-bit code.
    ///
    /// The analog output bit is set while selecting the channel; with the
    /// internal oscillator running the conversion is ready after ~100 µs
    /// instead of ~100 ms.
    pub fn read_channel(&mut self, channel: u8) -> Result<u8, I2C::Error> {
        self.check_channel(channel)?;
        let ctrl = self.control(channel, false, true);
        self.i2c
            .write(self.address, &[ctrl.to_byte()])
            .map_err(Error::Bus)?;
        self.output_enabled = true;
        self.delay.delay_us(self.settle_us);

        let mut buf = [0u8; 2];
        self.i2c.read(self.address, &mut buf).map_err(Error::Bus)?;
        debug!("pcf8591 ch{} ctrl {} -> {:#04x}", channel, ctrl, buf[1]);
        Ok(buf[1])
    }

    /// Reads one channel in millivolts.
    pub fn read_millivolts(&mut self, channel: u8) -> Result<u32, I2C::Error> {
        let code = self.read_channel(channel)?;
        Ok(self.code_to_millivolts(code))
    }

    /// Reads every channel of the current mode in one auto-increment scan.
    pub fn read_all(&mut self) -> Result<Vec<u8, 4>, I2C::Error> {
        let count = usize::from(self.input_mode.channel_count());
        let ctrl = self.control(0, true, self.output_enabled);
        self.i2c
            .write(self.address, &[ctrl.to_byte()])
            .map_err(Error::Bus)?;
        self.delay.delay_ms(self.scan_settle_ms);

        let mut buf = [0u8; 5];
        self.i2c
            .read(self.address, &mut buf[..=count])
            .map_err(Error::Bus)?;

        let mut values = Vec::new();
        for &code in &buf[1..=count] {
            // Capacity equals the largest channel count.
            let _ = values.push(code);
        }
        debug!("pcf8591 scan ctrl {} -> {:02x?}", ctrl, values.as_slice());
        Ok(values)
    }

    /// Writes a raw code to the DAC and enables the analog output.
    pub fn write_dac(&mut self, code: u8) -> Result<(), I2C::Error> {
        let ctrl = self.control(0, false, true);
        self.i2c
            .write(self.address, &[ctrl.to_byte(), code])
            .map_err(Error::Bus)?;
        self.dac_code = code;
        self.output_enabled = true;
        Ok(())
    }

    /// Writes a voltage to the DAC.
    pub fn write_millivolts(&mut self, millivolts: u32) -> Result<(), I2C::Error> {
        let code = self.millivolts_to_code(millivolts)?;
        self.write_dac(code)
    }

    /// Switches the analog output amplifier off.
    pub fn disable_output(&mut self) -> Result<(), I2C::Error> {
        let ctrl = self.control(0, false, false);
        self.i2c
            .write(self.address, &[ctrl.to_byte()])
            .map_err(Error::Bus)?;
        self.output_enabled = false;
        Ok(())
    }
}
