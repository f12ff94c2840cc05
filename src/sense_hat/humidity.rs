//! HTS221 relative humidity and temperature sensor.
//!
//! Each measurement is a one-shot conversion:
//!
//! 1. power down (`CTRL_REG1 = 0x00`), then power up with block data update
//!    (`CTRL_REG1 = 0x84`)
//! 2. start a conversion (`CTRL_REG2 = 0x01`) and poll until the bit clears
//! 3. read the factory calibration block and the raw outputs
//! 4. power down again, also when any step above failed
//!
//! Raw outputs are converted with the two-point linear calibration stored in
//! registers `0x30..=0x3F`.
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::hal::{MockDelay, MockI2c};
//! use pihat_kit::sense_hat::Hts221;
//!
//! let i2c = MockI2c::new()
//!     .with_register(0x5F, 0x0F, 0xBC)
//!     // 20..80 %rH over 0..6000, 10..30 °C over 0..2000
//!     .with_registers(0x5F, 0x30, &[40, 160, 80, 240, 0, 0, 0, 0, 0, 0, 0x70, 0x17, 0, 0, 0xD0, 0x07])
//!     .with_registers(0x5F, 0x28, &[0xB8, 0x0B, 0xE8, 0x03]);
//!
//! let mut sensor = Hts221::new(i2c, MockDelay::new(), 0x5F);
//! let m = sensor.measure().unwrap();
//! assert!((m.humidity_rh - 50.0).abs() < 0.01);
//! assert!((m.temperature_c - 20.0).abs() < 0.01);
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::register::{self, le_i16};

/// Default I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x5F;
/// WHO_AM_I value.
pub const DEVICE_ID: u8 = 0xBC;

const CTRL_REG1: u8 = 0x20;
const CTRL_REG2: u8 = 0x21;
const HUMIDITY_OUT_L: u8 = 0x28;
const CALIB_START: u8 = 0x30;

const POWER_DOWN: u8 = 0x00;
const POWER_ON_BDU: u8 = 0x84;
const ONE_SHOT: u8 = 0x01;

/// Default one-shot poll interval.
pub const DEFAULT_POLL_MS: u32 = 25;
/// Default poll limit before giving up (one second at 25 ms).
pub const DEFAULT_MAX_POLLS: u32 = 40;

/// Straight line `y = m * x + c` through two calibration points.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Line {
    m: f32,
    c: f32,
}

impl Line {
    fn through(x0: i16, y0: f32, x1: i16, y1: f32) -> Option<Self> {
        if x0 == x1 {
            return None;
        }
        let m = (y1 - y0) / (f32::from(x1) - f32::from(x0));
        Some(Self { m, c: y1 - m * f32::from(x1) })
    }

    fn at(&self, x: i16) -> f32 {
        self.m * f32::from(x) + self.c
    }
}

/// Factory calibration of one HTS221.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    temperature: Line,
    humidity: Line,
}

impl Calibration {
    /// Decodes the 16-byte block read from `0x30..=0x3F`.
    ///
    /// Returns `None` when either pair of calibration x-points coincides.
    pub fn from_raw(block: &[u8; 16]) -> Option<Self> {
        let h0_rh = f32::from(block[0]) / 2.0;
        let h1_rh = f32::from(block[1]) / 2.0;

        let msb = block[5];
        let t0_x8 = u16::from(msb & 0x03) << 8 | u16::from(block[2]);
        let t1_x8 = u16::from((msb & 0x0C) >> 2) << 8 | u16::from(block[3]);
        let t0_c = f32::from(t0_x8) / 8.0;
        let t1_c = f32::from(t1_x8) / 8.0;

        let h0_out = le_i16(block[6], block[7]);
        let h1_out = le_i16(block[10], block[11]);
        let t0_out = le_i16(block[12], block[13]);
        let t1_out = le_i16(block[14], block[15]);

        Some(Self {
            temperature: Line::through(t0_out, t0_c, t1_out, t1_c)?,
            humidity: Line::through(h0_out, h0_rh, h1_out, h1_rh)?,
        })
    }

    /// Converts a raw TEMP_OUT value to °C.
    pub fn temperature_c(&self, raw: i16) -> f32 {
        self.temperature.at(raw)
    }

    /// Converts a raw H_OUT value to %rH, without clamping.
    pub fn humidity_rh(&self, raw: i16) -> f32 {
        self.humidity.at(raw)
    }
}

/// One humidity/temperature reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Temperature in °C.
    pub temperature_c: f32,
    /// Relative humidity in %, clamped to 0..=100.
    pub humidity_rh: f32,
}

/// HTS221 driver.
pub struct Hts221<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    poll_ms: u32,
    max_polls: u32,
}

impl<I2C: I2c, D: DelayNs> Hts221<I2C, D> {
    /// Creates a driver; nothing is sent until the first measurement.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            poll_ms: DEFAULT_POLL_MS,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }

    /// Changes the one-shot poll interval and limit.
    pub fn with_polling(mut self, poll_ms: u32, max_polls: u32) -> Self {
        self.poll_ms = poll_ms;
        self.max_polls = max_polls.max(1);
        self
    }

    /// Returns the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Runs one measurement.
    pub fn measure(&mut self) -> Result<Measurement, I2C::Error> {
        register::expect_identity(&mut self.i2c, self.address, DEVICE_ID)?;

        let result = self.one_shot();
        let shutdown = register::write_register(&mut self.i2c, self.address, CTRL_REG1, POWER_DOWN);
        let measurement = result?;
        shutdown?;
        Ok(measurement)
    }

    /// Temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.measure()?.temperature_c)
    }

    /// Relative humidity in %.
    pub fn humidity(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.measure()?.humidity_rh)
    }

    fn one_shot(&mut self) -> Result<Measurement, I2C::Error> {
        let addr = self.address;
        register::write_register(&mut self.i2c, addr, CTRL_REG1, POWER_DOWN)?;
        register::write_register(&mut self.i2c, addr, CTRL_REG1, POWER_ON_BDU)?;
        register::write_register(&mut self.i2c, addr, CTRL_REG2, ONE_SHOT)?;
        register::wait_until_clear(
            &mut self.i2c,
            &mut self.delay,
            addr,
            CTRL_REG2,
            self.poll_ms,
            self.max_polls,
        )?;

        let mut block = [0u8; 16];
        register::read_registers(&mut self.i2c, addr, CALIB_START, &mut block)?;
        let calibration = Calibration::from_raw(&block).ok_or(Error::InvalidCalibration)?;

        let mut out = [0u8; 4];
        register::read_registers(&mut self.i2c, addr, HUMIDITY_OUT_L, &mut out)?;
        let h_out = le_i16(out[0], out[1]);
        let t_out = le_i16(out[2], out[3]);
        debug!("hts221 H_OUT={} TEMP_OUT={}", h_out, t_out);

        let humidity = calibration.humidity_rh(h_out);
        let clamped = humidity.clamp(0.0, 100.0);
        if clamped != humidity {
            warn!("hts221 humidity {:.1} %rH out of range, clamped", humidity);
        }

        Ok(Measurement {
            temperature_c: calibration.temperature_c(t_out),
            humidity_rh: clamped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockDelay, MockI2c};
    use embedded_hal::i2c::ErrorKind;

    const CALIB: [u8; 16] = [
        40, 160, 80, 240, 0, 0, 0, 0, 0, 0, 0x70, 0x17, 0, 0, 0xD0, 0x07,
    ];

    fn bus(h_out: i16, t_out: i16) -> MockI2c {
        let h = h_out.to_le_bytes();
        let t = t_out.to_le_bytes();
        MockI2c::new()
            .with_register(DEFAULT_ADDRESS, 0x0F, DEVICE_ID)
            .with_registers(DEFAULT_ADDRESS, CALIB_START, &CALIB)
            .with_registers(DEFAULT_ADDRESS, HUMIDITY_OUT_L, &[h[0], h[1], t[0], t[1]])
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn measurement_sequence() {
        let mut sensor = Hts221::new(bus(3000, 1000), MockDelay::new(), DEFAULT_ADDRESS);
        let m = sensor.measure().unwrap();
        assert!(close(m.humidity_rh, 50.0));
        assert!(close(m.temperature_c, 20.0));

        let (i2c, delay) = sensor.release();
        assert_eq!(
            i2c.register_writes(DEFAULT_ADDRESS),
            vec![(0x20, 0x00), (0x20, 0x84), (0x21, 0x01), (0x20, 0x00)]
        );
        assert_eq!(delay.elapsed_ms(), 25);
    }

    #[test]
    fn temperature_msb_bits() {
        let mut block = CALIB;
        block[5] = 0b0101;
        let cal = Calibration::from_raw(&block).unwrap();
        assert!(close(cal.temperature_c(0), 42.0));
        assert!(close(cal.temperature_c(2000), 62.0));
    }

    #[test]
    fn negative_temperature() {
        let cal = Calibration::from_raw(&CALIB).unwrap();
        assert!(close(cal.temperature_c(-1000), 0.0));
    }

    #[test]
    fn humidity_clamped() {
        let mut sensor = Hts221::new(bus(9000, 0), MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(sensor.humidity().unwrap(), 100.0);

        let mut sensor = Hts221::new(bus(-3000, 0), MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(sensor.humidity().unwrap(), 0.0);
    }

    #[test]
    fn degenerate_calibration() {
        let mut block = CALIB;
        block[14] = 0;
        block[15] = 0;
        assert_eq!(Calibration::from_raw(&block), None);

        let i2c = bus(0, 0).with_registers(DEFAULT_ADDRESS, 0x3E, &[0, 0]);
        let mut sensor = Hts221::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(sensor.measure(), Err(Error::InvalidCalibration));
    }

    #[test]
    fn timeout_still_powers_down() {
        let i2c = bus(0, 0).with_register(DEFAULT_ADDRESS, CTRL_REG2, 0x01);
        let mut sensor =
            Hts221::new(i2c, MockDelay::new(), DEFAULT_ADDRESS).with_polling(25, 3);
        assert_eq!(sensor.measure(), Err(Error::Timeout { polls: 3 }));

        let (i2c, delay) = sensor.release();
        assert_eq!(i2c.register_writes(DEFAULT_ADDRESS).last(), Some(&(0x20, 0x00)));
        assert_eq!(delay.elapsed_ms(), 75);
    }

    #[test]
    fn wrong_device() {
        let i2c = MockI2c::new().with_register(DEFAULT_ADDRESS, 0x0F, 0xBD);
        let mut sensor = Hts221::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert!(matches!(sensor.measure(), Err(Error::WrongDevice { found: 0xBD, .. })));
        assert!(sensor.release().0.writes.len() == 1);
    }

    #[test]
    fn bus_error_propagates() {
        let mut i2c = bus(0, 0);
        i2c.fail_next(ErrorKind::Bus);
        let mut sensor = Hts221::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(sensor.measure(), Err(Error::Bus(ErrorKind::Bus)));
    }
}
