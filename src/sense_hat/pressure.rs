//! LPS25H barometric pressure sensor.
//!
//! Uses the same one-shot sequence as the HTS221. Pressure is a 24-bit
//! two's-complement value in 1/4096 hPa; temperature is
//! `42.5 + raw / 480` °C.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::Result;
use crate::register::{self, le_i16};

/// Default I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x5C;
/// WHO_AM_I value.
pub const DEVICE_ID: u8 = 0xBD;

const CTRL_REG1: u8 = 0x20;
const CTRL_REG2: u8 = 0x21;
const PRESS_OUT_XL: u8 = 0x28;

const POWER_DOWN: u8 = 0x00;
const POWER_ON_BDU: u8 = 0x84;
const ONE_SHOT: u8 = 0x01;

/// One pressure/temperature reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureReading {
    /// Pressure in hPa (millibar).
    pub pressure_hpa: f32,
    /// Temperature of the pressure die in °C.
    pub temperature_c: f32,
}

impl PressureReading {
    /// Converts the five output bytes starting at `PRESS_OUT_XL`.
    pub fn from_raw(out: &[u8; 5]) -> Self {
        // Sign-extend the 24-bit value through the top byte.
        let pressure = i32::from_le_bytes([0, out[0], out[1], out[2]]) >> 8;
        let temperature = le_i16(out[3], out[4]);
        Self {
            pressure_hpa: pressure as f32 / 4096.0,
            temperature_c: 42.5 + f32::from(temperature) / 480.0,
        }
    }
}

/// LPS25H driver.
pub struct Lps25h<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    poll_ms: u32,
    max_polls: u32,
}

impl<I2C: I2c, D: DelayNs> Lps25h<I2C, D> {
    /// Creates a driver.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            poll_ms: super::humidity::DEFAULT_POLL_MS,
            max_polls: super::humidity::DEFAULT_MAX_POLLS,
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

    /// Runs one measurement; the sensor is powered down afterwards.
    pub fn measure(&mut self) -> Result<PressureReading, I2C::Error> {
        register::expect_identity(&mut self.i2c, self.address, DEVICE_ID)?;

        let result = self.one_shot();
        let shutdown = register::write_register(&mut self.i2c, self.address, CTRL_REG1, POWER_DOWN);
        let reading = result?;
        shutdown?;
        Ok(reading)
    }

    /// Pressure in hPa.
    pub fn pressure(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.measure()?.pressure_hpa)
    }

    /// Temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, I2C::Error> {
        Ok(self.measure()?.temperature_c)
    }

    fn one_shot(&mut self) -> Result<PressureReading, I2C::Error> {
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

        let mut out = [0u8; 5];
        register::read_registers(&mut self.i2c, addr, PRESS_OUT_XL, &mut out)?;
        debug!("lps25h out {:02x?}", out);
        Ok(PressureReading::from_raw(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hal::{MockDelay, MockI2c};

    #[test]
    fn conversion() {
        // 1013.25 hPa = 0x3F5400, -10200 = 0xD828
        let reading = PressureReading::from_raw(&[0x00, 0x54, 0x3F, 0x28, 0xD8]);
        assert!((reading.pressure_hpa - 1013.25).abs() < 0.001);
        assert!((reading.temperature_c - 21.25).abs() < 0.001);
    }

    #[test]
    fn negative_pressure_sign_extends() {
        let reading = PressureReading::from_raw(&[0x00, 0xF0, 0xFF, 0, 0]);
        assert_eq!(reading.pressure_hpa, -1.0);
        assert_eq!(reading.temperature_c, 42.5);
    }

    #[test]
    fn measure_reads_with_auto_increment() {
        let i2c = MockI2c::new()
            .with_register(DEFAULT_ADDRESS, 0x0F, DEVICE_ID)
            .with_registers(DEFAULT_ADDRESS, PRESS_OUT_XL, &[0x00, 0x00, 0x40, 0, 0]);
        let mut sensor = Lps25h::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(sensor.pressure().unwrap(), 1024.0);

        let (i2c, _) = sensor.release();
        assert!(i2c.writes.contains(&(DEFAULT_ADDRESS, vec![0xA8])));
        assert_eq!(i2c.register_writes(DEFAULT_ADDRESS).last(), Some(&(0x20, 0x00)));
    }

    #[test]
    fn rejects_humidity_sensor_id() {
        let i2c = MockI2c::new().with_register(DEFAULT_ADDRESS, 0x0F, 0xBC);
        let mut sensor = Lps25h::new(i2c, MockDelay::new(), DEFAULT_ADDRESS);
        assert_eq!(
            sensor.measure(),
            Err(Error::WrongDevice {
                address: DEFAULT_ADDRESS,
                expected: DEVICE_ID,
                found: 0xBC
            })
        );
    }
}
