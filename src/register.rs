//! Register access helpers for the ST sensors on the Sense HAT.
//!
//! The HTS221, LPS25H and LSM9DS1 all use the same sub-address scheme: write
//! the register number, then read one or more bytes. Multi-byte reads set the
//! MSB of the sub-address to auto-increment.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{Error, Result};

/// Sub-address flag that enables register auto-increment.
pub const AUTO_INCREMENT: u8 = 0x80;

/// Common WHO_AM_I register address.
pub const WHO_AM_I: u8 = 0x0F;

pub(crate) fn read_register<I2C: I2c>(i2c: &mut I2C, address: u8, reg: u8) -> Result<u8, I2C::Error> {
    let mut buf = [0u8; 1];
    i2c.write_read(address, &[reg], &mut buf)
        .map_err(Error::Bus)?;
    Ok(buf[0])
}

pub(crate) fn read_registers<I2C: I2c>(
    i2c: &mut I2C,
    address: u8,
    reg: u8,
    buf: &mut [u8],
) -> Result<(), I2C::Error> {
    i2c.write_read(address, &[reg | AUTO_INCREMENT], buf)
        .map_err(Error::Bus)
}

/// Block read without the auto-increment flag, for chips that increment on
/// their own (LSM9DS1 accelerometer/gyroscope with IF_ADD_INC set).
pub(crate) fn read_sequential<I2C: I2c>(
    i2c: &mut I2C,
    address: u8,
    reg: u8,
    buf: &mut [u8],
) -> Result<(), I2C::Error> {
    i2c.write_read(address, &[reg], buf).map_err(Error::Bus)
}

pub(crate) fn write_register<I2C: I2c>(
    i2c: &mut I2C,
    address: u8,
    reg: u8,
    value: u8,
) -> Result<(), I2C::Error> {
    i2c.write(address, &[reg, value]).map_err(Error::Bus)
}

/// Checks WHO_AM_I against the expected identifier.
pub(crate) fn expect_identity<I2C: I2c>(
    i2c: &mut I2C,
    address: u8,
    expected: u8,
) -> Result<(), I2C::Error> {
    let found = read_register(i2c, address, WHO_AM_I)?;
    if found != expected {
        return Err(Error::WrongDevice {
            address,
            expected,
            found,
        });
    }
    Ok(())
}

/// Polls a self-clearing one-shot bit register until it reads zero.
pub(crate) fn wait_until_clear<I2C: I2c, D: DelayNs>(
    i2c: &mut I2C,
    delay: &mut D,
    address: u8,
    reg: u8,
    poll_ms: u32,
    max_polls: u32,
) -> Result<(), I2C::Error> {
    for _ in 0..max_polls {
        delay.delay_ms(poll_ms);
        if read_register(i2c, address, reg)? == 0 {
            return Ok(());
        }
    }
    Err(Error::Timeout { polls: max_polls })
}

/// Combines little-endian register bytes into a signed 16-bit value.
#[inline]
pub(crate) fn le_i16(low: u8, high: u8) -> i16 {
    i16::from_le_bytes([low, high])
}
