//! LSM9DS1 inertial measurement unit.
//!
//! The chip answers on two addresses: accelerometer and gyroscope at
//! `0x6A`, magnetometer at `0x1C`. The accelerometer/gyroscope side
//! auto-increments on its own once `IF_ADD_INC` is set, the magnetometer
//! needs the MSB of the sub-address set for block reads.

use core::f32::consts::PI;

use embedded_hal::i2c::I2c;
use log::info;

use crate::error::Result;
use crate::register::{self, le_i16};

/// Default accelerometer/gyroscope address.
pub const DEFAULT_AG_ADDRESS: u8 = 0x6A;
/// Default magnetometer address.
pub const DEFAULT_MAG_ADDRESS: u8 = 0x1C;
/// Accelerometer/gyroscope WHO_AM_I value.
pub const AG_DEVICE_ID: u8 = 0x68;
/// Magnetometer WHO_AM_I value.
pub const MAG_DEVICE_ID: u8 = 0x3D;

// Accelerometer / gyroscope
const CTRL_REG1_G: u8 = 0x10;
const OUT_X_L_G: u8 = 0x18;
const CTRL_REG6_XL: u8 = 0x20;
const CTRL_REG8: u8 = 0x22;
const OUT_X_L_XL: u8 = 0x28;

// Magnetometer
const CTRL_REG1_M: u8 = 0x20;
const CTRL_REG2_M: u8 = 0x21;
const CTRL_REG3_M: u8 = 0x22;
const CTRL_REG4_M: u8 = 0x23;
const OUT_X_L_M: u8 = 0x28;

/// 119 Hz, ±245 dps.
const GYRO_119HZ_245DPS: u8 = 0x60;
/// 119 Hz, ±2 g.
const ACCEL_119HZ_2G: u8 = 0x60;
/// Block data update + register auto-increment.
const BDU_IF_ADD_INC: u8 = 0x44;
/// Ultra-high performance X/Y, 10 Hz.
const MAG_XY_UHP_10HZ: u8 = 0x70;
/// ±4 gauss.
const MAG_4GAUSS: u8 = 0x00;
/// Continuous conversion.
const MAG_CONTINUOUS: u8 = 0x00;
/// Ultra-high performance Z.
const MAG_Z_UHP: u8 = 0x0C;

/// g per LSB at ±2 g.
pub const ACCEL_G_PER_LSB: f32 = 0.000_061;
/// Degrees per second per LSB at ±245 dps.
pub const GYRO_DPS_PER_LSB: f32 = 0.008_75;
/// Gauss per LSB at ±4 gauss.
pub const MAG_GAUSS_PER_LSB: f32 = 0.000_14;

/// Three-axis sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    /// X axis.
    pub x: f32,
    /// Y axis.
    pub y: f32,
    /// Z axis.
    pub z: f32,
}

impl Vector3 {
    /// Creates a vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn from_raw(raw: &[u8; 6], scale: f32) -> Self {
        Self {
            x: f32::from(le_i16(raw[0], raw[1])) * scale,
            y: f32::from(le_i16(raw[2], raw[3])) * scale,
            z: f32::from(le_i16(raw[4], raw[5])) * scale,
        }
    }
}

#[cfg(feature = "std")]
impl Vector3 {
    /// Pitch and roll in radians from a gravity vector.
    pub fn tilt(&self) -> Tilt {
        Tilt {
            pitch: (-self.x).atan2((self.y * self.y + self.z * self.z).sqrt()),
            roll: self.y.atan2(self.z),
        }
    }

    /// Heading in degrees `[0, 360)` from a level magnetometer sample.
    pub fn compass_heading(&self) -> f32 {
        let heading = self.y.atan2(self.x).to_degrees();
        if heading < 0.0 {
            heading + 360.0
        } else {
            heading
        }
    }
}

/// Board orientation from the accelerometer.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tilt {
    /// Rotation about Y in radians.
    pub pitch: f32,
    /// Rotation about X in radians.
    pub roll: f32,
}

/// LSM9DS1 driver.
pub struct Lsm9ds1<I2C> {
    i2c: I2C,
    ag_address: u8,
    mag_address: u8,
}

impl<I2C: I2c> Lsm9ds1<I2C> {
    /// Creates a driver for the given pair of addresses.
    pub fn new(i2c: I2C, ag_address: u8, mag_address: u8) -> Self {
        Self {
            i2c,
            ag_address,
            mag_address,
        }
    }

    /// Returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Checks both identities and starts all three sensors.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        let (ag, mag) = (self.ag_address, self.mag_address);
        register::expect_identity(&mut self.i2c, ag, AG_DEVICE_ID)?;
        register::expect_identity(&mut self.i2c, mag, MAG_DEVICE_ID)?;

        register::write_register(&mut self.i2c, ag, CTRL_REG8, BDU_IF_ADD_INC)?;
        register::write_register(&mut self.i2c, ag, CTRL_REG1_G, GYRO_119HZ_245DPS)?;
        register::write_register(&mut self.i2c, ag, CTRL_REG6_XL, ACCEL_119HZ_2G)?;

        register::write_register(&mut self.i2c, mag, CTRL_REG1_M, MAG_XY_UHP_10HZ)?;
        register::write_register(&mut self.i2c, mag, CTRL_REG2_M, MAG_4GAUSS)?;
        register::write_register(&mut self.i2c, mag, CTRL_REG3_M, MAG_CONTINUOUS)?;
        register::write_register(&mut self.i2c, mag, CTRL_REG4_M, MAG_Z_UHP)?;

        info!("lsm9ds1 ready at 0x{:02X}/0x{:02X}", ag, mag);
        Ok(())
    }

    /// Acceleration in g.
    pub fn read_accel(&mut self) -> Result<Vector3, I2C::Error> {
        let mut raw = [0u8; 6];
        register::read_sequential(&mut self.i2c, self.ag_address, OUT_X_L_XL, &mut raw)?;
        Ok(Vector3::from_raw(&raw, ACCEL_G_PER_LSB))
    }

    /// Angular rate in rad/s.
    pub fn read_gyro(&mut self) -> Result<Vector3, I2C::Error> {
        let mut raw = [0u8; 6];
        register::read_sequential(&mut self.i2c, self.ag_address, OUT_X_L_G, &mut raw)?;
        Ok(Vector3::from_raw(&raw, GYRO_DPS_PER_LSB * PI / 180.0))
    }

    /// Magnetic field in gauss.
    pub fn read_mag(&mut self) -> Result<Vector3, I2C::Error> {
        let mut raw = [0u8; 6];
        register::read_registers(&mut self.i2c, self.mag_address, OUT_X_L_M, &mut raw)?;
        Ok(Vector3::from_raw(&raw, MAG_GAUSS_PER_LSB))
    }
}
