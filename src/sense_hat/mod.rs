//! Raspberry Pi Sense HAT.
//!
//! | Part | Interface | Module |
//! |------|-----------|--------|
//! | 8×8 RGB LED matrix | framebuffer `RPi-Sense FB` | [`matrix`], [`frame`] |
//! | 5-way joystick | evdev keyboard | [`stick`], [`cursor`] |
//! | HTS221 humidity/temperature | I2C 0x5F | [`humidity`] |
//! | LPS25H pressure/temperature | I2C 0x5C | [`pressure`] |
//! | LSM9DS1 accel/gyro/magnetometer | I2C 0x6A + 0x1C | [`imu`] |
//!
//! Every part is generic over a bus or trait from [`crate::traits`], so the
//! same code runs on the Pi (`hal::linux`) and in tests (`hal::mock`).

pub mod cursor;
pub mod frame;
pub mod humidity;
pub mod imu;
pub mod matrix;
pub mod pressure;
pub mod stick;

pub use cursor::CursorPainter;
pub use frame::{rgb, Canvas, Frame, Rotation};
pub use humidity::{Hts221, Measurement};
pub use imu::{Lsm9ds1, Vector3};
pub use matrix::{LedMatrix, MatrixError};
pub use pressure::{Lps25h, PressureReading};
pub use stick::{StickAction, StickDirection, StickEvent};
