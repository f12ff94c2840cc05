//! # pihat-kit
//!
//! Drivers and demo programs for common Raspberry Pi add-on hardware:
//! a PCF8574 I/O expander, a joy-it button joystick, a PCF8591 ADC/DAC,
//! the Sense HAT and the camera.
//!
//! ## Features
//!
//! - **Bus-agnostic drivers**: every I2C chip is generic over
//!   [`embedded_hal::i2c::I2c`] and runs on `no_std`
//! - **Sense HAT**: LED matrix with rotation, text and gamma; humidity,
//!   pressure and IMU sensors; joystick events
//! - **Testable**: mocks for the bus, delays, framebuffer, joystick and camera
//! - **Raspberry Pi OS backends** (`linux` feature): i2c-dev, the Sense HAT
//!   framebuffer and event device, and `raspistill`
//!
//! ## Architecture
//!
//! - `pcf8574`, `joyit`, `pcf8591`, `waveform` - expander and ADC/DAC boards
//! - `sense_hat` - LED matrix, sensors and joystick
//! - `camera` - still capture
//! - `traits` - abstractions for the non-I2C devices
//! - `hal` - concrete implementations (mock for testing, linux for hardware)
//! - `config` - shared configuration
//!
//! ## Example
//!
//! ```rust
//! use pihat_kit::hal::{MockDelay, MockI2c};
//! use pihat_kit::pcf8591::Pcf8591;
//! use pihat_kit::waveform::SquareWave;
//!
//! let mut i2c = MockI2c::new();
//! i2c.queue_read(&[0x00, 0x80]);
//!
//! let mut adc = Pcf8591::new(i2c, MockDelay::new(), 0x48);
//! let mv = adc.read_millivolts(0).unwrap();
//! assert_eq!(mv, 128 * 3300 / 255);
//!
//! // Pass half the input voltage through to the DAC
//! adc.write_millivolts(mv / 2).unwrap();
//!
//! // Hold times for a 1 kHz, 25 % duty square wave
//! let wave = SquareWave::new(3000, 1000, 1000, 25);
//! assert_eq!((wave.high_us(), wave.low_us()), (250, 750));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Still image capture.
pub mod camera;
/// Shared configuration for drivers and demos.
pub mod config;
/// Driver error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// joy-it button joystick on a PCF8574.
pub mod joyit;
/// PCF8574 I/O expander.
pub mod pcf8574;
/// PCF8591 ADC/DAC.
pub mod pcf8591;
mod register;
/// Raspberry Pi Sense HAT.
pub mod sense_hat;
/// Traits for the non-I2C devices.
pub mod traits;
/// DAC waveform timing.
pub mod waveform;

// Re-exports for convenience
pub use error::{Error, Result};
pub use joyit::{JoyItPad, PadDirection, PadReading};
pub use pcf8574::{Led, Pcf8574, PinLevel};
pub use pcf8591::{ControlByte, InputMode, Pcf8591};
pub use sense_hat::{
    CursorPainter, Frame, Hts221, LedMatrix, Lps25h, Lsm9ds1, MatrixError, Rotation, StickAction,
    StickDirection, StickEvent,
};
pub use traits::{GammaControl, PixelBuffer, StickInput, StillCamera};

// Config re-exports
pub use config::{BusConfig, CameraConfig, Config, Pcf8574Config, Pcf8591Config, SenseHatConfig};
