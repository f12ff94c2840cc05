//! Trait definitions for the non-I2C peripherals.
//!
//! The I2C chip drivers use [`embedded_hal::i2c::I2c`] directly. The devices
//! the kernel exposes some other way get a small trait each so the drivers
//! and demo logic can run against the mocks in [`crate::hal::mock`].
//!
//! # Submodules
//!
//! - `display`: Sense HAT framebuffer and gamma table
//! - `hardware`: joystick events and still camera

pub mod display;
pub mod hardware;

pub use display::*;
pub use hardware::*;
