//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `linux`: Raspberry Pi OS devices (requires `linux` feature)

pub mod mock;

#[cfg(feature = "linux")]
pub mod linux;

pub use mock::*;
