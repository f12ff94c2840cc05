//! Input and capture device traits.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`StickInput`] | Sense HAT 5-way joystick events |
//! | [`StillCamera`] | Single still image capture |
//!
//! For tests use [`MockStick`](crate::hal::MockStick) and
//! [`MockCamera`](crate::hal::MockCamera); on a Raspberry Pi the `linux`
//! feature provides `SenseStick` and `Raspistill`.

use crate::sense_hat::StickEvent;

/// Source of Sense HAT joystick events.
///
/// # Example
///
/// ```rust
/// use pihat_kit::hal::MockStick;
/// use pihat_kit::sense_hat::{StickAction, StickDirection, StickEvent};
/// use pihat_kit::traits::StickInput;
///
/// let mut stick = MockStick::new();
/// stick.queue(StickEvent::new(StickDirection::Up, StickAction::Pressed));
///
/// let event = stick.wait_for_event().unwrap();
/// assert_eq!(event.direction, StickDirection::Up);
/// ```
pub trait StickInput {
    /// Error type for reading events.
    type Error;

    /// Blocks until the next stick event arrives.
    fn wait_for_event(&mut self) -> Result<StickEvent, Self::Error>;
}

/// Still image capture.
pub trait StillCamera {
    /// Error type for capture operations.
    type Error;

    /// Captures one image and stores it at `path`.
    ///
    /// The path must end in the file name, e.g. `/home/pi/image.jpg`.
    fn capture(&mut self, path: &str) -> Result<(), Self::Error>;
}
