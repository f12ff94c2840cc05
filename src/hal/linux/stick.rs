//! Sense HAT joystick via evdev.

use std::fs::File;
use std::io::Read;
use std::mem::size_of;
use std::path::Path;

use log::{debug, info};

use super::LinuxError;
use crate::sense_hat::StickEvent;
use crate::traits::StickInput;

/// Input device name of the Sense HAT joystick.
pub const STICK_NAME: &str = "Raspberry Pi Sense HAT Joystick";

/// Size of `struct input_event`: a `timeval`, then type, code and value.
const EVENT_SIZE: usize = size_of::<libc::timeval>() + 8;

/// Decodes one raw `input_event`, skipping anything that is not a joystick key.
///
/// ```rust
/// use pihat_kit::hal::linux::decode_event;
/// use pihat_kit::sense_hat::{StickAction, StickDirection};
///
/// let offset = std::mem::size_of::<libc::timeval>();
/// let mut raw = vec![0u8; offset + 8];
/// raw[offset..offset + 2].copy_from_slice(&1u16.to_ne_bytes());   // EV_KEY
/// raw[offset + 2..offset + 4].copy_from_slice(&28u16.to_ne_bytes()); // KEY_ENTER
/// raw[offset + 4..].copy_from_slice(&1i32.to_ne_bytes());
///
/// let event = decode_event(&raw).unwrap();
/// assert_eq!(event.direction, StickDirection::Middle);
/// assert_eq!(event.action, StickAction::Pressed);
/// ```
pub fn decode_event(raw: &[u8]) -> Option<StickEvent> {
    let body = raw.get(size_of::<libc::timeval>()..)?;
    let kind = u16::from_ne_bytes([*body.first()?, *body.get(1)?]);
    let code = u16::from_ne_bytes([*body.get(2)?, *body.get(3)?]);
    let value = i32::from_ne_bytes([*body.get(4)?, *body.get(5)?, *body.get(6)?, *body.get(7)?]);
    StickEvent::from_input(kind, code, value)
}

/// Sense HAT joystick event device.
pub struct SenseStick {
    file: File,
}

impl SenseStick {
    /// Locates the joystick by its input device name and opens it.
    pub fn find(name: &str) -> Result<Self, LinuxError> {
        Self::open(super::find_input_device(name)?)
    }

    /// Opens an event device.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LinuxError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| LinuxError::io(format!("opening {}", path.display()), e))?;
        info!("joystick at {}", path.display());
        Ok(Self { file })
    }
}

impl StickInput for SenseStick {
    type Error = LinuxError;

    fn wait_for_event(&mut self) -> Result<StickEvent, LinuxError> {
        let mut raw = [0u8; EVENT_SIZE];
        loop {
            self.file
                .read_exact(&mut raw)
                .map_err(|e| LinuxError::io("reading joystick", e))?;
            if let Some(event) = decode_event(&raw) {
                debug!("stick {}", event);
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sense_hat::{StickAction, StickDirection};

    fn raw(kind: u16, code: u16, value: i32) -> [u8; EVENT_SIZE] {
        let offset = size_of::<libc::timeval>();
        let mut buf = [0u8; EVENT_SIZE];
        buf[offset..offset + 2].copy_from_slice(&kind.to_ne_bytes());
        buf[offset + 2..offset + 4].copy_from_slice(&code.to_ne_bytes());
        buf[offset + 4..offset + 8].copy_from_slice(&value.to_ne_bytes());
        buf
    }

    #[test]
    fn key_events_decode() {
        assert_eq!(
            decode_event(&raw(1, 105, 2)),
            Some(StickEvent::new(StickDirection::Left, StickAction::Held))
        );
    }

    #[test]
    fn sync_events_skipped() {
        assert_eq!(decode_event(&raw(0, 0, 0)), None);
    }

    #[test]
    fn short_buffer() {
        assert_eq!(decode_event(&[0u8; 4]), None);
    }
}
