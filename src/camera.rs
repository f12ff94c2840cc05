//! Still image capture with the Raspberry Pi camera.
//!
//! Capture is delegated to `raspistill`. This module builds its argument
//! list from [`CameraConfig`] and runs a capture through any
//! [`StillCamera`].
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::camera::{capture, raspistill_args};
//! use pihat_kit::config::CameraConfig;
//! use pihat_kit::hal::MockCamera;
//!
//! let config = CameraConfig::default();
//! assert_eq!(
//!     raspistill_args(&config, "/tmp/image.jpg").as_slice(),
//!     ["-n", "-vf", "-o", "/tmp/image.jpg"]
//! );
//!
//! let mut camera = MockCamera::new();
//! capture(&mut camera, &config).unwrap();
//! assert_eq!(camera.captures[0], "/home/pi/image.jpg");
//! ```

use heapless::Vec;
use log::info;

use crate::config::CameraConfig;
use crate::traits::StillCamera;

/// Command-line arguments for one capture to `path`.
pub fn raspistill_args<'a>(config: &CameraConfig, path: &'a str) -> Vec<&'a str, 6> {
    let mut args = Vec::new();
    // At most five entries.
    if !config.preview {
        let _ = args.push("-n");
    }
    if config.vflip {
        let _ = args.push("-vf");
    }
    if config.hflip {
        let _ = args.push("-hf");
    }
    let _ = args.push("-o");
    let _ = args.push(path);
    args
}

/// Captures to the configured output path.
pub fn capture<C: StillCamera>(camera: &mut C, config: &CameraConfig) -> Result<(), C::Error> {
    let path = config.output.as_str();
    camera.capture(path)?;
    info!("image saved to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockCamera;

    #[test]
    fn preview_and_flips() {
        let config = CameraConfig::default().with_preview(true).with_flip(true, false);
        assert_eq!(raspistill_args(&config, "a.jpg").as_slice(), ["-hf", "-o", "a.jpg"]);
    }

    #[test]
    fn failed_capture_propagates() {
        let mut camera = MockCamera::new();
        camera.fail = true;
        assert_eq!(capture(&mut camera, &CameraConfig::default()), Err(()));
        assert!(camera.captures.is_empty());
    }
}
