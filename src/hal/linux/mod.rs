//! Raspberry Pi OS hardware abstraction layer.
//!
//! This module provides the Linux implementations of the traits in
//! [`crate::traits`] plus the I2C bus from `linux-embedded-hal`.
//!
//! # Devices
//!
//! | Part | Kernel interface | Type |
//! |------|------------------|------|
//! | I2C chips | `/dev/i2c-1` (i2c-dev) | [`I2cdev`] |
//! | LED matrix | `/dev/fbN` named `RPi-Sense FB` | [`SenseFramebuffer`] |
//! | Joystick | `/dev/input/eventN` | [`SenseStick`] |
//! | Camera | `raspistill` process | [`Raspistill`] |
//!
//! Framebuffer and joystick numbers depend on probe order, so both are
//! located by name through sysfs.

mod camera;
mod framebuffer;
mod stick;

use std::fs;
use std::path::{Path, PathBuf};

pub use camera::Raspistill;
pub use framebuffer::SenseFramebuffer;
pub use linux_embedded_hal::{Delay, I2cdev};
pub use stick::{decode_event, SenseStick};

use crate::config::BusConfig;

/// sysfs class directory of framebuffers.
pub const GRAPHICS_CLASS: &str = "/sys/class/graphics";

/// sysfs class directory of input devices.
pub const INPUT_CLASS: &str = "/sys/class/input";

/// Errors from the Linux backends.
#[derive(Debug, thiserror::Error)]
pub enum LinuxError {
    /// A system call on a device failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No device with the wanted name exists.
    #[error("no device named '{name}' under {class}")]
    NotFound {
        /// sysfs class directory searched.
        class: String,
        /// Wanted device name.
        name: String,
    },

    /// The framebuffer is not the Sense HAT one.
    #[error("framebuffer id is '{0}', expected 'RPi-Sense FB'")]
    WrongFramebuffer(String),

    /// An external program failed.
    #[error("{program} exited with {status}")]
    Command {
        /// Program path.
        program: String,
        /// Exit status.
        status: std::process::ExitStatus,
    },

    /// The I2C bus could not be opened.
    #[error("cannot open {path}: {message}")]
    I2c {
        /// Device path.
        path: String,
        /// Driver message.
        message: String,
    },
}

impl LinuxError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LinuxError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Opens the configured i2c-dev bus.
pub fn open_i2c(bus: &BusConfig) -> Result<I2cdev, LinuxError> {
    let path = bus.device.as_str();
    let i2c = I2cdev::new(path).map_err(|e| LinuxError::I2c {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    log::info!("opened {}", path);
    Ok(i2c)
}

/// Finds the sysfs entry of `class` whose `name_file` contains `wanted`.
///
/// Returns the entry name, e.g. `fb1` or `event0`. Only entries starting
/// with `prefix` are considered.
pub fn find_device_by_name(
    class: &Path,
    prefix: &str,
    name_file: &str,
    wanted: &str,
) -> Result<String, LinuxError> {
    let entries = fs::read_dir(class)
        .map_err(|e| LinuxError::io(format!("listing {}", class.display()), e))?;

    let mut candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix))
        .collect();
    candidates.sort();

    for entry in candidates {
        let name_path = class.join(&entry).join(name_file);
        if let Ok(name) = fs::read_to_string(&name_path) {
            if name.trim_end() == wanted {
                log::debug!("found '{}' at {}", wanted, entry);
                return Ok(entry);
            }
        }
    }

    Err(LinuxError::NotFound {
        class: class.display().to_string(),
        name: wanted.to_string(),
    })
}

/// `/dev` node of the framebuffer named `name`.
pub fn find_framebuffer(name: &str) -> Result<PathBuf, LinuxError> {
    let entry = find_device_by_name(Path::new(GRAPHICS_CLASS), "fb", "name", name)?;
    Ok(Path::new("/dev").join(entry))
}

/// `/dev/input` node of the input device named `name`.
pub fn find_input_device(name: &str) -> Result<PathBuf, LinuxError> {
    let entry = find_device_by_name(Path::new(INPUT_CLASS), "event", "device/name", name)?;
    Ok(Path::new("/dev/input").join(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_class(tag: &str, entries: &[(&str, &str, &str)]) -> PathBuf {
        let root = std::env::temp_dir().join(format!("pihat-kit-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        for (entry, name_file, contents) in entries {
            let file = root.join(entry).join(name_file);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, contents).unwrap();
        }
        root
    }

    #[test]
    fn finds_framebuffer_by_name() {
        let class = fake_class(
            "fb",
            &[("fb0", "name", "vc4drmfb\n"), ("fb1", "name", "RPi-Sense FB\n")],
        );
        let found = find_device_by_name(&class, "fb", "name", "RPi-Sense FB").unwrap();
        assert_eq!(found, "fb1");
        fs::remove_dir_all(class).unwrap();
    }

    #[test]
    fn finds_input_by_nested_name() {
        let class = fake_class(
            "input",
            &[
                ("event0", "device/name", "Raspberry Pi Sense HAT Joystick\n"),
                ("mice", "device/name", "Raspberry Pi Sense HAT Joystick\n"),
            ],
        );
        let found =
            find_device_by_name(&class, "event", "device/name", "Raspberry Pi Sense HAT Joystick")
                .unwrap();
        assert_eq!(found, "event0");
        fs::remove_dir_all(class).unwrap();
    }

    #[test]
    fn missing_device() {
        let class = fake_class("none", &[("fb0", "name", "other\n")]);
        let err = find_device_by_name(&class, "fb", "name", "RPi-Sense FB").unwrap_err();
        assert!(matches!(err, LinuxError::NotFound { .. }));
        fs::remove_dir_all(class).unwrap();
    }
}
