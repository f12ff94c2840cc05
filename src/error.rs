//! Error types shared by the I2C chip drivers.
//!
//! Every driver in this crate is generic over an [`embedded_hal::i2c::I2c`]
//! bus, so the bus error is carried as a type parameter. Use
//! `.map_err(Error::Bus)` at the transfer sites and `?` everywhere else.

use crate::pcf8591::InputMode;

/// Errors returned by the PCF8574, PCF8591 and Sense HAT sensor drivers.
///
/// # Example
///
/// ```rust
/// use pihat_kit::Error;
///
/// let err: Error<()> = Error::InvalidPin(9);
/// assert_eq!(err.to_string(), "pin 9 is out of range (0-7)");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error<E> {
    /// The underlying I2C transfer failed.
    #[error("i2c transfer failed: {0:?}")]
    Bus(E),

    /// The requested ADC channel does not exist in the configured input mode.
    #[error("channel {channel} is not available in {mode:?} mode")]
    InvalidChannel {
        /// Requested channel.
        channel: u8,
        /// Input programming mode in effect.
        mode: InputMode,
    },

    /// Expander pin number outside 0..=7.
    #[error("pin {0} is out of range (0-7)")]
    InvalidPin(u8),

    /// A DAC voltage above the reference voltage was requested.
    #[error("{millivolts} mV exceeds the {max_mv} mV reference")]
    VoltageOutOfRange {
        /// Requested output in millivolts.
        millivolts: u32,
        /// Reference voltage in millivolts.
        max_mv: u32,
    },

    /// The WHO_AM_I register returned an unexpected value.
    #[error("unexpected device id 0x{found:02X} at 0x{address:02X} (expected 0x{expected:02X})")]
    WrongDevice {
        /// I2C address that was probed.
        address: u8,
        /// Expected identifier.
        expected: u8,
        /// Identifier actually read.
        found: u8,
    },

    /// A one-shot measurement did not complete in time.
    #[error("measurement not ready after {polls} polls")]
    Timeout {
        /// Number of status polls performed.
        polls: u32,
    },

    /// Factory calibration points are identical and cannot define a line.
    #[error("calibration points are degenerate")]
    InvalidCalibration,
}

/// Result alias for the chip drivers.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        let err: Error<()> = Error::InvalidChannel {
            channel: 3,
            mode: InputMode::TwoDifferential,
        };
        assert_eq!(
            err.to_string(),
            "channel 3 is not available in TwoDifferential mode"
        );

        let err: Error<()> = Error::WrongDevice {
            address: 0x5F,
            expected: 0xBC,
            found: 0x00,
        };
        assert_eq!(
            err.to_string(),
            "unexpected device id 0x00 at 0x5F (expected 0xBC)"
        );

        let err: Error<()> = Error::VoltageOutOfRange {
            millivolts: 4000,
            max_mv: 3300,
        };
        assert_eq!(err.to_string(), "4000 mV exceeds the 3300 mV reference");
    }

    #[test]
    fn bus_error_wraps_debug() {
        let err: Error<&str> = Error::Bus("nack");
        assert_eq!(err.to_string(), "i2c transfer failed: \"nack\"");
    }
}
