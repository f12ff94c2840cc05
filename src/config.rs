//! Shared configuration for the drivers and demo programs.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use with `std`. Defaults match the wiring of the demo
//! boards, so a bare `Config::default()` works on a stock Raspberry Pi.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. [`Config::default`]
//! 2. a JSON file named by `PIHAT_CONFIG` (`json-config` feature)
//! 3. `PIHAT_*` environment variables (`std` feature)
//!
//! # Example
//!
//! ```rust
//! use pihat_kit::config::{Config, Pcf8591Config, SenseHatConfig};
//! use pihat_kit::sense_hat::Rotation;
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.bus.device.as_str(), "/dev/i2c-1");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_pcf8591(Pcf8591Config::default().with_address(0x49).with_vref_mv(5000))
//!     .with_sense_hat(SenseHatConfig::default().with_rotation(Rotation::Deg180));
//! assert_eq!(config.pcf8591.vref_mv, 5000);
//! ```

use heapless::String as HString;

use crate::pcf8591::InputMode;
use crate::sense_hat::Rotation;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for paths
pub const MAX_PATH_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for paths
pub type PathString = HString<MAX_PATH_STRING>;

/// Lowest usable 7-bit I2C address.
pub const MIN_I2C_ADDRESS: u8 = 0x03;

/// Highest usable 7-bit I2C address.
pub const MAX_I2C_ADDRESS: u8 = 0x77;

// ============================================================================
// Helpers
// ============================================================================

fn bounded<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    for c in s.chars() {
        if hs.push(c).is_err() {
            break;
        }
    }
    hs
}

/// Create a ShortString from a &str, truncating at a character boundary
pub fn short_string(s: &str) -> ShortString {
    bounded(s)
}

/// Create a PathString from a &str, truncating at a character boundary
pub fn path_string(s: &str) -> PathString {
    bounded(s)
}

/// Errors from parsing configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric value did not parse.
    #[error("'{0}' is not a number")]
    NotANumber(ShortString),

    /// An I2C address outside the usable 7-bit range.
    #[error("address 0x{0:X} is outside 0x03..=0x77")]
    AddressOutOfRange(u32),

    /// A value is outside what the setting accepts.
    #[error("{name}: '{value}' is not valid")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// Rejected value.
        value: ShortString,
    },

    /// The configuration file could not be read.
    #[cfg(feature = "json-config")]
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path.
        path: std::string::String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`Config`].
    #[cfg(feature = "json-config")]
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_number(text: &str) -> Result<u32, ConfigError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| ConfigError::NotANumber(short_string(text)))
}

/// Parses an I2C address given as `0x48` or `72`.
///
/// ```rust
/// use pihat_kit::config::parse_address;
///
/// assert_eq!(parse_address("0x48").unwrap(), 0x48);
/// assert_eq!(parse_address("32").unwrap(), 0x20);
/// assert!(parse_address("0x78").is_err());
/// ```
pub fn parse_address(text: &str) -> Result<u8, ConfigError> {
    let value = parse_number(text)?;
    if !(u32::from(MIN_I2C_ADDRESS)..=u32::from(MAX_I2C_ADDRESS)).contains(&value) {
        return Err(ConfigError::AddressOutOfRange(value));
    }
    Ok(value as u8)
}

fn parse_bool(name: &'static str, text: &str) -> Result<bool, ConfigError> {
    match text.trim() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name,
            value: short_string(other),
        }),
    }
}

fn parse_input_mode(text: &str) -> Result<InputMode, ConfigError> {
    match text.trim() {
        "four_single_ended" | "0" => Ok(InputMode::FourSingleEnded),
        "three_differential" | "1" => Ok(InputMode::ThreeDifferential),
        "mixed_single_differential" | "2" => Ok(InputMode::MixedSingleDifferential),
        "two_differential" | "3" => Ok(InputMode::TwoDifferential),
        other => Err(ConfigError::InvalidValue {
            name: "input_mode",
            value: short_string(other),
        }),
    }
}

fn parse_rotation(text: &str) -> Result<Rotation, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "rotation",
        value: short_string(text),
    };
    let degrees: i32 = text.trim().parse().map_err(|_| invalid())?;
    Rotation::from_degrees(degrees).ok_or_else(invalid)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// I2C bus
    pub bus: BusConfig,
    /// PCF8591 ADC/DAC
    pub pcf8591: Pcf8591Config,
    /// PCF8574 expander and joy-it joystick
    pub pcf8574: Pcf8574Config,
    /// Sense HAT
    pub sense_hat: SenseHatConfig,
    /// Camera
    pub camera: CameraConfig,
}

impl Config {
    /// Set bus configuration
    pub fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }

    /// Set PCF8591 configuration
    pub fn with_pcf8591(mut self, pcf8591: Pcf8591Config) -> Self {
        self.pcf8591 = pcf8591;
        self
    }

    /// Set PCF8574 configuration
    pub fn with_pcf8574(mut self, pcf8574: Pcf8574Config) -> Self {
        self.pcf8574 = pcf8574;
        self
    }

    /// Set Sense HAT configuration
    pub fn with_sense_hat(mut self, sense_hat: SenseHatConfig) -> Self {
        self.sense_hat = sense_hat;
        self
    }

    /// Set camera configuration
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Applies `PIHAT_*` overrides obtained from `lookup`.
    ///
    /// | Variable | Setting |
    /// |----------|---------|
    /// | `PIHAT_I2C_DEV` | `bus.device` |
    /// | `PIHAT_PCF8591_ADDR` | `pcf8591.address` |
    /// | `PIHAT_PCF8591_VREF_MV` | `pcf8591.vref_mv` |
    /// | `PIHAT_PCF8591_MODE` | `pcf8591.input_mode` |
    /// | `PIHAT_PCF8574_ADDR` | `pcf8574.address` |
    /// | `PIHAT_LED_PIN` | `pcf8574.led_pin` |
    /// | `PIHAT_ROTATION` | `sense_hat.rotation` |
    /// | `PIHAT_LOW_LIGHT` | `sense_hat.low_light` |
    /// | `PIHAT_CAMERA_OUTPUT` | `camera.output` |
    /// | `PIHAT_RASPISTILL` | `camera.program` |
    pub fn apply_overrides<F, S>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<S>,
        S: AsRef<str>,
    {
        if let Some(v) = lookup("PIHAT_I2C_DEV") {
            self.bus.device = path_string(v.as_ref());
        }
        if let Some(v) = lookup("PIHAT_PCF8591_ADDR") {
            self.pcf8591.address = parse_address(v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_PCF8591_VREF_MV") {
            self.pcf8591.vref_mv = parse_number(v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_PCF8591_MODE") {
            self.pcf8591.input_mode = parse_input_mode(v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_PCF8574_ADDR") {
            self.pcf8574.address = parse_address(v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_LED_PIN") {
            let pin = parse_number(v.as_ref())?;
            if pin > 7 {
                return Err(ConfigError::InvalidValue {
                    name: "led_pin",
                    value: short_string(v.as_ref()),
                });
            }
            self.pcf8574.led_pin = pin as u8;
        }
        if let Some(v) = lookup("PIHAT_ROTATION") {
            self.sense_hat.rotation = parse_rotation(v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_LOW_LIGHT") {
            self.sense_hat.low_light = parse_bool("low_light", v.as_ref())?;
        }
        if let Some(v) = lookup("PIHAT_CAMERA_OUTPUT") {
            self.camera.output = path_string(v.as_ref());
        }
        if let Some(v) = lookup("PIHAT_RASPISTILL") {
            self.camera.program = path_string(v.as_ref());
        }
        Ok(self)
    }
}

#[cfg(feature = "std")]
impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// With `json-config`, the file named by `PIHAT_CONFIG` is read first.
    pub fn from_env() -> Result<Self, ConfigError> {
        #[cfg(feature = "json-config")]
        let base = match std::env::var("PIHAT_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        #[cfg(not(feature = "json-config"))]
        let base = Self::default();

        base.apply_overrides(|name| std::env::var(name).ok())
    }
}

#[cfg(feature = "json-config")]
impl Config {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("loaded configuration from {}", path);
        Ok(config)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<std::string::String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Bus Config
// ============================================================================

/// I2C bus configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BusConfig {
    /// i2c-dev character device
    pub device: PathString,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: path_string("/dev/i2c-1"),
        }
    }
}

impl BusConfig {
    /// Set the device path
    pub fn with_device(mut self, device: &str) -> Self {
        self.device = path_string(device);
        self
    }
}

// ============================================================================
// PCF8591 Config
// ============================================================================

/// PCF8591 configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Pcf8591Config {
    /// I2C address
    pub address: u8,
    /// Reference voltage in millivolts
    pub vref_mv: u32,
    /// Analog input programming
    pub input_mode: InputMode,
    /// Wait between channel select and read, in microseconds
    pub settle_us: u32,
    /// Wait before an auto-increment scan, in milliseconds
    pub scan_settle_ms: u32,
    /// Interval between demo readings, in milliseconds
    pub sample_interval_ms: u32,
}

impl Default for Pcf8591Config {
    fn default() -> Self {
        Self {
            address: crate::pcf8591::DEFAULT_ADDRESS,
            vref_mv: crate::pcf8591::DEFAULT_VREF_MV,
            input_mode: InputMode::FourSingleEnded,
            settle_us: 100,
            scan_settle_ms: 100,
            sample_interval_ms: 1000,
        }
    }
}

impl Pcf8591Config {
    /// Set the address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the reference voltage
    pub fn with_vref_mv(mut self, vref_mv: u32) -> Self {
        self.vref_mv = vref_mv;
        self
    }

    /// Set the input mode
    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = mode;
        self
    }

    /// Set the demo sample interval
    pub fn with_sample_interval_ms(mut self, ms: u32) -> Self {
        self.sample_interval_ms = ms;
        self
    }
}

// ============================================================================
// PCF8574 Config
// ============================================================================

/// PCF8574 / joy-it configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Pcf8574Config {
    /// I2C address
    pub address: u8,
    /// Pin of the indicator LED
    pub led_pin: u8,
    /// Whether the LED lights when its pin is driven low
    pub led_active_low: bool,
    /// Button poll interval in milliseconds
    pub poll_ms: u32,
    /// Blink half-period in milliseconds
    pub blink_ms: u32,
}

impl Default for Pcf8574Config {
    fn default() -> Self {
        Self {
            address: crate::pcf8574::DEFAULT_ADDRESS,
            led_pin: 4,
            led_active_low: true,
            poll_ms: 10,
            blink_ms: 1000,
        }
    }
}

impl Pcf8574Config {
    /// Set the address
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the LED pin and polarity
    pub fn with_led(mut self, pin: u8, active_low: bool) -> Self {
        self.led_pin = pin.min(7);
        self.led_active_low = active_low;
        self
    }

    /// Set the button poll interval
    pub fn with_poll_ms(mut self, ms: u32) -> Self {
        self.poll_ms = ms;
        self
    }

    /// The configured LED.
    pub fn led(&self) -> crate::pcf8574::Led {
        if self.led_active_low {
            crate::pcf8574::Led::active_low(self.led_pin)
        } else {
            crate::pcf8574::Led::active_high(self.led_pin)
        }
    }
}

// ============================================================================
// Sense HAT Config
// ============================================================================

/// Sense HAT configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SenseHatConfig {
    /// HTS221 address
    pub humidity_address: u8,
    /// LPS25H address
    pub pressure_address: u8,
    /// LSM9DS1 accelerometer/gyroscope address
    pub imu_ag_address: u8,
    /// LSM9DS1 magnetometer address
    pub imu_mag_address: u8,
    /// Framebuffer id (`/sys/class/graphics/fb*/name`)
    pub framebuffer_name: ShortString,
    /// Joystick input device name
    pub stick_name: ShortString,
    /// LED matrix rotation
    pub rotation: Rotation,
    /// Start with the low-light gamma table
    pub low_light: bool,
    /// Scroll speed of text messages, milliseconds per column
    pub scroll_ms: u32,
}

impl Default for SenseHatConfig {
    fn default() -> Self {
        Self {
            humidity_address: crate::sense_hat::humidity::DEFAULT_ADDRESS,
            pressure_address: crate::sense_hat::pressure::DEFAULT_ADDRESS,
            imu_ag_address: crate::sense_hat::imu::DEFAULT_AG_ADDRESS,
            imu_mag_address: crate::sense_hat::imu::DEFAULT_MAG_ADDRESS,
            framebuffer_name: short_string("RPi-Sense FB"),
            stick_name: short_string("Raspberry Pi Sense HAT Joystick"),
            rotation: Rotation::Deg0,
            low_light: false,
            scroll_ms: 100,
        }
    }
}

impl SenseHatConfig {
    /// Set the matrix rotation
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set low-light mode
    pub fn with_low_light(mut self, enabled: bool) -> Self {
        self.low_light = enabled;
        self
    }

    /// Set the scroll speed
    pub fn with_scroll_ms(mut self, ms: u32) -> Self {
        self.scroll_ms = ms;
        self
    }
}

// ============================================================================
// Camera Config
// ============================================================================

/// Still camera configuration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Capture program
    pub program: PathString,
    /// Default output file
    pub output: PathString,
    /// Show the preview window
    pub preview: bool,
    /// Flip vertically
    pub vflip: bool,
    /// Flip horizontally
    pub hflip: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            program: path_string("/usr/bin/raspistill"),
            output: path_string("/home/pi/image.jpg"),
            preview: false,
            vflip: true,
            hflip: false,
        }
    }
}

impl CameraConfig {
    /// Set the capture program
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = path_string(program);
        self
    }

    /// Set the default output file
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = path_string(output);
        self
    }

    /// Set the flips
    pub fn with_flip(mut self, hflip: bool, vflip: bool) -> Self {
        self.hflip = hflip;
        self.vflip = vflip;
        self
    }

    /// Enable or disable the preview window
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<&'static str> {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.pcf8591.address, 0x48);
        assert_eq!(config.pcf8591.vref_mv, 3300);
        assert_eq!(config.pcf8574.address, 0x20);
        assert_eq!(config.pcf8574.led_pin, 4);
        assert_eq!(config.sense_hat.humidity_address, 0x5F);
        assert_eq!(config.sense_hat.framebuffer_name.as_str(), "RPi-Sense FB");
        assert_eq!(config.camera.program.as_str(), "/usr/bin/raspistill");
    }

    #[test]
    fn address_parsing() {
        assert_eq!(parse_address("0x20").unwrap(), 0x20);
        assert_eq!(parse_address(" 0X5f ").unwrap(), 0x5F);
        assert_eq!(parse_address("72").unwrap(), 0x48);
        assert!(matches!(parse_address("0x02"), Err(ConfigError::AddressOutOfRange(2))));
        assert!(matches!(parse_address("0x78"), Err(ConfigError::AddressOutOfRange(0x78))));
        assert!(matches!(parse_address("zz"), Err(ConfigError::NotANumber(_))));
    }

    #[test]
    fn overrides_applied() {
        let config = Config::default()
            .apply_overrides(vars(&[
                ("PIHAT_I2C_DEV", "/dev/i2c-0"),
                ("PIHAT_PCF8591_ADDR", "0x49"),
                ("PIHAT_PCF8591_MODE", "two_differential"),
                ("PIHAT_LED_PIN", "2"),
                ("PIHAT_ROTATION", "270"),
                ("PIHAT_LOW_LIGHT", "yes"),
            ]))
            .unwrap();
        assert_eq!(config.bus.device.as_str(), "/dev/i2c-0");
        assert_eq!(config.pcf8591.address, 0x49);
        assert_eq!(config.pcf8591.input_mode, InputMode::TwoDifferential);
        assert_eq!(config.pcf8574.led_pin, 2);
        assert_eq!(config.sense_hat.rotation, Rotation::Deg270);
        assert!(config.sense_hat.low_light);
        assert_eq!(config.pcf8574.address, 0x20);
    }

    #[test]
    fn bad_overrides_rejected() {
        let err = Config::default()
            .apply_overrides(vars(&[("PIHAT_ROTATION", "45")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "rotation", .. }));

        let err = Config::default()
            .apply_overrides(vars(&[("PIHAT_LED_PIN", "8")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "led_pin", .. }));
    }

    #[test]
    fn led_polarity() {
        let led = Pcf8574Config::default().with_led(1, false).led();
        assert_eq!(led, crate::pcf8574::Led::active_high(1));
        assert_eq!(Pcf8574Config::default().led(), crate::pcf8574::Led::active_low(4));
    }

    #[test]
    fn string_truncation_keeps_utf8() {
        let s = short_string(&"é".repeat(40));
        assert!(s.len() <= MAX_SHORT_STRING);
        assert_eq!(s.chars().count(), 32);
    }

    #[test]
    fn camera_builder() {
        let camera = CameraConfig::default()
            .with_output("/tmp/a.jpg")
            .with_flip(true, false)
            .with_preview(true);
        assert_eq!(camera.output.as_str(), "/tmp/a.jpg");
        assert!(camera.hflip && !camera.vflip && camera.preview);
    }

    #[cfg(feature = "json-config")]
    #[test]
    fn json_partial_document() {
        let config = Config::from_json(
            r#"{ "pcf8591": { "address": 73, "input_mode": "three_differential" },
                 "sense_hat": { "rotation": "Deg90" } }"#,
        )
        .unwrap();
        assert_eq!(config.pcf8591.address, 0x49);
        assert_eq!(config.pcf8591.vref_mv, 3300);
        assert_eq!(config.pcf8591.input_mode, InputMode::ThreeDifferential);
        assert_eq!(config.sense_hat.rotation, Rotation::Deg90);
        assert_eq!(config.bus, BusConfig::default());
    }

    #[cfg(feature = "json-config")]
    #[test]
    fn json_round_trip() {
        let config = Config::default().with_camera(CameraConfig::default().with_output("/tmp/x.jpg"));
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[cfg(feature = "json-config")]
    #[test]
    fn missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/pihat.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
