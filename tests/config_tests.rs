//! Configuration layering and camera command tests

use std::collections::HashMap;

use pihat_kit::camera::{capture, raspistill_args};
use pihat_kit::config::{CameraConfig, Config, ConfigError};
use pihat_kit::hal::MockCamera;
use pihat_kit::{InputMode, Rotation};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn defaults_match_demo_wiring() {
    let config = Config::default();
    assert_eq!(config.pcf8591.address, 0x48);
    assert_eq!(config.pcf8591.vref_mv, 3300);
    assert_eq!(config.pcf8574.address, 0x20);
    assert_eq!(config.pcf8574.led_pin, 4);
    assert!(config.pcf8574.led_active_low);
    assert_eq!(config.sense_hat.rotation, Rotation::Deg0);
    assert_eq!(config.camera.output.as_str(), "/home/pi/image.jpg");
}

#[test]
fn environment_overrides_apply() {
    let config = Config::default()
        .apply_overrides(lookup(&[
            ("PIHAT_I2C_DEV", "/dev/i2c-0"),
            ("PIHAT_PCF8591_ADDR", "0x4B"),
            ("PIHAT_PCF8591_MODE", "two_differential"),
            ("PIHAT_PCF8574_ADDR", "39"),
            ("PIHAT_ROTATION", "-90"),
            ("PIHAT_LOW_LIGHT", "yes"),
            ("PIHAT_CAMERA_OUTPUT", "/tmp/shot.jpg"),
        ]))
        .unwrap();

    assert_eq!(config.bus.device.as_str(), "/dev/i2c-0");
    assert_eq!(config.pcf8591.address, 0x4B);
    assert_eq!(config.pcf8591.input_mode, InputMode::TwoDifferential);
    assert_eq!(config.pcf8574.address, 0x27);
    assert_eq!(config.sense_hat.rotation, Rotation::Deg270);
    assert!(config.sense_hat.low_light);
    assert_eq!(config.camera.output.as_str(), "/tmp/shot.jpg");
}

#[test]
fn bad_overrides_rejected() {
    let err = Config::default()
        .apply_overrides(lookup(&[("PIHAT_PCF8574_ADDR", "0x80")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::AddressOutOfRange(0x80)));

    let err = Config::default()
        .apply_overrides(lookup(&[("PIHAT_ROTATION", "45")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { name: "rotation", .. }));

    let err = Config::default()
        .apply_overrides(lookup(&[("PIHAT_LED_PIN", "8")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { name: "led_pin", .. }));

    let err = Config::default()
        .apply_overrides(lookup(&[("PIHAT_PCF8591_VREF_MV", "three")]))
        .unwrap_err();
    assert_eq!(err.to_string(), "'three' is not a number");
}

// ============================================================================
// JSON files
// ============================================================================

#[cfg(feature = "json-config")]
#[test]
fn partial_json_keeps_defaults() {
    let config = Config::from_json(r#"{ "pcf8591": { "vref_mv": 5000 } }"#).unwrap();
    assert_eq!(config.pcf8591.vref_mv, 5000);
    assert_eq!(config.pcf8591.address, 0x48);
    assert_eq!(config, Config::default().with_pcf8591(config.pcf8591.clone()));
}

#[cfg(feature = "json-config")]
#[test]
fn json_file_then_environment() {
    let path = std::env::temp_dir().join(format!("pihat-kit-config-{}.json", std::process::id()));
    let written = Config::default().with_camera(CameraConfig::default().with_output("/srv/a.jpg"));
    std::fs::write(&path, written.to_json().unwrap()).unwrap();

    let loaded = Config::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded, written);

    let layered = loaded
        .apply_overrides(lookup(&[("PIHAT_CAMERA_OUTPUT", "/srv/b.jpg")]))
        .unwrap();
    assert_eq!(layered.camera.output.as_str(), "/srv/b.jpg");

    std::fs::remove_file(&path).unwrap();
}

#[cfg(feature = "json-config")]
#[test]
fn missing_file_is_io_error() {
    let err = Config::from_file("/nonexistent/pihat.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_arguments_follow_config() {
    let config = CameraConfig::default();
    assert_eq!(
        raspistill_args(&config, "/tmp/a.jpg").as_slice(),
        ["-n", "-vf", "-o", "/tmp/a.jpg"]
    );

    let config = config.with_preview(true).with_flip(true, true);
    assert_eq!(
        raspistill_args(&config, "/tmp/a.jpg").as_slice(),
        ["-vf", "-hf", "-o", "/tmp/a.jpg"]
    );
}

#[test]
fn capture_uses_configured_output() {
    let config = Config::default()
        .apply_overrides(lookup(&[("PIHAT_CAMERA_OUTPUT", "/tmp/override.jpg")]))
        .unwrap();
    let mut camera = MockCamera::new();
    capture(&mut camera, &config.camera).unwrap();
    capture(&mut camera, &config.camera).unwrap();
    assert_eq!(camera.captures, vec!["/tmp/override.jpg", "/tmp/override.jpg"]);
}
