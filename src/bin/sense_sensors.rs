//! Prints every Sense HAT sensor reading once.
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin sense_sensors
//! ```

use pihat_kit::hal::linux::{open_i2c, Delay};
use pihat_kit::{Config, Hts221, Lps25h, Lsm9ds1};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let settings = &config.sense_hat;
    let mut bus = open_i2c(&config.bus)?;

    // =========================================================================
    // Environment
    // =========================================================================
    let mut humidity = Hts221::new(&mut bus, Delay, settings.humidity_address);
    let reading = humidity.measure()?;
    println!("Humidity: {:.0} %rH", reading.humidity_rh);
    println!("Temperature (humidity sensor): {:.1} °C", reading.temperature_c);

    let mut pressure = Lps25h::new(&mut bus, Delay, settings.pressure_address);
    let reading = pressure.measure()?;
    println!("Temperature (pressure sensor): {:.1} °C", reading.temperature_c);
    println!("Pressure: {:.2} mbar", reading.pressure_hpa);

    // =========================================================================
    // IMU
    // =========================================================================
    let mut imu = Lsm9ds1::new(&mut bus, settings.imu_ag_address, settings.imu_mag_address);
    imu.init()?;

    let accel = imu.read_accel()?;
    let tilt = accel.tilt();
    println!("Orientation:");
    println!(
        "   pitch: {:.3} rad ({:.1}°), roll: {:.3} rad ({:.1}°)",
        tilt.pitch,
        tilt.pitch.to_degrees(),
        tilt.roll,
        tilt.roll.to_degrees()
    );

    let mag = imu.read_mag()?;
    println!("Compass:");
    println!("   north: {:.1}°", mag.compass_heading());
    println!("   x: {:.3}, y: {:.3}, z: {:.3} gauss", mag.x, mag.y, mag.z);

    let gyro = imu.read_gyro()?;
    println!("Gyroscope:");
    println!("   x: {:.3} rad/s, y: {:.3} rad/s, z: {:.3} rad/s", gyro.x, gyro.y, gyro.z);

    println!("Accelerometer:");
    println!("   x: {:.3} g, y: {:.3} g, z: {:.3} g", accel.x, accel.y, accel.z);

    Ok(())
}
