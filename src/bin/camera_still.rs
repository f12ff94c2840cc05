//! Takes one picture with the Raspberry Pi camera.
//!
//! ```text
//! camera_still [output.jpg]
//! ```
//!
//! # Build
//!
//! ```bash
//! cargo run --features linux --bin camera_still -- /home/pi/image.jpg
//! ```

use pihat_kit::camera::capture;
use pihat_kit::hal::linux::Raspistill;
use pihat_kit::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::from_env()?;
    if let Some(path) = std::env::args().nth(1) {
        config.camera = config.camera.with_output(&path);
    }

    let mut camera = Raspistill::new(config.camera.clone());
    capture(&mut camera, &config.camera)?;
    println!("Image saved to {}", config.camera.output);
    Ok(())
}
