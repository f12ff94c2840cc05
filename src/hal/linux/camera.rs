//! `raspistill` still camera.

use std::process::Command;

use log::debug;

use super::LinuxError;
use crate::camera::raspistill_args;
use crate::config::CameraConfig;
use crate::traits::StillCamera;

/// Runs `raspistill` once per capture.
#[derive(Clone, Debug, Default)]
pub struct Raspistill {
    config: CameraConfig,
}

impl Raspistill {
    /// Uses the program path and flags from `config`.
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    /// The command that would capture to `path`.
    pub fn command(&self, path: &str) -> Command {
        let mut cmd = Command::new(self.config.program.as_str());
        cmd.args(raspistill_args(&self.config, path));
        cmd
    }
}

impl StillCamera for Raspistill {
    type Error = LinuxError;

    fn capture(&mut self, path: &str) -> Result<(), LinuxError> {
        let program = self.config.program.as_str();
        let mut cmd = self.command(path);
        debug!("running {:?}", cmd);
        let status = cmd
            .status()
            .map_err(|e| LinuxError::io(format!("starting {}", program), e))?;
        if !status.success() {
            return Err(LinuxError::Command {
                program: program.to_string(),
                status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line() {
        let camera = Raspistill::new(CameraConfig::default());
        let cmd = camera.command("/tmp/x.jpg");
        assert_eq!(cmd.get_program(), "/usr/bin/raspistill");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-n", "-vf", "-o", "/tmp/x.jpg"]);
    }

    #[test]
    fn non_zero_exit_is_error() {
        let mut camera = Raspistill::new(CameraConfig::default().with_program("false"));
        assert!(matches!(
            camera.capture("/tmp/x.jpg"),
            Err(LinuxError::Command { .. })
        ));
    }

    #[test]
    fn missing_program_is_io_error() {
        let mut camera =
            Raspistill::new(CameraConfig::default().with_program("/nonexistent/raspistill"));
        assert!(matches!(camera.capture("/tmp/x.jpg"), Err(LinuxError::Io { .. })));
    }
}
