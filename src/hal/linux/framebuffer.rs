//! Memory-mapped Sense HAT framebuffer.
//!
//! The `rpisense-fb` driver exposes 64 RGB565 words. The buffer is mapped
//! shared, so every write is picked up by the driver's deferred-IO worker
//! and sent to the LED controller.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::{self, NonNull};

use log::info;

use super::LinuxError;
use crate::traits::{GammaControl, PixelBuffer, PIXEL_COUNT};

/// Framebuffer id reported by the Sense HAT driver.
pub const SENSE_FB_ID: &str = "RPi-Sense FB";

const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;
const SENSEFB_FBIOGET_GAMMA: libc::c_ulong = 0xF100;
const SENSEFB_FBIOSET_GAMMA: libc::c_ulong = 0xF101;
const SENSEFB_FBIORESET_GAMMA: libc::c_ulong = 0xF102;

const GAMMA_DEFAULT: libc::c_ulong = 0;
const GAMMA_LOW: libc::c_ulong = 1;

const MAP_BYTES: usize = PIXEL_COUNT * 2;

/// `struct fb_fix_screeninfo` from `<linux/fb.h>`.
#[repr(C)]
#[allow(dead_code)]
struct FixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    kind: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

impl FixScreenInfo {
    fn id(&self) -> String {
        let end = self.id.iter().position(|&b| b == 0).unwrap_or(self.id.len());
        String::from_utf8_lossy(&self.id[..end]).into_owned()
    }
}

/// Sense HAT LED matrix framebuffer.
///
/// The mapping is released when the value is dropped.
pub struct SenseFramebuffer {
    file: File,
    map: NonNull<u16>,
}

impl SenseFramebuffer {
    /// Locates the framebuffer named `name` in sysfs and opens it.
    pub fn find(name: &str) -> Result<Self, LinuxError> {
        Self::open(super::find_framebuffer(name)?)
    }

    /// Opens and maps a framebuffer device, checking that it is the Sense HAT.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LinuxError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LinuxError::io(format!("opening {}", path.display()), e))?;

        let mut info = std::mem::MaybeUninit::<FixScreenInfo>::zeroed();
        // SAFETY: FBIOGET_FSCREENINFO fills a `fb_fix_screeninfo`, which
        // `FixScreenInfo` mirrors field for field.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), FBIOGET_FSCREENINFO as _, info.as_mut_ptr()) };
        if rc == -1 {
            return Err(LinuxError::io("FBIOGET_FSCREENINFO", std::io::Error::last_os_error()));
        }
        // SAFETY: zero-initialised and filled by the kernel; all fields are plain integers.
        let info = unsafe { info.assume_init() };
        let id = info.id();
        if id != SENSE_FB_ID {
            return Err(LinuxError::WrongFramebuffer(id));
        }

        // SAFETY: mapping a regular fd for MAP_BYTES; the result is checked
        // against MAP_FAILED before use.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                MAP_BYTES,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(LinuxError::io("mmap framebuffer", std::io::Error::last_os_error()));
        }
        let map = NonNull::new(addr.cast::<u16>())
            .ok_or_else(|| LinuxError::io("mmap framebuffer", std::io::Error::last_os_error()))?;

        info!("mapped {} ({})", path.display(), id);
        Ok(Self { file, map })
    }

    fn gamma_ioctl(&self, request: libc::c_ulong, arg: *mut libc::c_void, what: &str) -> Result<(), LinuxError> {
        // SAFETY: the gamma requests take either a pointer to 32 bytes or a
        // plain integer, both supplied by the callers below.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
        if rc == -1 {
            return Err(LinuxError::io(what, std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Drop for SenseFramebuffer {
    fn drop(&mut self) {
        // SAFETY: `map` came from a successful mmap of MAP_BYTES.
        unsafe {
            libc::munmap(self.map.as_ptr().cast(), MAP_BYTES);
        }
    }
}

impl PixelBuffer for SenseFramebuffer {
    type Error = LinuxError;

    fn read_pixels(&mut self, out: &mut [u16; PIXEL_COUNT]) -> Result<(), LinuxError> {
        for (i, word) in out.iter_mut().enumerate() {
            // SAFETY: i < PIXEL_COUNT and the mapping holds PIXEL_COUNT words.
            *word = unsafe { ptr::read_volatile(self.map.as_ptr().add(i)) };
        }
        Ok(())
    }

    fn write_pixels(&mut self, pixels: &[u16; PIXEL_COUNT]) -> Result<(), LinuxError> {
        for (i, &word) in pixels.iter().enumerate() {
            // SAFETY: as above.
            unsafe { ptr::write_volatile(self.map.as_ptr().add(i), word) };
        }
        Ok(())
    }

    fn write_pixel(&mut self, index: usize, value: u16) -> Result<(), LinuxError> {
        if index < PIXEL_COUNT {
            // SAFETY: bounds checked above.
            unsafe { ptr::write_volatile(self.map.as_ptr().add(index), value) };
        }
        Ok(())
    }
}

impl GammaControl for SenseFramebuffer {
    type Error = LinuxError;

    fn gamma(&mut self) -> Result<[u8; 32], LinuxError> {
        let mut table = [0u8; 32];
        self.gamma_ioctl(SENSEFB_FBIOGET_GAMMA, table.as_mut_ptr().cast(), "get gamma")?;
        Ok(table)
    }

    fn set_gamma(&mut self, table: &[u8; 32]) -> Result<(), LinuxError> {
        let mut copy = *table;
        self.gamma_ioctl(SENSEFB_FBIOSET_GAMMA, copy.as_mut_ptr().cast(), "set gamma")
    }

    fn reset_gamma(&mut self, low_light: bool) -> Result<(), LinuxError> {
        let mode = if low_light { GAMMA_LOW } else { GAMMA_DEFAULT };
        self.gamma_ioctl(SENSEFB_FBIORESET_GAMMA, mode as *mut libc::c_void, "reset gamma")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_info_id_stops_at_nul() {
        let mut info: FixScreenInfo = unsafe { std::mem::zeroed() };
        info.id[..12].copy_from_slice(b"RPi-Sense FB");
        assert_eq!(info.id(), SENSE_FB_ID);
    }

    #[test]
    fn open_rejects_missing_device() {
        let err = SenseFramebuffer::open("/nonexistent/fb9").err().unwrap();
        assert!(matches!(err, LinuxError::Io { .. }));
    }
}
