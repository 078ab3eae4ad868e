//! Root device resolution.
//!
//! The booted kernel learns its root filesystem from two bytes patched
//! into the boot sector. This module turns the optional fourth command
//! line argument into that (major, minor) pair.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::layout::{ALLOWED_MAJORS, DEFAULT_MAJOR_ROOT, DEFAULT_MINOR_ROOT};

/// Keyword that selects "boot from the floppy the image was loaded from".
pub const FLOPPY: &str = "FLOPPY";

/// A device number as the filesystem reports it, before any range or
/// allow-list check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    pub fn from_rdev(rdev: u64) -> Self {
        let dev = rdev as libc::dev_t;
        Self {
            major: libc::major(dev),
            minor: libc::minor(dev),
        }
    }

    /// Narrow to the two boot sector bytes and apply the major allow-list.
    pub fn to_root_device(self) -> Result<RootDevice> {
        let major = u8::try_from(self.major).map_err(|_| BuildError::IllegalMajor {
            major: self.major,
        })?;
        let minor = u8::try_from(self.minor).map_err(|_| BuildError::MinorOutOfRange {
            minor: self.minor,
        })?;
        let device = RootDevice { major, minor };
        device.check_major()?;
        Ok(device)
    }
}

impl From<RootDevice> for DeviceNumber {
    fn from(device: RootDevice) -> Self {
        Self {
            major: u32::from(device.major),
            minor: u32::from(device.minor),
        }
    }
}

impl fmt::Display for DeviceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.major, self.minor)
    }
}

/// The root device as patched into the boot sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootDevice {
    pub major: u8,
    pub minor: u8,
}

impl RootDevice {
    pub const FLOPPY: RootDevice = RootDevice { major: 0, minor: 0 };

    pub const DEFAULT: RootDevice = RootDevice {
        major: DEFAULT_MAJOR_ROOT,
        minor: DEFAULT_MINOR_ROOT,
    };

    /// Only floppy (2), hard disk (3) and "none" (0) are bootable.
    pub fn check_major(&self) -> Result<()> {
        if ALLOWED_MAJORS.contains(&self.major) {
            return Ok(());
        }
        Err(BuildError::IllegalMajor {
            major: u32::from(self.major),
        })
    }
}

impl Default for RootDevice {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RootDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DeviceNumber::from(*self).fmt(f)
    }
}

/// How the root device was given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootDeviceSpec {
    /// No fourth argument.
    Default,
    /// The literal `FLOPPY`.
    Floppy,
    /// Path to a device node whose `st_rdev` is used.
    Path(PathBuf),
}

impl RootDeviceSpec {
    pub fn from_arg(arg: Option<&OsStr>) -> Self {
        match arg {
            None => RootDeviceSpec::Default,
            Some(arg) if arg == FLOPPY => RootDeviceSpec::Floppy,
            Some(path) => RootDeviceSpec::Path(PathBuf::from(path)),
        }
    }

    /// Map the spec to a raw device number. Nothing is range checked
    /// here, so the pair can be reported before it is rejected.
    pub fn resolve(&self) -> Result<DeviceNumber> {
        match self {
            RootDeviceSpec::Default => Ok(RootDevice::DEFAULT.into()),
            RootDeviceSpec::Floppy => Ok(RootDevice::FLOPPY.into()),
            RootDeviceSpec::Path(path) => Ok(DeviceNumber::from_rdev(stat_rdev(path)?)),
        }
    }
}

fn stat_rdev(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|source| BuildError::StatRootDevice {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(metadata.rdev())
}
