//! Command line arguments.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::error::{BuildError, Result};
use crate::rootdev::RootDeviceSpec;

/// `build bootsect setup system [rootdev]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    pub bootsect: PathBuf,
    pub setup: PathBuf,
    pub system: PathBuf,
    pub root: RootDeviceSpec,
}

impl BuildArgs {
    /// Parse positional arguments, program name excluded. Paths are taken
    /// as raw OS strings; they need not be UTF-8.
    pub fn parse<S: AsRef<OsStr>>(args: &[S]) -> Result<Self> {
        let (bootsect, setup, system, root) = match args {
            [bootsect, setup, system] => (bootsect, setup, system, None),
            [bootsect, setup, system, root] => (bootsect, setup, system, Some(root.as_ref())),
            _ => return Err(BuildError::Usage),
        };

        Ok(Self {
            bootsect: PathBuf::from(bootsect.as_ref()),
            setup: PathBuf::from(setup.as_ref()),
            system: PathBuf::from(system.as_ref()),
            root: RootDeviceSpec::from_arg(root),
        })
    }
}
