//! Boot image assembly.
//!
//! Builds a bootable image from three separately linked blobs and writes
//! it as one stream:
//!
//! - **bootsect** - exactly one sector of real-mode code, ending in the
//!   0xAA55 boot flag. The root device is patched into bytes 508/509.
//! - **setup** - at most [`layout::SETUP_SECTS`] sectors, zero padded to
//!   fill them.
//! - **system** - the kernel body, at most [`layout::SYS_SIZE`]
//!   paragraphs, copied as is.
//!
//! Each blob's a.out header is validated and stripped on the way through.
//!
//! # Architecture
//!
//! ```text
//! cli::BuildArgs ──► rootdev::RootDeviceSpec::resolve
//!                         │
//!                         ▼
//!        assemble::build_image_from_paths
//!            ├── header::strip_minix_header ─► write_boot_sector
//!            ├── header::strip_minix_header ─► write_setup
//!            └── header::strip_gcc_header   ─► write_system
//!                         │
//!                         ▼
//!                report::Reporter (stderr)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use boot_image_builder::{build_image_from_paths, BuildArgs, ImageLayout, StderrReporter};
//!
//! let args = BuildArgs::parse(&["bootsect", "setup", "system", "FLOPPY"])?;
//! let stdout = std::io::stdout();
//! build_image_from_paths(&args, &ImageLayout::default(), stdout.lock(), &mut StderrReporter)?;
//! # Ok::<(), boot_image_builder::BuildError>(())
//! ```

pub mod assemble;
pub mod cli;
pub mod error;
pub mod header;
pub mod layout;
pub mod report;
pub mod rootdev;

pub use assemble::{build_image, build_image_from_paths, BuildSummary, ImageWriter};
pub use cli::BuildArgs;
pub use error::{Blob, BuildError, ErrorKind, HeaderDefect};
pub use layout::ImageLayout;
pub use report::{RecordingReporter, Reporter, StderrReporter};
pub use rootdev::{DeviceNumber, RootDevice, RootDeviceSpec};
