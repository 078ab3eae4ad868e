//! Error types for image assembly.
//!
//! Every error is fatal to the build. Bytes already written to the image
//! stay written; callers must treat the output as invalid.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::layout::SECTOR_SIZE;

pub type Result<T> = std::result::Result<T, BuildError>;

/// The three input blobs, in image order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blob {
    Boot,
    Setup,
    System,
}

impl Blob {
    pub fn name(self) -> &'static str {
        match self {
            Blob::Boot => "boot",
            Blob::Setup => "setup",
            Blob::System => "system",
        }
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A header field that does not match the expected executable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDefect {
    /// Word 0 is not the Minix magic.
    Magic(u32),
    /// Word 1 does not describe a 32-byte header.
    HeaderLength(u32),
    /// Word 3, data segment size.
    DataSegment(u32),
    /// Word 4, bss size.
    Bss(u32),
    /// Word 5, entry point.
    Entry(u32),
    /// Word 7, symbol table size.
    SymbolTable(u32),
}

impl HeaderDefect {
    /// Value found in the offending field.
    pub fn found(self) -> u32 {
        match self {
            HeaderDefect::Magic(v)
            | HeaderDefect::HeaderLength(v)
            | HeaderDefect::DataSegment(v)
            | HeaderDefect::Bss(v)
            | HeaderDefect::Entry(v)
            | HeaderDefect::SymbolTable(v) => v,
        }
    }
}

/// Coarse classification of [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Resolution,
    Io,
    Format,
    SizeLimit,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Usage: build bootsect setup system [rootdev] [> image]")]
    Usage,

    #[error("Couldn't stat root device '{}': {source}", .path.display())]
    StatRootDevice {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Illegal root device (major = {major}): bad root device --- major #")]
    IllegalMajor { major: u32 },

    #[error("Illegal root device (minor = {minor}): minor does not fit in a byte")]
    MinorOutOfRange { minor: u32 },

    #[error("Unable to open '{blob}' ({}): {source}", .path.display())]
    Open {
        blob: Blob,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to read '{blob}': {source}")]
    Read {
        blob: Blob,
        #[source]
        source: io::Error,
    },

    #[error("Unable to read header of '{blob}' ({actual} of {expected} bytes)")]
    TruncatedHeader {
        blob: Blob,
        expected: usize,
        actual: usize,
    },

    #[error("Write call failed: {source}")]
    Write {
        #[source]
        source: io::Error,
    },

    #[error("{}", header_message(.blob, .defect))]
    Header { blob: Blob, defect: HeaderDefect },

    #[error("Boot block must be exactly {} bytes (got {actual})", SECTOR_SIZE)]
    BootSectorSize { actual: usize },

    #[error("Boot block hasn't got boot flag (0xAA55), found {found:#06x}")]
    MissingBootSignature { found: u16 },

    #[error(
        "Setup exceeds {} sectors ({size} > {max} bytes) - rewrite build/boot/setup",
        .max / SECTOR_SIZE
    )]
    SetupTooLarge { size: usize, max: usize },

    #[error("System is too big ({size} > {max} bytes)")]
    SystemTooLarge { size: usize, max: usize },
}

fn header_message(blob: &Blob, defect: &HeaderDefect) -> String {
    let format = if *blob == Blob::System { "GCC" } else { "Minix" };
    match defect {
        HeaderDefect::Magic(_) | HeaderDefect::HeaderLength(_) | HeaderDefect::Entry(_) => {
            format!("Non-{format} header of '{blob}'")
        }
        HeaderDefect::DataSegment(_) => format!("Illegal data segment in '{blob}'"),
        HeaderDefect::Bss(_) => format!("Illegal bss in '{blob}'"),
        HeaderDefect::SymbolTable(_) => format!("Illegal symbol table in '{blob}'"),
    }
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Usage => ErrorKind::Usage,
            BuildError::StatRootDevice { .. }
            | BuildError::IllegalMajor { .. }
            | BuildError::MinorOutOfRange { .. } => ErrorKind::Resolution,
            BuildError::Open { .. }
            | BuildError::Read { .. }
            | BuildError::TruncatedHeader { .. }
            | BuildError::Write { .. } => ErrorKind::Io,
            BuildError::Header { .. }
            | BuildError::BootSectorSize { .. }
            | BuildError::MissingBootSignature { .. } => ErrorKind::Format,
            BuildError::SetupTooLarge { .. } | BuildError::SystemTooLarge { .. } => {
                ErrorKind::SizeLimit
            }
        }
    }
}
