//! Executable header validation.
//!
//! bootsect and setup come out of the 16-bit toolchain with a 32-byte
//! Minix a.out header. system comes out of gcc with a 1024-byte a.out
//! header. Both are stripped; only flat binaries are accepted, since
//! nothing downstream relocates or links them.
//!
//! Fields are decoded as little-endian 32-bit words at fixed offsets.

use std::io::{self, Read};

use crate::error::{Blob, BuildError, HeaderDefect, Result};
use crate::layout::{GCC_HEADER, MINIX_HEADER, MINIX_MAGIC};

fn word(bytes: &[u8], index: usize) -> u32 {
    let at = index * 4;
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Read until `buf` is full or EOF. Returns the number of bytes read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read exactly `len` header bytes from the start of a blob.
///
/// EOF before `len` bytes is reported as [`BuildError::TruncatedHeader`],
/// distinct from a header that reads fine but fails validation.
pub fn read_header<R: Read + ?Sized>(reader: &mut R, blob: Blob, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let actual = read_full(reader, &mut buf).map_err(|source| BuildError::Read { blob, source })?;
    if actual != len {
        return Err(BuildError::TruncatedHeader {
            blob,
            expected: len,
            actual,
        });
    }
    Ok(buf)
}

/// The 32-byte Minix a.out header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinixHeader {
    pub magic: u32,
    pub header_len: u32,
    pub text: u32,
    pub data: u32,
    pub bss: u32,
    pub entry: u32,
    pub total: u32,
    pub syms: u32,
}

impl MinixHeader {
    pub fn parse(bytes: &[u8; MINIX_HEADER]) -> Self {
        Self {
            magic: word(bytes, 0),
            header_len: word(bytes, 1),
            text: word(bytes, 2),
            data: word(bytes, 3),
            bss: word(bytes, 4),
            entry: word(bytes, 5),
            total: word(bytes, 6),
            syms: word(bytes, 7),
        }
    }

    /// Checks magic, self-described length, and that data, bss, entry
    /// and symbol table are all empty. The first mismatch wins.
    pub fn validate(&self, blob: Blob) -> Result<()> {
        let defect = if self.magic != MINIX_MAGIC {
            Some(HeaderDefect::Magic(self.magic))
        } else if self.header_len != MINIX_HEADER as u32 {
            Some(HeaderDefect::HeaderLength(self.header_len))
        } else if self.data != 0 {
            Some(HeaderDefect::DataSegment(self.data))
        } else if self.bss != 0 {
            Some(HeaderDefect::Bss(self.bss))
        } else if self.entry != 0 {
            Some(HeaderDefect::Entry(self.entry))
        } else if self.syms != 0 {
            Some(HeaderDefect::SymbolTable(self.syms))
        } else {
            None
        };

        match defect {
            Some(defect) => Err(BuildError::Header { blob, defect }),
            None => Ok(()),
        }
    }
}

/// The 1024-byte gcc a.out header of the kernel body.
///
/// Only the entry point is constrained; the rest of the layout belongs
/// to the kernel's own link script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GccHeader {
    pub entry: u32,
}

impl GccHeader {
    pub fn parse(bytes: &[u8; GCC_HEADER]) -> Self {
        Self {
            entry: word(bytes, 5),
        }
    }

    pub fn validate(&self, blob: Blob) -> Result<()> {
        if self.entry != 0 {
            return Err(BuildError::Header {
                blob,
                defect: HeaderDefect::Entry(self.entry),
            });
        }
        Ok(())
    }
}

/// Read and validate the Minix header of bootsect or setup, leaving
/// `reader` positioned at the payload.
pub fn strip_minix_header<R: Read + ?Sized>(reader: &mut R, blob: Blob) -> Result<MinixHeader> {
    let bytes = read_header(reader, blob, MINIX_HEADER)?;
    let mut fixed = [0u8; MINIX_HEADER];
    fixed.copy_from_slice(&bytes);
    let header = MinixHeader::parse(&fixed);
    header.validate(blob)?;
    Ok(header)
}

/// Read and validate the gcc header of system, leaving `reader`
/// positioned at the payload.
pub fn strip_gcc_header<R: Read + ?Sized>(reader: &mut R, blob: Blob) -> Result<GccHeader> {
    let bytes = read_header(reader, blob, GCC_HEADER)?;
    let mut fixed = [0u8; GCC_HEADER];
    fixed.copy_from_slice(&bytes);
    let header = GccHeader::parse(&fixed);
    header.validate(blob)?;
    Ok(header)
}
