//! Append-only image output.

use std::io::Write;

use sha2::{Digest, Sha256};

use crate::error::{BuildError, Result};

/// Wraps the image sink, counting and hashing every byte written.
///
/// A write that cannot be completed in full is fatal; the sink is
/// never retried past what `write_all` already does for `EINTR`.
pub struct ImageWriter<W: Write> {
    inner: W,
    written: u64,
    hasher: Sha256,
}

impl<W: Write> ImageWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            written: 0,
            hasher: Sha256::new(),
        }
    }

    pub fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|source| BuildError::Write { source })?;
        self.hasher.update(bytes);
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Push completed stages out to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|source| BuildError::Write { source })
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Flush and return the sink with the image length and hex digest.
    pub fn finish(mut self) -> Result<(W, u64, String)> {
        self.flush()?;
        let sha = format!("{:x}", self.hasher.finalize());
        Ok((self.inner, self.written, sha))
    }
}
