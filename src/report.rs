//! Progress diagnostics.
//!
//! stdout carries the image, so everything human-readable goes to
//! stderr. Nothing here feeds back into the build.

use crate::rootdev::DeviceNumber;

/// Receives progress lines from the assembler.
pub trait Reporter {
    fn line(&mut self, line: String);

    fn root_device(&mut self, device: DeviceNumber) {
        self.line(format!("Root device is {device}"));
    }

    fn boot_sector(&mut self, bytes: usize) {
        self.line(format!("Boot sector {bytes} bytes."));
    }

    fn setup(&mut self, bytes: usize) {
        self.line(format!("Setup is {bytes} bytes."));
    }

    fn system(&mut self, bytes: usize) {
        self.line(format!("System is {bytes} bytes."));
    }

    fn image(&mut self, bytes: u64, sha256: &str) {
        self.line(format!("Image is {bytes} bytes (sha256 {sha256})"));
    }
}

/// Prints each line to stderr.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn line(&mut self, line: String) {
        eprintln!("{line}");
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn line(&mut self, line: String) {
        self.lines.push(line);
    }
}
