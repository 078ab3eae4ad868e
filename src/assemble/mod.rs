//! Image assembly. Boot sector, setup and system go out as one stream.
//!
//! Stages run strictly in order. Each one opens its blob, validates the
//! header, moves the payload, and closes the blob before the next starts.
//! A failing stage leaves everything before it in the output.

mod stages;
mod writer;

pub use stages::{write_boot_sector, write_setup, write_system};
pub use writer::ImageWriter;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::cli::BuildArgs;
use crate::error::{Blob, BuildError, Result};
use crate::layout::ImageLayout;
use crate::report::Reporter;
use crate::rootdev::{DeviceNumber, RootDevice};

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub root: RootDevice,
    pub boot_bytes: usize,
    pub setup_bytes: usize,
    pub system_bytes: usize,
    pub image_bytes: u64,
    pub sha256: String,
}

/// Hands out each blob when its stage starts.
trait BlobSource {
    fn open(&mut self, blob: Blob) -> Result<Box<dyn Read + '_>>;
}

struct Readers<'a> {
    bootsect: &'a mut dyn Read,
    setup: &'a mut dyn Read,
    system: &'a mut dyn Read,
}

impl BlobSource for Readers<'_> {
    fn open(&mut self, blob: Blob) -> Result<Box<dyn Read + '_>> {
        let reader: &mut dyn Read = match blob {
            Blob::Boot => &mut *self.bootsect,
            Blob::Setup => &mut *self.setup,
            Blob::System => &mut *self.system,
        };
        Ok(Box::new(reader))
    }
}

struct Files<'a>(&'a BuildArgs);

impl BlobSource for Files<'_> {
    fn open(&mut self, blob: Blob) -> Result<Box<dyn Read + '_>> {
        let path = match blob {
            Blob::Boot => &self.0.bootsect,
            Blob::Setup => &self.0.setup,
            Blob::System => &self.0.system,
        };
        Ok(Box::new(open_blob(path, blob)?))
    }
}

/// Build an image from three in-memory or already-open blobs.
pub fn build_image<W: Write>(
    bootsect: &mut dyn Read,
    setup: &mut dyn Read,
    system: &mut dyn Read,
    root: impl Into<DeviceNumber>,
    layout: &ImageLayout,
    out: W,
    report: &mut dyn Reporter,
) -> Result<BuildSummary> {
    let mut source = Readers {
        bootsect,
        setup,
        system,
    };
    assemble(&mut source, root.into(), layout, out, report)
}

/// Build an image from the files named on the command line.
pub fn build_image_from_paths<W: Write>(
    args: &BuildArgs,
    layout: &ImageLayout,
    out: W,
    report: &mut dyn Reporter,
) -> Result<BuildSummary> {
    let root = args.root.resolve()?;
    assemble(&mut Files(args), root, layout, out, report)
}

fn assemble<W: Write>(
    source: &mut dyn BlobSource,
    number: DeviceNumber,
    layout: &ImageLayout,
    out: W,
    report: &mut dyn Reporter,
) -> Result<BuildSummary> {
    report.root_device(number);
    let root = number.to_root_device()?;

    let mut image = ImageWriter::new(out);

    // Each blob is dropped before the next one is opened.
    let boot_bytes = {
        let mut input = source.open(Blob::Boot)?;
        write_boot_sector(&mut *input, &mut image, root, report)?
    };
    let setup_bytes = {
        let mut input = source.open(Blob::Setup)?;
        write_setup(&mut *input, &mut image, layout, report)?
    };
    let system_bytes = {
        let mut input = source.open(Blob::System)?;
        write_system(&mut *input, &mut image, layout, report)?
    };

    let (_, image_bytes, sha256) = image.finish()?;
    report.image(image_bytes, &sha256);
    Ok(BuildSummary {
        root,
        boot_bytes,
        setup_bytes,
        system_bytes,
        image_bytes,
        sha256,
    })
}

fn open_blob(path: &Path, blob: Blob) -> Result<File> {
    File::open(path).map_err(|source| BuildError::Open {
        blob,
        path: path.to_path_buf(),
        source,
    })
}
