//! The three image stages: boot sector, setup, system.
//!
//! Each stage strips and validates its header, then moves the payload to
//! the image through its own scratch buffer.

use std::io::{Read, Write};

use super::writer::ImageWriter;
use crate::error::{Blob, BuildError, Result};
use crate::header::{read_full, strip_gcc_header, strip_minix_header};
use crate::layout::{
    ImageLayout, BOOT_SIGNATURE, BOOT_SIGNATURE_OFFSET, ROOT_MAJOR_OFFSET, ROOT_MINOR_OFFSET,
    SCRATCH_SIZE, SECTOR_SIZE,
};
use crate::report::Reporter;
use crate::rootdev::RootDevice;

/// Write the 512-byte boot sector with the root device patched in.
///
/// Returns the payload size, which is always [`SECTOR_SIZE`] on success.
pub fn write_boot_sector<R, W>(
    input: &mut R,
    out: &mut ImageWriter<W>,
    root: RootDevice,
    report: &mut dyn Reporter,
) -> Result<usize>
where
    R: Read + ?Sized,
    W: Write,
{
    strip_minix_header(input, Blob::Boot)?;

    let mut buf = [0u8; SCRATCH_SIZE];
    let size = read_full(input, &mut buf).map_err(|source| BuildError::Read {
        blob: Blob::Boot,
        source,
    })?;
    report.boot_sector(size);
    if size != SECTOR_SIZE {
        return Err(BuildError::BootSectorSize { actual: size });
    }

    let flag = u16::from_le_bytes([buf[BOOT_SIGNATURE_OFFSET], buf[BOOT_SIGNATURE_OFFSET + 1]]);
    if flag != BOOT_SIGNATURE {
        return Err(BuildError::MissingBootSignature { found: flag });
    }

    buf[ROOT_MINOR_OFFSET] = root.minor;
    buf[ROOT_MAJOR_OFFSET] = root.major;

    out.put(&buf[..SECTOR_SIZE])?;
    out.flush()?;
    Ok(size)
}

/// Stream setup code and zero-pad it to the reserved sectors.
///
/// Returns the payload size before padding.
pub fn write_setup<R, W>(
    input: &mut R,
    out: &mut ImageWriter<W>,
    layout: &ImageLayout,
    report: &mut dyn Reporter,
) -> Result<usize>
where
    R: Read + ?Sized,
    W: Write,
{
    strip_minix_header(input, Blob::Setup)?;

    let max = layout.setup_bytes();
    let size = copy_payload(input, out, Blob::Setup, max)?;
    report.setup(size);
    if size > max {
        return Err(BuildError::SetupTooLarge { size, max });
    }

    let zeros = [0u8; SCRATCH_SIZE];
    let mut padded = size;
    while padded < max {
        let chunk = (max - padded).min(zeros.len());
        out.put(&zeros[..chunk])?;
        padded += chunk;
    }

    out.flush()?;
    Ok(size)
}

/// Stream the kernel body. No padding.
pub fn write_system<R, W>(
    input: &mut R,
    out: &mut ImageWriter<W>,
    layout: &ImageLayout,
    report: &mut dyn Reporter,
) -> Result<usize>
where
    R: Read + ?Sized,
    W: Write,
{
    strip_gcc_header(input, Blob::System)?;

    let max = layout.max_system_bytes();
    let size = copy_payload(input, out, Blob::System, max)?;
    report.system(size);
    if size > max {
        return Err(BuildError::SystemTooLarge { size, max });
    }

    out.flush()?;
    Ok(size)
}

/// Copy `input` to the image until EOF and return the total size.
///
/// Once the total passes `cap` nothing more is written, but the rest of
/// the input is still counted so the caller can report the real size.
fn copy_payload<R, W>(input: &mut R, out: &mut ImageWriter<W>, blob: Blob, cap: usize) -> Result<usize>
where
    R: Read + ?Sized,
    W: Write,
{
    let mut buf = [0u8; SCRATCH_SIZE];
    let mut total = 0usize;
    loop {
        let n = read_full(input, &mut buf).map_err(|source| BuildError::Read { blob, source })?;
        if n == 0 {
            break;
        }
        if total + n <= cap {
            out.put(&buf[..n])?;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, HeaderDefect};
    use crate::header::tests::{minix_header, set_word};
    use crate::layout::{GCC_HEADER, SETUP_SECTS, SYS_SIZE};
    use crate::report::RecordingReporter;
    use std::io::Cursor;

    fn boot_blob(fill: u8) -> Vec<u8> {
        let mut blob = minix_header();
        let mut sector = vec![fill; SECTOR_SIZE];
        sector[510] = 0x55;
        sector[511] = 0xAA;
        blob.extend_from_slice(&sector);
        blob
    }

    fn setup_blob(payload_len: usize) -> Vec<u8> {
        let mut blob = minix_header();
        blob.extend((0..payload_len).map(|i| (i % 251) as u8 + 1));
        blob
    }

    fn system_blob(payload_len: usize) -> Vec<u8> {
        let mut blob = vec![0u8; GCC_HEADER];
        blob.extend(std::iter::repeat(0x90).take(payload_len));
        blob
    }

    fn boot(blob: Vec<u8>, root: RootDevice) -> (Result<usize>, Vec<u8>) {
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        let result = write_boot_sector(&mut Cursor::new(blob), &mut out, root, &mut report);
        (result, out.finish().unwrap().0)
    }

    fn setup(blob: Vec<u8>) -> (Result<usize>, Vec<u8>) {
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        let result = write_setup(
            &mut Cursor::new(blob),
            &mut out,
            &ImageLayout::default(),
            &mut report,
        );
        (result, out.finish().unwrap().0)
    }

    fn system(blob: Vec<u8>) -> (Result<usize>, Vec<u8>) {
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        let result = write_system(
            &mut Cursor::new(blob),
            &mut out,
            &ImageLayout::default(),
            &mut report,
        );
        (result, out.finish().unwrap().0)
    }

    #[test]
    fn test_boot_sector_patches_root_device() {
        let (result, image) = boot(boot_blob(0xEE), RootDevice { major: 2, minor: 28 });
        assert_eq!(result.unwrap(), 512);
        assert_eq!(image.len(), 512);
        assert_eq!(image[508], 28);
        assert_eq!(image[509], 2);
        assert_eq!(&image[510..], &[0x55, 0xAA]);
        assert!(image[..508].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_boot_sector_must_be_one_sector() {
        let mut short = boot_blob(0);
        short.truncate(minix_header().len() + 511);
        let (result, image) = boot(short, RootDevice::DEFAULT);
        assert!(matches!(result, Err(BuildError::BootSectorSize { actual: 511 })));
        assert!(image.is_empty());

        let mut long = boot_blob(0);
        long.push(0);
        let (result, _) = boot(long, RootDevice::DEFAULT);
        assert!(matches!(result, Err(BuildError::BootSectorSize { actual: 513 })));
    }

    #[test]
    fn test_boot_sector_needs_signature() {
        let mut blob = boot_blob(0);
        let last = blob.len() - 1;
        blob[last] = 0;
        let (result, image) = boot(blob, RootDevice::DEFAULT);
        assert!(matches!(
            result,
            Err(BuildError::MissingBootSignature { found: 0x0055 })
        ));
        assert!(image.is_empty());
    }

    #[test]
    fn test_boot_header_defect_writes_nothing() {
        let mut blob = boot_blob(0);
        set_word(&mut blob, 1, 48);
        let (result, image) = boot(blob, RootDevice::DEFAULT);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            BuildError::Header {
                blob: Blob::Boot,
                defect: HeaderDefect::HeaderLength(48)
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(image.is_empty());
    }

    #[test]
    fn test_empty_setup_is_all_padding() {
        let (result, image) = setup(setup_blob(0));
        assert_eq!(result.unwrap(), 0);
        assert_eq!(image.len(), SETUP_SECTS * SECTOR_SIZE);
        assert!(image.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_small_setup_is_padded() {
        let (result, image) = setup(setup_blob(100));
        assert_eq!(result.unwrap(), 100);
        assert_eq!(image.len(), 2048);
        assert_eq!(&image[..100], &setup_blob(100)[32..]);
        assert!(image[100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_setup_needs_no_padding() {
        let blob = setup_blob(2048);
        let (result, image) = setup(blob.clone());
        assert_eq!(result.unwrap(), 2048);
        assert_eq!(image, &blob[32..]);
    }

    #[test]
    fn test_oversized_setup_fails() {
        let (result, image) = setup(setup_blob(2049));
        match result {
            Err(BuildError::SetupTooLarge { size, max }) => {
                assert_eq!(size, 2049);
                assert_eq!(max, 2048);
            }
            other => panic!("expected SetupTooLarge, got {other:?}"),
        }
        assert!(image.len() <= 2048);
    }

    #[test]
    fn test_setup_reports_payload_size() {
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        write_setup(
            &mut Cursor::new(setup_blob(700)),
            &mut out,
            &ImageLayout::default(),
            &mut report,
        )
        .unwrap();
        assert_eq!(report.lines, vec!["Setup is 700 bytes."]);
    }

    #[test]
    fn test_system_is_copied_unpadded() {
        let (result, image) = system(system_blob(3000));
        assert_eq!(result.unwrap(), 3000);
        assert_eq!(image.len(), 3000);
        assert!(image.iter().all(|&b| b == 0x90));
    }

    #[test]
    fn test_system_size_limit_is_inclusive() {
        let max = SYS_SIZE * 16;
        let (result, image) = system(system_blob(max));
        assert_eq!(result.unwrap(), max);
        assert_eq!(image.len(), max);

        let (result, _) = system(system_blob(max + 1));
        match result {
            Err(err @ BuildError::SystemTooLarge { .. }) => {
                assert_eq!(err.kind(), ErrorKind::SizeLimit);
            }
            other => panic!("expected SystemTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_system_header_entry_must_be_zero() {
        let mut blob = system_blob(16);
        set_word(&mut blob, 5, 0x1000);
        let (result, image) = system(blob);
        assert!(matches!(
            result,
            Err(BuildError::Header {
                blob: Blob::System,
                defect: HeaderDefect::Entry(0x1000)
            })
        ));
        assert!(image.is_empty());
    }

    #[test]
    fn test_smaller_layout_caps_setup() {
        let layout = ImageLayout {
            setup_sects: 1,
            sys_size: 4,
        };
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        let err = write_setup(
            &mut Cursor::new(setup_blob(513)),
            &mut out,
            &layout,
            &mut report,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::SetupTooLarge { size: 513, max: 512 }));
        assert!(err.to_string().starts_with("Setup exceeds 1 sectors"));
        assert_eq!(report.lines, vec!["Setup is 513 bytes."]);
    }

    #[test]
    fn test_smaller_layout_caps_system() {
        let layout = ImageLayout {
            setup_sects: 1,
            sys_size: 4,
        };
        let mut out = ImageWriter::new(Vec::new());
        let mut report = RecordingReporter::default();
        let err = write_system(
            &mut Cursor::new(system_blob(65)),
            &mut out,
            &layout,
            &mut report,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::SystemTooLarge { size: 65, max: 64 }));
    }
}
