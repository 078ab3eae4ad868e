//! Fixed layout of the boot image.
//!
//! ```text
//! [0, 512)              boot sector, root device patched at 508/509
//! [512, 512 + 4*512)    setup code, zero padded to SETUP_SECTS sectors
//! [2560, 2560 + N)      system, N <= SYS_SIZE * 16, unpadded
//! ```

/// Sector size in bytes.
pub const SECTOR_SIZE: usize = 512;

/// Number of sectors reserved for setup. Bootsect loads exactly this many.
pub const SETUP_SECTS: usize = 4;

/// Maximum system size in 16-byte paragraphs.
pub const SYS_SIZE: usize = 0x2000;

/// Length of the Minix a.out header on bootsect and setup.
pub const MINIX_HEADER: usize = 32;

/// Length of the GCC a.out header on system.
pub const GCC_HEADER: usize = 1024;

/// First word of a Minix header (magic, flags and cpu bytes).
pub const MINIX_MAGIC: u32 = 0x0410_0301;

/// Boot flag expected in the last two bytes of the boot sector.
pub const BOOT_SIGNATURE: u16 = 0xAA55;

/// Offset of the boot flag inside the boot sector.
pub const BOOT_SIGNATURE_OFFSET: usize = 510;

/// Offset of the root device minor number inside the boot sector.
pub const ROOT_MINOR_OFFSET: usize = 508;

/// Offset of the root device major number inside the boot sector.
pub const ROOT_MAJOR_OFFSET: usize = 509;

/// Root device used when none is given on the command line (/dev/hd6).
pub const DEFAULT_MAJOR_ROOT: u8 = 3;
pub const DEFAULT_MINOR_ROOT: u8 = 6;

/// Majors the boot loader knows how to mount: none, floppy, hard disk.
pub const ALLOWED_MAJORS: [u8; 3] = [0, 2, 3];

/// Capacity of the per-stage scratch buffer.
pub const SCRATCH_SIZE: usize = 1024;

/// Size policy for one image build.
///
/// The command line always uses [`ImageLayout::default`]; the fields
/// exist so the limits are named in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    /// Sectors reserved for setup.
    pub setup_sects: usize,
    /// Maximum system size in paragraphs.
    pub sys_size: usize,
}

impl ImageLayout {
    /// Bytes occupied by the setup region.
    pub fn setup_bytes(&self) -> usize {
        self.setup_sects * SECTOR_SIZE
    }

    /// Largest accepted system payload in bytes.
    pub fn max_system_bytes(&self) -> usize {
        self.sys_size * 16
    }

    /// Offset of the system region in the image.
    pub fn system_offset(&self) -> usize {
        SECTOR_SIZE + self.setup_bytes()
    }
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            setup_sects: SETUP_SECTS,
            sys_size: SYS_SIZE,
        }
    }
}
