//! Default configuration values

/// Spaces of indentation per device tree nesting level
pub const DTS_INDENT: usize = 4;

/// Default sysroot when none is given
pub const DEFAULT_SYSROOT: &str = "/";

/// File name of the generated initrd inside FIT working directories
pub const RAMDISK_NAME: &str = "initrd.cpio";

/// File name of the generated image tree source
pub const DESCRIPTOR_NAME: &str = "image.its";

/// Initrd generator, relative to the sysroot
pub const GEN_INITRD_SCRIPT: &str = "usr/managarm/bin/gen-initrd.py";

/// Interpreter used to run the initrd generator
pub const DEFAULT_PYTHON: &str = "python3";

/// U-Boot image packaging tool
pub const DEFAULT_MKIMAGE: &str = "mkimage";

/// Operating system the boot artifacts are built for
pub const OS_NAME: &str = "Managarm";

/// Suffix of the target triple passed to the initrd generator
pub const TRIPLE_OS: &str = "managarm";

/// OS tag written into FIT image entries
///
/// U-Boot has no dedicated tag for this kernel; it boots through the Linux path.
pub const FIT_OS_TAG: &str = "linux";

/// Compression marker written into FIT image entries
pub const FIT_COMPRESSION: &str = "none";
