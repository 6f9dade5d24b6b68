//! Initrd generation
//!
//! Wraps the sysroot's initrd generator script, which packs the userspace of
//! the sysroot into a cpio archive.

use std::path::Path;
use std::process::Command;

use super::process;
use crate::config::defaults::{GEN_INITRD_SCRIPT, TRIPLE_OS};
use crate::error::Result;

/// Build the generator command line
pub fn command(python: &str, out: &Path, arch: &str, sysroot: &Path) -> Command {
    let mut cmd = Command::new(python);
    cmd.arg(sysroot.join(GEN_INITRD_SCRIPT))
        .arg(format!("--triple={arch}-{TRIPLE_OS}"))
        .arg(format!("--sysroot={}", sysroot.display()))
        .arg("-o")
        .arg(out);
    cmd
}

/// Generate an initrd for `arch` from `sysroot` into `out`
pub fn generate(python: &str, out: &Path, arch: &str, sysroot: &Path) -> Result<()> {
    process::run(&mut command(python, out, arch, sysroot))?;
    Ok(())
}
