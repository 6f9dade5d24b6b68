//! FIT packaging with U-Boot's `mkimage`
//!
//! The descriptor references the ramdisk by bare file name, so it is written
//! into the same working directory as the ramdisk before `mkimage` runs.

use std::path::Path;
use std::process::Command;

use super::{filesystem, process};
use crate::config::defaults::DESCRIPTOR_NAME;
use crate::core::fit::FitDescriptor;
use crate::error::Result;

/// Build the packaging command line
pub fn command(mkimage: &str, its: &Path, dest: &Path) -> Command {
    let mut cmd = Command::new(mkimage);
    cmd.arg("--fit").arg(its).arg(dest);
    cmd
}

/// Write the descriptor into `workdir` and package it into `dest`
///
/// A failed run leaves no file at `dest`.
pub fn package(mkimage: &str, descriptor: &FitDescriptor, workdir: &Path, dest: &Path) -> Result<()> {
    let its = workdir.join(DESCRIPTOR_NAME);
    filesystem::write_file(&its, &descriptor.render())?;
    filesystem::create_parent_dir(dest)?;

    if let Err(e) = process::run(&mut command(mkimage, &its, dest)) {
        filesystem::remove_partial(dest);
        return Err(e.into());
    }
    Ok(())
}
