//! Build actions
//!
//! A profile is an ordered list of [`Action`]s. Each action reads from the
//! sysroot and writes into the output directory; all of them are dispatched
//! through [`Action::execute`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::fit::FitSources;
use super::profile::Profile;
use crate::config::defaults::{DEFAULT_MKIMAGE, DEFAULT_PYTHON, RAMDISK_NAME};
use crate::error::Result;
use crate::infra::{filesystem, initrd, mkimage};

/// External tools used by actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    /// Interpreter for the initrd generator
    pub python: String,
    /// FIT packaging tool
    pub mkimage: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            mkimage: DEFAULT_MKIMAGE.to_string(),
        }
    }
}

/// Everything an action needs besides its own parameters
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub profile: &'a Profile,
    pub sysroot: &'a Path,
    pub out: &'a Path,
    pub tools: &'a Tools,
}

/// One build step of a profile
///
/// Paths named `src`, `prekernel` and `dtb` are relative to the sysroot;
/// `dest` is relative to the output directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Copy a file (or directory) from the sysroot
    Copy {
        src: String,
        /// Output subdirectory; the base name of `src` is kept
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subdir: Option<String>,
    },

    /// Write static text
    WriteText { dest: String, data: String },

    /// Run the initrd generator
    GenerateInitrd { dest: String },

    /// Package kernel, initrd and device tree into a FIT image
    FitImage {
        dest: String,
        prekernel: String,
        dtb: String,
        load_address: u64,
    },
}

impl Action {
    /// Output path of this action, relative to the output directory
    pub fn dest(&self) -> PathBuf {
        match self {
            Self::Copy { src, subdir } => {
                let file = Path::new(src)
                    .file_name()
                    .map_or_else(|| PathBuf::from(src), PathBuf::from);
                match subdir {
                    Some(dir) => Path::new(dir).join(file),
                    None => file,
                }
            }
            Self::WriteText { dest, .. }
            | Self::GenerateInitrd { dest }
            | Self::FitImage { dest, .. } => PathBuf::from(dest),
        }
    }

    /// One-line description used in logs and error messages
    pub fn label(&self) -> String {
        match self {
            Self::Copy { src, .. } => format!("COPY {src} -> {}", self.dest().display()),
            Self::WriteText { dest, .. } => format!("WRITE {dest}"),
            Self::GenerateInitrd { dest } => format!("GEN_INITRD {dest}"),
            Self::FitImage { dest, .. } => format!("FIT_IMAGE {dest}"),
        }
    }

    /// Whether this action runs the initrd generator
    pub fn needs_python(&self) -> bool {
        matches!(self, Self::GenerateInitrd { .. } | Self::FitImage { .. })
    }

    /// Whether this action runs `mkimage`
    pub fn needs_mkimage(&self) -> bool {
        matches!(self, Self::FitImage { .. })
    }

    /// FIT inputs of a `FitImage` action
    pub fn fit_sources(&self, profile: &Profile, sysroot: &Path) -> Option<FitSources> {
        match self {
            Self::FitImage {
                prekernel,
                dtb,
                load_address,
                ..
            } => Some(fit_sources(profile, sysroot, prekernel, dtb, *load_address)),
            _ => None,
        }
    }

    /// Run the action
    pub fn execute(&self, ctx: &ActionContext<'_>) -> Result<()> {
        tracing::info!("{}", self.label());
        let dest = ctx.out.join(self.dest());

        match self {
            Self::Copy { src, .. } => {
                let copied = filesystem::copy_tree(&ctx.sysroot.join(src), &dest)?;
                tracing::debug!("Copied {copied} file(s) to {}", dest.display());
            }
            Self::WriteText { data, .. } => {
                filesystem::write_file(&dest, data)?;
            }
            Self::GenerateInitrd { .. } => {
                filesystem::create_parent_dir(&dest)?;
                initrd::generate(&ctx.tools.python, &dest, &ctx.profile.arch, ctx.sysroot)?;
            }
            Self::FitImage {
                prekernel,
                dtb,
                load_address,
                ..
            } => {
                let sources = fit_sources(ctx.profile, ctx.sysroot, prekernel, dtb, *load_address);
                build_fit_image(&sources, ctx, &dest)?;
            }
        }
        Ok(())
    }
}

fn fit_sources(
    profile: &Profile,
    sysroot: &Path,
    prekernel: &str,
    dtb: &str,
    load_address: u64,
) -> FitSources {
    FitSources {
        board: profile.name.clone(),
        arch: profile.arch.clone(),
        prekernel: sysroot.join(prekernel),
        dtb: sysroot.join(dtb),
        load_address,
    }
}

/// Generate the initrd and package the FIT image through a scratch directory
///
/// The descriptor is assembled before the initrd is generated, so an invalid
/// image set never spawns a process. The scratch directory is removed on
/// every path out of this function.
fn build_fit_image(sources: &FitSources, ctx: &ActionContext<'_>, dest: &Path) -> Result<()> {
    let descriptor = sources.assemble()?;

    let workdir = filesystem::temp_dir()?;
    tracing::debug!("FIT working directory: {}", workdir.path().display());

    let initrd_path = workdir.path().join(RAMDISK_NAME);
    initrd::generate(&ctx.tools.python, &initrd_path, &ctx.profile.arch, ctx.sysroot)?;
    mkimage::package(&ctx.tools.mkimage, &descriptor, workdir.path(), dest)
}
