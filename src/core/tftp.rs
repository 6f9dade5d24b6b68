//! TFTP directory generation
//!
//! Runs a profile's actions in order against a sysroot and an output
//! directory. Everything that can be checked up front (architecture tags and
//! external tools) is checked before the first action runs, so configuration
//! errors never leave a half-written output directory behind.

use std::path::{Path, PathBuf};

use super::action::{Action, ActionContext, Tools};
use super::profile::Profile;
use crate::error::{BootError, Result};
use crate::infra::{filesystem, process};

/// Generates the boot artifacts of one profile
#[derive(Debug)]
pub struct TftpGenerator<'a> {
    profile: &'a Profile,
    sysroot: PathBuf,
    out: PathBuf,
    tools: Tools,
}

impl<'a> TftpGenerator<'a> {
    /// Create a generator for `profile`
    pub fn new(profile: &'a Profile, sysroot: &Path, out: &Path, tools: Tools) -> Self {
        Self {
            profile,
            sysroot: sysroot.to_path_buf(),
            out: out.to_path_buf(),
            tools,
        }
    }

    /// The profile being generated
    pub fn profile(&self) -> &Profile {
        self.profile
    }

    /// Check architecture support and tool availability
    pub fn preflight(&self) -> Result<()> {
        self.profile.validate()?;

        let actions = &self.profile.actions;
        if actions.iter().any(Action::needs_python) {
            process::find_tool(&self.tools.python)?;
        }
        if actions.iter().any(Action::needs_mkimage) {
            process::find_tool(&self.tools.mkimage)?;
        }
        Ok(())
    }

    /// Run all actions, calling `progress` before each one
    ///
    /// Stops at the first failing action; the error names that action.
    pub fn run(&self, mut progress: impl FnMut(usize, &Action)) -> Result<()> {
        self.preflight()?;
        filesystem::create_dir_all(&self.out)?;

        let ctx = ActionContext {
            profile: self.profile,
            sysroot: &self.sysroot,
            out: &self.out,
            tools: &self.tools,
        };

        for (index, action) in self.profile.actions.iter().enumerate() {
            progress(index, action);
            action
                .execute(&ctx)
                .map_err(|e: BootError| e.in_action(action.label()))?;
        }

        tracing::info!(
            "Generated {} artifact(s) for '{}' in {}",
            self.profile.actions.len(),
            self.profile.name,
            self.out.display()
        );
        Ok(())
    }
}
