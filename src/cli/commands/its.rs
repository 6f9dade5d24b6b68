//! Its command implementation
//!
//! Implements `boot-artifacts its` to print the FIT image tree source that
//! `tftp` would hand to `mkimage`. Nothing is generated or packaged.

use std::path::Path;

use anyhow::Result;

use super::TargetArgs;
use crate::cli::output::{status, OutputConfig};
use crate::error::ConfigError;
use crate::infra::filesystem;

/// Execute the its command
pub fn execute(target: &TargetArgs, path: Option<&Path>, output: &OutputConfig) -> Result<()> {
    let table = target.table.load()?;
    let profile = table.get(&target.profile)?;

    let sources = profile
        .fit_action()
        .and_then(|action| action.fit_sources(profile, &target.sysroot))
        .ok_or_else(|| ConfigError::NoFitImage {
            profile: profile.name.clone(),
        })?;

    let its = sources.assemble()?.render();

    match path {
        Some(path) => {
            filesystem::write_file(path, &its)?;
            if output.show_status() {
                println!("{} Wrote {}", status::SUCCESS, path.display());
            }
        }
        None => print!("{its}"),
    }
    Ok(())
}
