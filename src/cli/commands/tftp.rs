//! Tftp command implementation
//!
//! Implements `boot-artifacts tftp` to populate a network boot directory.

use std::path::Path;

use anyhow::Result;

use super::TargetArgs;
use crate::cli::output::{create_action_bar, status, OutputConfig};
use crate::core::action::Tools;
use crate::core::tftp::TftpGenerator;

/// Execute the tftp command
pub fn execute(target: &TargetArgs, out: &Path, tools: Tools, output: &OutputConfig) -> Result<()> {
    let table = target.table.load()?;
    let profile = table.get(&target.profile)?;

    tracing::info!(
        "Generating artifacts for '{}' from {}",
        profile.name,
        target.sysroot.display()
    );

    let generator = TftpGenerator::new(profile, &target.sysroot, out, tools);

    let bar = output
        .show_progress()
        .then(|| create_action_bar(profile.actions.len() as u64));
    let result = generator.run(|index, action| {
        if let Some(pb) = &bar {
            pb.set_position(index as u64);
            pb.set_message(action.label());
        }
    });

    match (&bar, &result) {
        (Some(pb), Ok(())) => pb.finish_and_clear(),
        (Some(pb), Err(_)) => pb.abandon(),
        (None, _) => {}
    }
    result?;

    if output.show_status() {
        println!(
            "{} Generated {} artifact(s) for {} in {}",
            status::SUCCESS,
            profile.actions.len(),
            profile.name,
            out.display()
        );
    }
    Ok(())
}
