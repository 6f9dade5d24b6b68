//! Profiles command implementation
//!
//! Implements `boot-artifacts profiles` to list the known boards.

use anyhow::Result;

use super::TableArgs;
use crate::cli::output::OutputConfig;

/// Execute the profiles command
pub fn execute(table: &TableArgs, output: &OutputConfig) -> Result<()> {
    let table = table.load()?;

    if output.json {
        let profiles: Vec<_> = table.iter().collect();
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!("Available profiles:");
    println!();
    for profile in table.iter() {
        println!("  {} ({})", profile.name, profile.arch);
        for action in &profile.actions {
            println!("    {}", action.label());
        }
        println!();
    }
    println!("{} profile(s) available.", table.iter().count());

    Ok(())
}
