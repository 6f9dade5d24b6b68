//! External process execution
//!
//! Runs helper tools synchronously. Output is captured: stdout is logged at
//! debug level and stderr is attached to the error when the tool fails.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{ConfigError, ProcessError};

/// Locate a tool in PATH (or accept an explicit path to it)
pub fn find_tool(tool: &str) -> Result<PathBuf, ConfigError> {
    which::which(tool).map_err(|_| ConfigError::ToolNotFound {
        tool: tool.to_string(),
    })
}

/// Render a command line for logging
pub fn command_line(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().to_string();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Run a command to completion, failing on a non-zero exit status
pub fn run(cmd: &mut Command) -> Result<(), ProcessError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    tracing::debug!("Running: {}", command_line(cmd));

    let output = cmd.output().map_err(|e| ProcessError::Spawn {
        program: program.clone(),
        error: e.to_string(),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        tracing::debug!("[{program}] {line}");
    }

    if !output.status.success() {
        return Err(ProcessError::Failed {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        tracing::debug!("[{program}] {line}");
    }

    Ok(())
}
