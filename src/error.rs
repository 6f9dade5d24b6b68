//! Error types for boot-artifacts
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
///
/// Detected before any external process is spawned or any output is written.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Profile not found in the profile table
    #[error("Unknown profile '{name}'. Available profiles: {}", available.join(", "))]
    UnknownProfile {
        name: String,
        available: Vec<String>,
    },

    /// Two profiles share the same name
    #[error("Profile '{name}' is defined more than once")]
    DuplicateProfile { name: String },

    /// Architecture has no FIT architecture tag
    #[error("Unsupported architecture '{arch}' for FIT images (supported: {})", supported.join(", "))]
    UnsupportedArch { arch: String, supported: Vec<String> },

    /// Profile has no FIT image action
    #[error("Profile '{profile}' does not build a FIT image")]
    NoFitImage { profile: String },

    /// Required external tool is missing
    #[error("Required tool '{tool}' is not installed or not in PATH")]
    ToolNotFound { tool: String },

    /// Profile file could not be parsed
    #[error("Failed to parse profiles from '{path}': {error}")]
    ParseError { path: PathBuf, error: String },
}

/// FIT descriptor contract violations
///
/// These indicate a malformed image set and are raised before any descriptor
/// text reaches the packaging tool.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FitError {
    /// Two image entries derive the same identifying name
    #[error("Image name '{name}' is declared more than once")]
    DuplicateImage { name: String },

    /// Image name cannot be used as a device tree node name
    #[error("Image name '{name}' is not a valid device tree node name")]
    InvalidNodeName { name: String },

    /// Path has no usable base filename
    #[error("Cannot derive an image name from '{path}'")]
    NoFileName { path: PathBuf },

    /// Configuration references an image that was never declared
    #[error("Configuration '{config}' references undeclared image '{name}' for '{role}'")]
    UndeclaredImage {
        config: String,
        role: String,
        name: String,
    },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Process could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Process exited with a non-zero status
    #[error("'{program}' failed with {status}{}", format_stderr(stderr))]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to resolve a path
    #[error("Failed to resolve path '{path}': {error}")]
    Canonicalize { path: PathBuf, error: String },

    /// Failed to create a temporary directory
    #[error("Failed to create temporary directory: {error}")]
    TempDir { error: String },
}

/// Top-level boot-artifacts error type
#[derive(Error, Debug)]
pub enum BootError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// FIT descriptor error
    #[error("FIT descriptor error: {0}")]
    Fit(#[from] FitError),

    /// External process error
    #[error("External process error: {0}")]
    Process(#[from] ProcessError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// A build action failed
    #[error("Action '{action}' failed")]
    Action {
        action: String,
        #[source]
        source: Box<BootError>,
    },
}

impl BootError {
    /// Attach the failing action's label to an error
    pub fn in_action(self, action: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            source: Box::new(self),
        }
    }
}

/// Result alias used throughout the library
pub type Result<T, E = BootError> = std::result::Result<T, E>;
