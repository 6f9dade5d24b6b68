//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod its;
pub mod profiles;
pub mod tftp;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::output::OutputConfig;
use crate::config::defaults::{DEFAULT_MKIMAGE, DEFAULT_PYTHON, DEFAULT_SYSROOT};
use crate::core::action::Tools;
use crate::core::profile::ProfileTable;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate contents of a TFTP directory suitable for network boot
    Tftp {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Print the FIT image tree source of a profile without packaging it
    Its {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the descriptor to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available profiles
    Profiles {
        #[command(flatten)]
        table: TableArgs,
    },
}

/// Profile table selection
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Load profiles from a TOML file instead of the built-in table
    #[arg(long, value_name = "FILE")]
    pub profiles: Option<PathBuf>,
}

impl TableArgs {
    /// Build the profile table once for this run
    pub fn load(&self) -> Result<ProfileTable> {
        match &self.profiles {
            Some(path) => ProfileTable::load(path)
                .with_context(|| format!("Failed to load profiles from {}", path.display())),
            None => Ok(ProfileTable::builtin()),
        }
    }
}

/// Board and sysroot selection
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Board or SoC that artifacts are generated for
    #[arg(short, long)]
    pub profile: String,

    /// Sysroot containing the pre-built binaries
    #[arg(long, default_value = DEFAULT_SYSROOT)]
    pub sysroot: PathBuf,

    #[command(flatten)]
    pub table: TableArgs,
}

/// External tool overrides
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// Interpreter used to run the initrd generator
    #[arg(long, env = "BOOT_ARTIFACTS_PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// U-Boot mkimage binary
    #[arg(long, env = "BOOT_ARTIFACTS_MKIMAGE", default_value = DEFAULT_MKIMAGE)]
    pub mkimage: String,
}

impl From<ToolArgs> for Tools {
    fn from(args: ToolArgs) -> Self {
        Self {
            python: args.python,
            mkimage: args.mkimage,
        }
    }
}

impl Commands {
    /// Execute the command
    pub fn run(self, output: &OutputConfig) -> Result<()> {
        match self {
            Self::Tftp { target, out, tools } => tftp::execute(&target, &out, tools.into(), output),
            Self::Its { target, output: path } => its::execute(&target, path.as_deref(), output),
            Self::Profiles { table } => profiles::execute(&table, output),
        }
    }
}
