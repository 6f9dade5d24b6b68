//! boot-artifacts - Board boot artifact generator
//!
//! This library assembles the files a board needs to boot over the network
//! from a pre-built sysroot: copied firmware and kernels, generated initrds,
//! and FIT images packaged by U-Boot's `mkimage` from a synthesized image tree
//! source.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Descriptor synthesis, profiles and actions
//! - [`infra`] - Infrastructure layer (filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
