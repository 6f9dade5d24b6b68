//! Core logic module
//!
//! This module contains the descriptor synthesis and the build driver.
//! Process and filesystem side effects go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`dts`] - Device tree source emitter
//! - [`fit`] - FIT image descriptor assembly
//! - [`action`] - Build actions and their execution
//! - [`profile`] - Board profiles and the profile table
//! - [`tftp`] - Runs a profile's actions into a TFTP directory

pub mod action;
pub mod dts;
pub mod fit;
pub mod profile;
pub mod tftp;
