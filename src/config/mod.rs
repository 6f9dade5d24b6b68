//! Configuration and constants
//!
//! - [`defaults`] - Default values, file names and tool names

pub mod defaults;
