//! Infrastructure layer
//!
//! Handles I/O operations: filesystem and external processes.

pub mod filesystem;
pub mod initrd;
pub mod mkimage;
pub mod process;
