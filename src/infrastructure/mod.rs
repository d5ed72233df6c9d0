//! External dependencies and I/O operations.

pub mod filesystem;
pub mod git;
pub mod logging;
pub mod network;
pub mod process;
