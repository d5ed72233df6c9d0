pub mod client;
pub mod command;

// Re-export main types for convenience
pub use client::{GitClient, SystemGitClient};
pub use command::GitCommand;
