// Public modules
pub mod config;
pub mod defaults;
pub mod deploy;
pub mod error;
pub mod git;
pub mod patch;
pub mod pipeline;
pub mod ssh;
pub mod wait;

// Re-export common types for convenience
pub use error::{Error, Result};
