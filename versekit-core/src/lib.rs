//! VerseKit Core - Shared error, configuration, and logging infrastructure
//!
//! Every other versekit crate builds on the types defined here

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
