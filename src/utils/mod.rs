//! Shared utilities
//!
//! Timing and logging helpers.

pub mod logger;
pub mod timer;

pub use logger::{init_logger, LogLevel};
