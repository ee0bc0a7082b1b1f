//! Common module
//!
//! This module contains shared errors and utility functions used throughout the crate.

pub mod error;
pub mod fs;
pub mod log;

// Re-export commonly used types and functions
pub use error::{ContextError, Result};
pub use fs::{check_dir_exists, check_file_exists};
pub use log::init_logger;
