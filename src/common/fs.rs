//! File system helpers
//!
//! Used by configuration validation to report missing certificate, key and
//! trust material before the engine is asked to load it.

use std::path::Path;

use super::error::{ContextError, Result};

/// Check that `path` exists and is a regular file
///
/// `what` names the material in the error message.
pub fn check_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(ContextError::Config(format!(
            "{} not found: {}",
            what,
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(ContextError::Config(format!(
            "{} is not a file: {}",
            what,
            path.display()
        )));
    }

    Ok(())
}

/// Check that `path` exists and is a directory
pub fn check_dir_exists(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(ContextError::Config(format!(
            "{} is not a directory: {}",
            what,
            path.display()
        )));
    }

    Ok(())
}
