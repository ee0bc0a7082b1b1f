//! Configuration traits

use std::path::Path;

use crate::common::Result;

/// Trait for loading configuration
pub trait ConfigLoader {
    /// Load configuration from a JSON file, layered under `TLSCTX_*`
    /// environment variables. The file must exist.
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized;

    /// Load configuration with proper priority:
    /// 1. Default values (lowest priority)
    /// 2. Configuration file (`tlsctx.json` in the working directory, if present)
    /// 3. Environment variables
    fn auto_load() -> Result<Self>
    where
        Self: Sized;
}

/// Trait for validating configuration
pub trait ConfigValidator {
    /// Reject configurations that cannot produce a context: unknown tokens,
    /// missing files, a key without a certificate.
    fn validate(&self) -> Result<()>;

    /// Potential issues that do not prevent building a context.
    fn check(&self) -> Vec<String>;
}
