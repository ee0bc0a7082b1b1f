//! Configuration validator
//!
//! Runs every local check a context build would run, without allocating an
//! engine context.

use std::path::Path;
use std::str::FromStr;

use crate::common::{check_dir_exists, check_file_exists, ContextError, Result};
use crate::config::traits::ConfigValidator;
use crate::config::types::{CacheModeSetting, ContextConfig};
use crate::tls::{ContextMode, Protocol, OPTION_FLAGS, SESSION_CACHE_FLAGS, VERIFY_FLAGS};

impl ConfigValidator for ContextConfig {
    fn validate(&self) -> Result<()> {
        validate_tokens(self)?;
        validate_files(self)?;
        Ok(())
    }

    fn check(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => warnings.push(format!("Invalid log level '{}', using default 'info'", level)),
        }

        if matches!(self.protocol.as_str(), "sslv3" | "tlsv1" | "tlsv1_1") {
            warnings.push(format!(
                "Protocol '{}' is deprecated and may be disabled in the linked engine",
                self.protocol
            ));
        }

        if self.mode.as_deref() == Some("server") && self.certificate.is_none() {
            warnings.push("Server mode without a certificate".to_string());
        }

        if self.password.is_some() && self.key.is_none() {
            warnings.push("Password given without a private key".to_string());
        }

        if self.verify.len() > 1 && self.verify.iter().any(|flag| flag == "none") {
            warnings.push("Verify flag 'none' combined with other flags".to_string());
        }

        if !self.verify.iter().any(|flag| flag == "peer") && (self.ca_file.is_some() || self.ca_path.is_some()) {
            warnings.push("CA locations configured but peer verification is not enabled".to_string());
        }

        warnings
    }
}

/// Resolve every token the same way the context setters will.
fn validate_tokens(config: &ContextConfig) -> Result<()> {
    Protocol::from_str(&config.protocol)?;

    if let Some(mode) = &config.mode {
        ContextMode::from_str(mode)?;
    }

    VERIFY_FLAGS.aggregate(&config.verify)?;
    OPTION_FLAGS.aggregate(&config.options)?;
    SESSION_CACHE_FLAGS.aggregate(config.session_cache_mode.iter().map(CacheModeSetting::token))?;

    Ok(())
}

/// Check that every referenced file exists
fn validate_files(config: &ContextConfig) -> Result<()> {
    if config.key.is_some() && config.certificate.is_none() {
        return Err(ContextError::Config(
            "Private key configured without a certificate".to_string(),
        ));
    }

    validate_optional_file(config.certificate.as_deref(), "Certificate")?;
    validate_optional_file(config.key.as_deref(), "Private key")?;
    validate_optional_file(config.ca_file.as_deref(), "CA file")?;

    if let Some(dir) = config.ca_path.as_deref() {
        check_dir_exists(dir, "CA directory")?;
    }

    Ok(())
}

fn validate_optional_file(path: Option<&Path>, what: &str) -> Result<()> {
    match path {
        Some(path) => check_file_exists(path, what),
        None => Ok(()),
    }
}
