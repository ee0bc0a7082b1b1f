//! Configuration module
//!
//! This module handles declarative context configuration, including loading
//! from different sources (files, environment variables) and validating the
//! configuration before a context is built from it.
//!
//! # Example
//!
//! ```no_run
//! use tls_context::config::{ConfigLoader, ConfigValidator, ContextConfig};
//!
//! # fn main() -> tls_context::Result<()> {
//! let config = ContextConfig::from_file("tlsctx.json")?;
//! config.validate()?;
//! for warning in config.check() {
//!     eprintln!("warning: {}", warning);
//! }
//! let ctx = config.build()?;
//! # drop(ctx);
//! # Ok(())
//! # }
//! ```

pub mod defaults;
mod loader;
mod traits;
mod types;
mod validator;

pub use traits::{ConfigLoader, ConfigValidator};
pub use types::{CacheModeSetting, ContextConfig, Secret};
