//! TLS Context: configuration and lifecycle manager for OpenSSL contexts
//!
//! This library wraps the engine's native TLS context in a handle that can
//! be configured step by step before it is handed to a handshake layer.
//!
//! # Main Features
//!
//! - Context creation per protocol token (`sslv23`, `tlsv1_2`, ...)
//! - Certificate chain, private key and CA trust loading
//! - Static or on-demand passphrases for encrypted keys
//! - Verification, protocol option and session cache flags from textual tokens
//! - Session cache sizing, timeouts and statistics
//! - Declarative configuration from JSON files and `TLSCTX_*` variables
//! - A dynamically typed binding surface for embedding hosts
//!
//! # Example
//!
//! ```no_run
//! use tls_context::{TlsContext, PasswordStrategy, Result};
//!
//! fn main() -> Result<()> {
//!     let mut ctx = TlsContext::create("sslv23")?;
//!     ctx.set_mode("server")?;
//!     ctx.load_certificate_chain("certs/server.crt")?;
//!     ctx.load_private_key("certs/server.key", PasswordStrategy::on_demand(|| {
//!         std::env::var("KEY_PASSPHRASE").ok()
//!     }))?;
//!     ctx.set_verify_policy(["peer", "fail_if_no_peer_cert"])?;
//!     ctx.set_protocol_options(["all", "no_sslv3"])?;
//!     ctx.set_session_cache_mode([true])?;
//!     ctx.set_session_cache_size(1024)?;
//!
//!     println!("{}", ctx.describe());
//!     println!("{}", ctx.stats()?);
//!     Ok(())
//! }
//! ```

// Public modules
pub mod binding;
pub mod common;
pub mod config;
pub mod tls;

// Re-export commonly used structures and functions for convenience
pub use common::{ContextError, Result};
pub use config::ContextConfig;
pub use tls::{ContextMode, PasswordStrategy, Protocol, SessionStats, TlsContext};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
