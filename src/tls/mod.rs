//! TLS context module
//!
//! This module owns the engine context handle and everything used to
//! configure it: protocol resolution, flag vocabularies, passphrase supply
//! and session statistics.

mod context;
mod engine;
pub mod flags;
mod password;
mod protocol;
mod stats;
pub mod tables;

pub use context::{ContextMode, TlsContext};
pub use engine::{engine_info, EngineInfo};
pub use flags::{FlagDomain, FlagTable, FlagToken, InvalidToken};
pub use password::PasswordStrategy;
pub use protocol::Protocol;
pub use stats::SessionStats;
pub use tables::{OPTION_FLAGS, SESSION_CACHE_FLAGS, VERIFY_CLIENT_ONCE, VERIFY_FLAGS};
