//! Default configuration values
//!
//! Single source of truth for defaults used by the loader, the CLI and
//! `ContextConfig::default()`.

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "TLSCTX";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "tlsctx.json";

/// Default protocol token
pub const PROTOCOL_STR: &str = "sslv23";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Keys whose environment values are comma separated lists
pub const LIST_KEYS: [&str; 3] = ["verify", "options", "session_cache_mode"];

/// Default protocol
pub fn protocol() -> String {
    PROTOCOL_STR.to_string()
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}
