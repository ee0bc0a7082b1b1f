//! Configuration types
//!
//! `ContextConfig` describes a whole context declaratively; `build()` turns
//! it into a configured [`TlsContext`].

use std::fmt;
use std::path::PathBuf;

use log::info;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

use crate::common::Result;
use crate::config::defaults;
use crate::tls::{FlagToken, TlsContext};

/// One entry of the `session_cache_mode` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheModeSetting {
    /// Flag name such as `"server"` or `"no_auto_clear"`
    Name(String),
    /// `true` for both sides, `false` for off
    Switch(bool),
}

impl CacheModeSetting {
    pub fn token(&self) -> FlagToken<'_> {
        match self {
            CacheModeSetting::Name(name) => FlagToken::Name(name),
            CacheModeSetting::Switch(on) => FlagToken::Switch(*on),
        }
    }
}

impl<'de> Deserialize<'de> for CacheModeSetting {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SettingVisitor;

        impl<'de> Visitor<'de> for SettingVisitor {
            type Value = CacheModeSetting;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a session cache mode name or a boolean")
            }

            fn visit_bool<E: de::Error>(self, on: bool) -> std::result::Result<Self::Value, E> {
                Ok(CacheModeSetting::Switch(on))
            }

            // Environment values arrive as strings
            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(match value {
                    "true" => CacheModeSetting::Switch(true),
                    "false" => CacheModeSetting::Switch(false),
                    name => CacheModeSetting::Name(name.to_string()),
                })
            }
        }

        deserializer.deserialize_any(SettingVisitor)
    }
}

/// Passphrase kept out of `Debug` output
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Declarative context configuration
///
/// Every field is optional except the protocol; absent fields leave the
/// engine defaults in place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// Protocol token passed to `TlsContext::create`
    pub protocol: String,

    /// "client" or "server"
    pub mode: Option<String>,

    /// PEM certificate chain, leaf first
    pub certificate: Option<PathBuf>,

    /// PEM private key
    pub key: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    pub password: Option<Secret>,

    /// PEM bundle of trusted CA certificates
    pub ca_file: Option<PathBuf>,

    /// Hashed directory of trusted CA certificates
    pub ca_path: Option<PathBuf>,

    /// Cipher list in engine syntax
    pub ciphers: Option<String>,

    /// Maximum certificate chain depth
    pub depth: Option<i32>,

    /// Verification flags
    pub verify: Vec<String>,

    /// Protocol options
    pub options: Vec<String>,

    /// Session timeout in seconds
    pub timeout: Option<i64>,

    /// Session id context
    pub session_id_context: Option<String>,

    /// Session cache mode flags
    pub session_cache_mode: Vec<CacheModeSetting>,

    /// Maximum number of cached sessions
    pub session_cache_size: Option<i64>,

    /// Log level used by the command line tools
    pub log_level: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            protocol: defaults::protocol(),
            mode: None,
            certificate: None,
            key: None,
            password: None,
            ca_file: None,
            ca_path: None,
            ciphers: None,
            depth: None,
            verify: Vec::new(),
            options: Vec::new(),
            timeout: None,
            session_id_context: None,
            session_cache_mode: Vec::new(),
            session_cache_size: None,
            log_level: defaults::log_level(),
        }
    }
}

impl ContextConfig {
    /// Create a fresh context and apply every configured setting.
    ///
    /// Settings are applied in a fixed order and the first failure is
    /// returned; the partially configured context is dropped.
    pub fn build(&self) -> Result<TlsContext> {
        let mut ctx = TlsContext::create(&self.protocol)?;

        if let Some(mode) = &self.mode {
            ctx.set_mode(mode)?;
        }
        if let Some(certificate) = &self.certificate {
            ctx.load_certificate_chain(certificate)?;
        }
        if let Some(key) = &self.key {
            let password = self.password.as_ref().map(|secret| secret.expose().to_string());
            ctx.load_private_key(key, password)?;
        }
        if self.ca_file.is_some() || self.ca_path.is_some() {
            ctx.load_trust_locations(self.ca_file.as_deref(), self.ca_path.as_deref())?;
        }

        ctx.set_verify_policy(&self.verify)?;
        ctx.set_protocol_options(&self.options)?;

        if let Some(depth) = self.depth {
            ctx.set_verify_depth(depth)?;
        }
        if let Some(ciphers) = &self.ciphers {
            ctx.set_cipher_list(ciphers)?;
        }
        if let Some(timeout) = self.timeout {
            ctx.set_timeout(timeout)?;
        }
        if let Some(sid_ctx) = &self.session_id_context {
            ctx.set_session_id_context(sid_ctx.as_bytes())?;
        }

        ctx.set_session_cache_mode(self.session_cache_mode.iter().map(CacheModeSetting::token))?;

        if let Some(size) = self.session_cache_size {
            ctx.set_session_cache_size(size)?;
        }

        info!("Built {} from configuration ({} mode)", ctx, ctx.mode());
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContextConfig::default();
        assert_eq!(config.protocol, "sslv23");
        assert_eq!(config.log_level, "info");
        assert!(config.verify.is_empty());
        assert!(config.password.is_none());
    }

    #[test]
    fn test_deserialize_cache_mode_entries() {
        let config: ContextConfig = serde_json::from_str(
            r#"{ "session_cache_mode": ["server", true, "false"] }"#,
        )
        .unwrap();

        assert_eq!(
            config.session_cache_mode,
            vec![
                CacheModeSetting::Name("server".into()),
                CacheModeSetting::Switch(true),
                CacheModeSetting::Switch(false),
            ]
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<ContextConfig>(r#"{ "listen": "0.0.0.0:443" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_password_hidden_from_debug() {
        let config = ContextConfig {
            password: Some(Secret::new("hunter2")),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_build_defaults() {
        let ctx = ContextConfig::default().build().unwrap();
        assert_eq!(ctx.protocol().as_str(), "sslv23");
        assert_eq!(ctx.mode(), crate::tls::ContextMode::Unset);
    }

    #[test]
    fn test_build_stops_at_first_error() {
        let config = ContextConfig {
            mode: Some("server".into()),
            verify: vec!["peer".into(), "bogus".into()],
            ..Default::default()
        };
        let err = config.build().unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }
}
