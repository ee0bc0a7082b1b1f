//! Configuration tests
//!
//! Every test here reads `TLSCTX_*` variables, so they run serially.

mod support;

use std::env;
use std::fs;

use openssl::ssl::{SslOptions, SslSessionCacheMode, SslVerifyMode};
use serial_test::serial;

use tls_context::config::{CacheModeSetting, ConfigLoader, ConfigValidator, ContextConfig};
use tls_context::{ContextError, ContextMode};

const VARS: [&str; 4] = [
    "TLSCTX_SESSION_CACHE_SIZE",
    "TLSCTX_VERIFY",
    "TLSCTX_SESSION_CACHE_MODE",
    "TLSCTX_MODE",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_config(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("tlsctx.json");
    fs::write(&path, content).expect("Failed to write test config file");
    path
}

#[test]
#[serial]
fn test_file_config_builds_context() {
    clear_env();
    let material = support::material();
    let content = format!(
        r#"{{
            "protocol": "sslv23",
            "mode": "server",
            "certificate": "{cert}",
            "key": "{key}",
            "password": "{password}",
            "ca_file": "{cert}",
            "ciphers": "HIGH:!aNULL",
            "depth": 4,
            "verify": ["peer", "fail_if_no_peer_cert"],
            "options": ["no_sslv3", "no_compression"],
            "timeout": 120,
            "session_id_context": "config-test",
            "session_cache_mode": ["server", "no_auto_clear"],
            "session_cache_size": 64
        }}"#,
        cert = material.cert.display(),
        key = material.encrypted_key.display(),
        password = support::PASSPHRASE,
    );
    let path = write_config(material.dir.path(), &content);

    let config = ContextConfig::from_file(&path).unwrap();
    config.validate().unwrap();
    let ctx = config.build().unwrap();

    assert_eq!(ctx.mode(), ContextMode::Server);
    assert_eq!(ctx.verify_policy(), SslVerifyMode::PEER | SslVerifyMode::FAIL_IF_NO_PEER_CERT);
    assert!(ctx.options().unwrap().contains(SslOptions::NO_SSLV3 | SslOptions::NO_COMPRESSION));
    assert_eq!(ctx.verify_depth().unwrap(), 4);
    assert_eq!(ctx.timeout().unwrap(), 120);
    assert_eq!(
        ctx.session_cache_mode().unwrap(),
        SslSessionCacheMode::SERVER | SslSessionCacheMode::NO_AUTO_CLEAR
    );
    assert_eq!(ctx.session_cache_size().unwrap(), 64);
    ctx.check_private_key().unwrap();
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"{ "mode": "client", "session_cache_size": 10, "verify": ["none"] }"#,
    );

    env::set_var("TLSCTX_SESSION_CACHE_SIZE", "256");
    env::set_var("TLSCTX_VERIFY", "peer,client_once");
    env::set_var("TLSCTX_SESSION_CACHE_MODE", "client,no_internal");
    let config = ContextConfig::from_file(&path);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.mode.as_deref(), Some("client"));
    assert_eq!(config.session_cache_size, Some(256));
    assert_eq!(config.verify, vec!["peer".to_string(), "client_once".to_string()]);
    assert_eq!(
        config.session_cache_mode,
        vec![
            CacheModeSetting::Name("client".into()),
            CacheModeSetting::Name("no_internal".into()),
        ]
    );
}

#[test]
#[serial]
fn test_auto_load_without_file_uses_defaults() {
    clear_env();
    env::set_var("TLSCTX_MODE", "server");
    let config = ContextConfig::auto_load();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.protocol, "sslv23");
    assert_eq!(config.mode.as_deref(), Some("server"));
    assert!(config.certificate.is_none());
}

#[test]
#[serial]
fn test_unknown_field_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), r#"{ "listen": "0.0.0.0:8443" }"#);

    let err = ContextConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ContextError::Config(_)));
}

#[test]
#[serial]
fn test_invalid_json_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "{ not json");

    assert!(ContextConfig::from_file(&path).is_err());
}

#[test]
#[serial]
fn test_validation_catches_bad_tokens_before_build() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), r#"{ "verify": ["peer", "sometimes"] }"#);

    let config = ContextConfig::from_file(&path).unwrap();
    match config.validate() {
        Err(ContextError::InvalidVerifyOption { token, position }) => {
            assert_eq!(token, "sometimes");
            assert_eq!(position, 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
#[serial]
fn test_validation_catches_missing_files() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.crt");
    let config = ContextConfig {
        certificate: Some(missing),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Certificate not found"));
}
