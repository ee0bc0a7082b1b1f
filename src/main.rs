//! TLS Context Command Line Tool
//!
//! Builds a context from a configuration file, `TLSCTX_*` environment
//! variables and command line flags, then reports its state.

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use serde::Serialize;

use tls_context::common::{init_logger, ContextError, Result};
use tls_context::config::{ConfigLoader, ConfigValidator, ContextConfig, Secret};
use tls_context::{SessionStats, TlsContext, APP_NAME, VERSION};

/// TLS Context: build and inspect an OpenSSL context
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Load configuration from a JSON file instead of ./tlsctx.json
    #[clap(long)]
    config: Option<PathBuf>,

    /// Protocol (sslv3, tlsv1, tlsv1_1, tlsv1_2, tlsv1_3, sslv23)
    #[clap(long)]
    protocol: Option<String>,

    /// Context mode (client, server)
    #[clap(long)]
    mode: Option<String>,

    /// Certificate chain path (PEM)
    #[clap(long)]
    cert: Option<PathBuf>,

    /// Private key path (PEM)
    #[clap(long)]
    key: Option<PathBuf>,

    /// Private key passphrase
    #[clap(long)]
    password: Option<String>,

    /// CA bundle path (PEM)
    #[clap(long)]
    ca_file: Option<PathBuf>,

    /// CA directory path (hashed)
    #[clap(long)]
    ca_path: Option<PathBuf>,

    /// Cipher list
    #[clap(long)]
    ciphers: Option<String>,

    /// Verify flag; may be repeated (none, peer, client_once, fail_if_no_peer_cert)
    #[clap(long = "verify")]
    verify: Vec<String>,

    /// Protocol option; may be repeated (e.g. no_sslv3, no_compression)
    #[clap(long = "option")]
    options: Vec<String>,

    /// Log level
    #[clap(long)]
    log_level: Option<String>,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,
}

/// State reported after a successful build
#[derive(Debug, Serialize)]
struct Report {
    context: String,
    protocol: String,
    mode: String,
    verify_depth: i32,
    timeout: i64,
    session_cache_size: i64,
    stats: SessionStats,
}

impl Report {
    fn collect(ctx: &TlsContext) -> Result<Self> {
        Ok(Report {
            context: ctx.describe(),
            protocol: ctx.protocol().to_string(),
            mode: ctx.mode().to_string(),
            verify_depth: ctx.verify_depth()?,
            timeout: ctx.timeout()?,
            session_cache_size: ctx.session_cache_size()?,
            stats: ctx.stats()?,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ContextConfig::from_file(path)?,
        None => ContextConfig::auto_load()?,
    };
    apply_args(&mut config, &args);

    init_logger(&config.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);

    for warning in config.check() {
        warn!("{}", warning);
    }
    config.validate()?;

    let ctx = config.build()?;
    if config.certificate.is_some() && config.key.is_some() {
        ctx.check_private_key()?;
        info!("Private key matches certificate");
    }

    let report = Report::collect(&ctx)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| ContextError::Config(format!("Failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", report.context);
        println!("protocol: {}", report.protocol);
        println!("mode: {}", report.mode);
        println!("verify depth: {}", report.verify_depth);
        println!("session timeout: {}s", report.timeout);
        println!("session cache size: {}", report.session_cache_size);
        println!();
        print!("{}", report.stats);
    }

    Ok(())
}

/// Command line flags override file and environment values
fn apply_args(config: &mut ContextConfig, args: &Args) {
    if let Some(protocol) = &args.protocol {
        config.protocol = protocol.clone();
    }
    if let Some(mode) = &args.mode {
        config.mode = Some(mode.clone());
    }
    if let Some(cert) = &args.cert {
        config.certificate = Some(cert.clone());
    }
    if let Some(key) = &args.key {
        config.key = Some(key.clone());
    }
    if let Some(password) = &args.password {
        config.password = Some(Secret::new(password.as_str()));
    }
    if let Some(ca_file) = &args.ca_file {
        config.ca_file = Some(ca_file.clone());
    }
    if let Some(ca_path) = &args.ca_path {
        config.ca_path = Some(ca_path.clone());
    }
    if let Some(ciphers) = &args.ciphers {
        config.ciphers = Some(ciphers.clone());
    }
    if !args.verify.is_empty() {
        config.verify = args.verify.clone();
    }
    if !args.options.is_empty() {
        config.options = args.options.clone();
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone();
    }
}
