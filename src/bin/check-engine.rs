//! Tool to check which protocols and flags the linked TLS engine supports

use std::process::exit;

use tls_context::binding::METHODS;
use tls_context::tls::{engine_info, OPTION_FLAGS, SESSION_CACHE_FLAGS, VERIFY_FLAGS};
use tls_context::{Protocol, TlsContext};

fn main() {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );

    println!("=== TLS Engine Check ===\n");

    let info = engine_info();
    println!("Engine version: {}", info.version);
    println!("Version number: {:#x}", info.number);

    println!("\nProtocols:");
    let mut available = 0;
    for protocol in Protocol::ALL {
        match TlsContext::with_protocol(protocol).and_then(|ctx| ctx.usable_ciphers()) {
            Ok(0) => println!("  [{:11}] {} (no usable ciphers)", "unavailable", protocol),
            Ok(ciphers) => {
                available += 1;
                println!("  [{:11}] {} ({} ciphers)", "available", protocol, ciphers);
            }
            Err(e) => println!("  [{:11}] {} ({})", "unavailable", protocol, e),
        }
    }

    println!("\nVerify flags:");
    for name in VERIFY_FLAGS.names() {
        println!("  - {}", name);
    }

    println!("\nProtocol options:");
    for name in OPTION_FLAGS.names() {
        println!("  - {}", name);
    }

    println!("\nSession cache modes (booleans accepted: {}):", SESSION_CACHE_FLAGS.accepts_switch());
    for name in SESSION_CACHE_FLAGS.names() {
        println!("  - {}", name);
    }

    println!("\nHost methods: {}", METHODS.join(", "));

    println!("\n=== Summary ===");
    if available == 0 {
        println!("No protocol could be initialized. Check the engine installation.");
        exit(1);
    }
    println!("{} of {} protocols available.", available, Protocol::ALL.len());
}
