//! Logging helpers
//!
//! Thin wrapper over `env_logger`; `RUST_LOG` wins over the level passed in.

/// Initialize the logging system
///
/// # Parameters
///
/// * `level` - Default log level when `RUST_LOG` is not set
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests, embedding hosts) is not an error
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice() {
        init_logger("debug");
        init_logger("info");
    }
}
