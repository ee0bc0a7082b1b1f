//! Configuration loader implementation
//!
//! Sources are layered with the `config` crate: serde defaults, then a JSON
//! file, then `TLSCTX_*` environment variables.

use std::path::Path;

use config::{Config, Environment, File, FileFormat, Source};
use log::debug;

use crate::common::{check_file_exists, ContextError, Result};
use crate::config::defaults;
use crate::config::traits::ConfigLoader;
use crate::config::types::ContextConfig;

impl ConfigLoader for ContextConfig {
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_file_exists(path, "Configuration file")?;

        let config = load_layers(File::from(path).format(FileFormat::Json).required(true))?;
        debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    fn auto_load() -> Result<Self> {
        let path = Path::new(defaults::DEFAULT_CONFIG_FILE);
        let config = load_layers(File::from(path).format(FileFormat::Json).required(false))?;

        if path.exists() {
            debug!("Configuration loaded from {}", path.display());
        } else {
            debug!("No {} found, using defaults and environment", path.display());
        }
        Ok(config)
    }
}

/// Environment source: `TLSCTX_SESSION_CACHE_SIZE=64`, `TLSCTX_VERIFY=peer,client_once`
fn environment() -> Environment {
    defaults::LIST_KEYS.iter().fold(
        Environment::with_prefix(defaults::ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

fn load_layers<S>(file: S) -> Result<ContextConfig>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder()
        .add_source(file)
        .add_source(environment())
        .build()
        .and_then(|cfg| cfg.try_deserialize::<ContextConfig>())
        .map_err(|e| ContextError::Config(format!("Failed to load configuration: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ContextConfig::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ContextError::Config(_)));
    }
}
