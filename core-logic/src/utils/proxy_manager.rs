use crate::config::ProxyConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

pub struct ProxyManager;

impl ProxyManager {
    pub const PROXY_FILE: &'static str = "config/config.json";

    /// Loads the proxy descriptor from a JSON file.
    ///
    /// Never fails: a missing, unreadable or malformed file degrades to a
    /// disabled descriptor so the bot can still run unproxied.
    pub fn load(path: impl AsRef<Path>) -> ProxyConfig {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxy.", path.display());
            return ProxyConfig::disabled();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Proxy configuration load failed ({}): {}", path.display(), e);
                return ProxyConfig::disabled();
            }
        };

        match Self::parse(&content) {
            Ok(config) => {
                if config.is_enabled() {
                    info!("Loaded proxy {} from {}", config.base_url(), path.display());
                }
                config
            }
            Err(reason) => {
                error!("Proxy configuration load failed ({}): {}", path.display(), reason);
                ProxyConfig::disabled()
            }
        }
    }

    pub fn parse(content: &str) -> Result<ProxyConfig, String> {
        let config: ProxyConfig = serde_json::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Combines the operator's answer with the loaded descriptor.
    ///
    /// Returns the proxy to dial, `None` for a direct connection, or
    /// [`ConfigError::ProxyNotConfigured`] when a proxy was explicitly asked for
    /// but none is enabled.
    pub fn resolve(requested: bool, config: &ProxyConfig) -> Result<Option<ProxyConfig>, ConfigError> {
        match (requested, config.is_enabled()) {
            (true, true) => Ok(Some(config.clone())),
            (true, false) => Err(ConfigError::ProxyNotConfigured),
            (false, _) => Ok(None),
        }
    }
}
