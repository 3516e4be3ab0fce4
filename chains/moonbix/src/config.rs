//! Configuration loader for the moonbix bot

use core_logic::ConfigError;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/115.0.0.0 Safari/537.36";

/// Configuration for the moonbix bot
///
/// Every field has a default, so the TOML file is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoonbixConfig {
    /// Root of the growth-paas API
    pub base_url: String,
    /// Game resource requested on start/complete
    pub resource_id: u32,
    /// Target span of the synthetic trace in milliseconds
    pub game_duration_ms: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Fixed pause after each account in milliseconds
    pub inter_account_pause_ms: u64,
    /// Extra random pause added on top of `inter_account_pause_ms`
    pub inter_account_jitter_ms: u64,
    /// Pause between full passes over the account list
    pub cycle_pause_secs: u64,
    /// Pick a random User-Agent from `user_agents` for every account
    pub randomize_user_agent: bool,
    pub user_agents: Vec<String>,
}

impl Default for MoonbixConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.binance.com/bapi/growth/v1/friendly/growth-paas".to_string(),
            resource_id: 2056,
            game_duration_ms: 45_000,
            request_timeout_secs: 10,
            inter_account_pause_ms: 1_000,
            inter_account_jitter_ms: 0,
            cycle_pause_secs: 86_400,
            randomize_user_agent: false,
            user_agents: default_user_agents(),
        }
    }
}

fn default_user_agents() -> Vec<String> {
    [
        DEFAULT_USER_AGENT,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 Chrome/114.0.0.0 Mobile Safari/537.36",
    ]
    .iter()
    .map(|ua| ua.to_string())
    .collect()
}

impl MoonbixConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse or validate is an error.
    ///
    /// # Example
    /// ```ignore
    /// let config = MoonbixConfig::from_path("config/config.toml")?;
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            info!("{} not found, using built-in defaults", path_str);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path_str.clone(),
            msg: e.to_string(),
        })?;
        Self::from_toml(&content, &path_str)
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_duration_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "game_duration_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "base_url".to_string(),
            });
        }
        if self.randomize_user_agent && self.user_agents.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agents".to_string(),
                reason: "randomize_user_agent needs at least one entry".to_string(),
            });
        }
        Ok(())
    }

    pub fn access_token_url(&self) -> String {
        format!("{}/third-party/access/accessToken", self.base_url.trim_end_matches('/'))
    }

    pub fn game_start_url(&self) -> String {
        format!(
            "{}/mini-app-activity/third-party/game/start",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn game_complete_url(&self) -> String {
        format!(
            "{}/mini-app-activity/third-party/game/complete",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_secs(self.cycle_pause_secs)
    }

    /// Fixed pause plus up to `inter_account_jitter_ms` of random slack
    pub fn inter_account_pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = if self.inter_account_jitter_ms > 0 {
            rng.gen_range(0..=self.inter_account_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.inter_account_pause_ms + jitter)
    }

    /// User-Agent for the next client: fixed unless rotation is enabled
    pub fn pick_user_agent<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        if self.randomize_user_agent && !self.user_agents.is_empty() {
            let idx = rng.gen_range(0..self.user_agents.len());
            &self.user_agents[idx]
        } else {
            DEFAULT_USER_AGENT
        }
    }
}
