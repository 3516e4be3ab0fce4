use crate::config::AccountCredential;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Holds the account list read once at startup.
pub struct AccountManager {
    source: PathBuf,
    accounts: Vec<AccountCredential>,
}

impl AccountManager {
    pub const ACCOUNTS_FILE: &'static str = "data.txt";

    /// Reads a newline-delimited list of query strings.
    ///
    /// A missing, unreadable or empty file is fatal: there is nothing to schedule.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: path_str });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path_str.clone(),
            msg: e.to_string(),
        })?;

        let accounts = Self::parse(&content);
        if accounts.is_empty() {
            return Err(ConfigError::NoAccounts { path: path_str });
        }

        info!("Loaded {} accounts from {}", accounts.len(), path_str);
        Ok(Self {
            source: path.to_path_buf(),
            accounts,
        })
    }

    /// One credential per non-blank line, file order preserved.
    pub fn parse(content: &str) -> Vec<AccountCredential> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(AccountCredential::new)
            .collect()
    }

    pub fn accounts(&self) -> &[AccountCredential] {
        &self.accounts
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
