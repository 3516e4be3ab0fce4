//! # Core Logic - Shared Utilities for the Bot Workspace
//!
//! This crate provides the pieces every game bot in the workspace needs:
//! configuration types, account and proxy loading, payload encryption,
//! logging and shutdown handling.
//!
//! ## Modules
//!
//! - [`config`] - Proxy descriptor and account credential types
//! - [`error`] - Typed error handling with thiserror
//! - [`security`] - AES-256-CBC payload encryption
//! - [`traits`] - Transport, clock and sleeper seams
//! - [`utils`] - Account/proxy loaders, logger, shutdown listener

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod security;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{AccountCredential, ProxyAuth, ProxyConfig};
pub use error::{ConfigError, CoreError, EncodingError, NetworkError, ProtocolError};
pub use security::{EncryptedPayload, SecurityUtils};
pub use traits::{Clock, HttpTransport, Sleeper, SystemClock, TokioSleeper};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    setup_logger, setup_quiet_logger, AccountManager, ProxyManager, ShutdownListener,
    DEFAULT_CONSOLE_FILTER, SESSION_TARGET,
};
