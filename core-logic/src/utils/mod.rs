//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod account_manager;
pub(crate) mod logger;
pub(crate) mod proxy_manager;
pub(crate) mod shutdown;

pub use account_manager::AccountManager;
pub use logger::{setup_logger, setup_quiet_logger, DEFAULT_CONSOLE_FILTER, SESSION_TARGET};
pub use proxy_manager::ProxyManager;
pub use shutdown::ShutdownListener;
