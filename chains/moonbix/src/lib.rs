//! Moonbix - session bot for the Binance Moonbix mini-game
//!
//! Plays one game per account per cycle over a list of Telegram query-string
//! credentials, optionally through a proxy, then waits for the next cycle.
//!
//! # Architecture
//!
//! - **[`ReqwestProvider`]**: builds reqwest clients with the browser header set,
//!   a 10 s timeout and an optional proxy
//! - **[`TraceGenerator`]**: synthetic gameplay input events
//! - **[`payload::encode`]**: serializes a trace and AES-256-CBC encrypts it under
//!   the session's game tag
//! - **[`SessionDriver`]**: the accessToken → game/start → simulate → game/complete
//!   state machine for one account
//! - **[`Scheduler`]**: walks the account list, paces requests and repeats every
//!   24 hours
//!
//! # Quick Start
//!
//! ```bash
//! # Put one query string per line in data.txt, then
//! cargo run -p moonbix --bin moonbix
//! ```
//!
//! # Configuration
//!
//! Timing and endpoint settings are read from `config/config.toml` (optional,
//! see [`MoonbixConfig`]); the proxy descriptor from `config/config.json`.

pub mod client;
pub mod config;
pub mod payload;
pub mod scheduler;
pub mod session;
pub mod trace;

pub use client::{BrowserHeaders, ReqwestProvider, ReqwestTransport, TransportProvider};
pub use config::MoonbixConfig;
pub use scheduler::{CycleStats, Scheduler};
pub use session::{SessionDriver, SessionState, SessionStep};
pub use trace::{ActivityEvent, Trace, TraceGenerator};
