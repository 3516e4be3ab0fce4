//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Network(NetworkError),

    #[error(transparent)]
    Protocol(ProtocolError),

    #[error(transparent)]
    Encoding(EncodingError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

impl From<ProtocolError> for CoreError {
    fn from(e: ProtocolError) -> Self {
        CoreError::Protocol(e)
    }
}

impl From<EncodingError> for CoreError {
    fn from(e: EncodingError) -> Self {
        CoreError::Encoding(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Parse error in {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("No accounts found in {path}")]
    NoAccounts { path: String },

    #[error("Proxy requested but no proxy is configured")]
    ProxyNotConfigured,
}

/// Transport-level errors (network, timeout, DNS, non-2xx status)
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

/// Application-level protocol errors: the server answered, but not with what we need.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("{step}: response is missing '{field}'")]
    MissingField { step: String, field: String },

    #[error("{step}: unexpected response code {code:?}")]
    UnexpectedCode { step: String, code: Option<String> },
}

/// Payload encryption/encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("Cipher failure: {reason}")]
    CipherFailed { reason: String },
}
