use std::io;

use thiserror::Error;

/// Failures reported by the HTTP transport.
///
/// These never reach image consumers: the store collapses every failure to
/// "no image" plus a negative-cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// Failures constructing or maintaining the store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache directory unavailable: {0}")]
    CacheDir(String),
    #[error("no async runtime available: {0}")]
    Runtime(String),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
