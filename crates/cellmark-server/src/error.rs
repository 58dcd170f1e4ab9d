//! Startup errors for the server binary.

use cellmark_core::ConfigError;
use cellmark_core::storage::StorageError;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid CELLMARK_BIND: {0}")]
    InvalidBind(#[from] AddrParseError),
    #[error("Failed to read class file {}: {source}", path.display())]
    ReadClasses {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid class file {}: {source}", path.display())]
    InvalidClasses {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
