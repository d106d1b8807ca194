use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("stored value is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage is unavailable")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error("packet encoding failed: {0}")]
    Encode(#[from] bincode::Error),

    #[error("no reply from {addr} after {attempts} attempts")]
    Unreachable { addr: SocketAddr, attempts: u32 },

    #[error("intent queue is closed")]
    Closed,
}
