use std::path::PathBuf;

/// Errors that can occur on a radio link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the local radio endpoint.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to hand a frame to the peer endpoint.
    #[error("failed to send to {path}: {source}")]
    Send {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The other end of an in-memory link is gone.
    #[error("link disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, TransportError>;
