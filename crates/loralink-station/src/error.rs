/// Errors that can occur while running a station.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] loralink_frame::FrameError),

    /// Radio link error.
    #[error("transport error: {0}")]
    Transport(#[from] loralink_transport::TransportError),

    /// Every consumer (or every producer) of the command queue is gone.
    #[error("command queue closed")]
    QueueClosed,

    /// The command queue is at capacity (non-blocking push only).
    #[error("command queue full")]
    QueueFull,

    /// A shared-state lock was poisoned by a panicking role.
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    /// A role thread could not be started.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StationError>;
