use crate::kind::FrameKind;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The input buffer holds no bytes at all.
    #[error("empty frame")]
    Empty,

    /// The trailing checksum byte does not match the XOR-fold of the frame.
    #[error("checksum mismatch (computed {expected:#04x}, frame carries {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The checksum holds but the type tag is not one we know.
    #[error("unrecognized frame type {0:#04x}")]
    UnrecognizedType(u8),

    /// The buffer cannot even hold a header and checksum.
    #[error("truncated header ({len} bytes, need at least {min})")]
    HeaderTruncated { len: usize, min: usize },

    /// The buffer is shorter than the minimum for its declared type.
    #[error("truncated {kind} frame ({len} bytes, need at least {min})")]
    Truncated {
        kind: FrameKind,
        len: usize,
        min: usize,
    },

    /// The header's data length disagrees with the body bytes present.
    #[error("{kind} frame declares {declared} body bytes but carries {available}")]
    LengthMismatch {
        kind: FrameKind,
        declared: usize,
        available: usize,
    },

    /// A fixed-size body has the wrong length.
    #[error("{kind} body must be {expected} bytes, got {len}")]
    BodyLength {
        kind: FrameKind,
        len: usize,
        expected: usize,
    },

    /// A custom message does not fit in one frame.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
