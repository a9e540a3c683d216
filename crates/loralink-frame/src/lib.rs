//! Typed, checksummed frame codec for half-duplex radio links.
//!
//! Every frame carries:
//! - A 12-byte header: type tag, source id, destination id, big-endian
//!   transmission id, six timestamp bytes and the body length
//! - A type-specific body (GPS fix, predefined message id, or free text)
//! - A trailing XOR-fold checksum over every preceding byte
//!
//! Encoding never allocates more than the output buffer and decoding never
//! reads past the end of the input.

pub mod codec;
pub mod error;
pub mod kind;
pub mod session;
pub mod timestamp;

pub use codec::{
    checksum, classify, decode_custom, decode_frame, decode_gps, decode_header,
    decode_predefined, encode_custom, encode_custom_at, encode_gps, encode_gps_at,
    encode_predefined, encode_predefined_at, validate, Classification, CustomMessage, Frame,
    FrameBody, FrameHeader, GpsFix, PredefinedMessage, CHECKSUM_SIZE, HEADER_SIZE,
    MAX_CUSTOM_LEN, MAX_FRAME_SIZE, MIN_FRAME_SIZE,
};
pub use error::{FrameError, Result};
pub use kind::FrameKind;
pub use session::{DeviceIdentity, DeviceSession};
pub use timestamp::Timestamp;
