use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::kind::FrameKind;
use crate::session::DeviceSession;
use crate::timestamp::{Timestamp, TIMESTAMP_SIZE};

/// Frame header: type (1) + source (1) + destination (1) + transmission id (2)
/// + timestamp (6) + data length (1) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Trailing XOR checksum.
pub const CHECKSUM_SIZE: usize = 1;

/// Header plus checksum, i.e. a frame with an empty body.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest frame the radio will carry.
pub const MAX_FRAME_SIZE: usize = 100;

/// Largest custom message body.
pub const MAX_CUSTOM_LEN: usize = MAX_FRAME_SIZE - 14;

const DATA_LENGTH_OFFSET: usize = 11;

/// Fields shared by every frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub source_id: u8,
    pub destination_id: u8,
    pub transmission_id: u16,
    pub timestamp: Timestamp,
    pub data_length: u8,
}

/// GPS frame body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub longitude: f32,
    pub latitude: f32,
}

/// Predefined message frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredefinedMessage {
    /// Zero-based catalog index.
    pub msg_id: u8,
}

/// Custom message frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMessage {
    pub text: String,
}

/// Decoded body, tagged by frame kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBody {
    Gps(GpsFix),
    Predefined(PredefinedMessage),
    Custom(CustomMessage),
}

/// A fully decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub body: FrameBody,
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self.body {
            FrameBody::Gps(_) => FrameKind::Gps,
            FrameBody::Predefined(_) => FrameKind::Predefined,
            FrameBody::Custom(_) => FrameKind::Custom,
        }
    }

    /// The total wire size of this frame (header + body + checksum).
    pub fn wire_size(&self) -> usize {
        MIN_FRAME_SIZE + usize::from(self.header.data_length)
    }
}

/// Outcome of checking a received buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Checksum holds and the tag is a known kind.
    Frame(FrameKind),
    /// Checksum holds but the tag is not a known kind.
    Unrecognized(u8),
    /// Empty buffer or checksum mismatch.
    Corrupt,
}

/// XOR-fold of every byte in `data`.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Encode a GPS frame stamped with the current wall-clock time.
pub fn encode_gps(session: &DeviceSession, longitude: f32, latitude: f32) -> Bytes {
    encode_gps_at(session, Timestamp::now(), longitude, latitude)
}

/// Encode a GPS frame with an explicit timestamp.
///
/// Wire format:
/// ```text
/// ┌────────────────────────┬────────────────┬────────────────┬──────────┐
/// │ Header (12B)           │ Longitude      │ Latitude       │ Checksum │
/// │ type=0x01, len=8       │ (4B f32 LE)    │ (4B f32 LE)    │ (1B XOR) │
/// └────────────────────────┴────────────────┴────────────────┴──────────┘
/// ```
pub fn encode_gps_at(
    session: &DeviceSession,
    timestamp: Timestamp,
    longitude: f32,
    latitude: f32,
) -> Bytes {
    let mut dst = start_frame(FrameKind::Gps, session, timestamp, 8);
    dst.put_f32_le(longitude);
    dst.put_f32_le(latitude);
    seal(dst)
}

/// Encode a predefined message frame stamped with the current time.
pub fn encode_predefined(session: &DeviceSession, msg_id: u8) -> Bytes {
    encode_predefined_at(session, Timestamp::now(), msg_id)
}

/// Encode a predefined message frame with an explicit timestamp.
pub fn encode_predefined_at(session: &DeviceSession, timestamp: Timestamp, msg_id: u8) -> Bytes {
    let mut dst = start_frame(FrameKind::Predefined, session, timestamp, 1);
    dst.put_u8(msg_id);
    seal(dst)
}

/// Encode a custom message frame stamped with the current time.
///
/// Fails with [`FrameError::MessageTooLarge`] when `text` exceeds
/// [`MAX_CUSTOM_LEN`] bytes. An empty text is a valid frame.
pub fn encode_custom(session: &DeviceSession, text: &str) -> Result<Bytes> {
    encode_custom_at(session, Timestamp::now(), text)
}

/// Encode a custom message frame with an explicit timestamp.
pub fn encode_custom_at(
    session: &DeviceSession,
    timestamp: Timestamp,
    text: &str,
) -> Result<Bytes> {
    let body = text.as_bytes();
    if body.len() > MAX_CUSTOM_LEN {
        return Err(FrameError::MessageTooLarge {
            size: body.len(),
            max: MAX_CUSTOM_LEN,
        });
    }
    let mut dst = start_frame(FrameKind::Custom, session, timestamp, body.len());
    dst.put_slice(body);
    Ok(seal(dst))
}

fn start_frame(
    kind: FrameKind,
    session: &DeviceSession,
    timestamp: Timestamp,
    data_length: usize,
) -> BytesMut {
    let mut dst = BytesMut::with_capacity(HEADER_SIZE + data_length + CHECKSUM_SIZE);
    dst.put_u8(kind.tag());
    dst.put_u8(session.source_id());
    dst.put_u8(session.destination_id());
    dst.put_u16(session.transmission_id());
    dst.put_slice(&timestamp.to_bytes());
    // Callers keep bodies within MAX_CUSTOM_LEN, well under 256.
    dst.put_u8(data_length as u8);
    dst
}

fn seal(mut dst: BytesMut) -> Bytes {
    let sum = checksum(&dst);
    dst.put_u8(sum);
    dst.freeze()
}

/// Check the trailing checksum and the type tag.
pub fn validate(bytes: &[u8]) -> Result<FrameKind> {
    let Some((&actual, covered)) = bytes.split_last() else {
        return Err(FrameError::Empty);
    };
    let expected = checksum(covered);
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }
    FrameKind::from_tag(bytes[0]).ok_or(FrameError::UnrecognizedType(bytes[0]))
}

/// Classify a received buffer.
///
/// Empty input and checksum mismatch share the [`Classification::Corrupt`]
/// outcome; use [`validate`] to tell them apart.
pub fn classify(bytes: &[u8]) -> Classification {
    match validate(bytes) {
        Ok(kind) => Classification::Frame(kind),
        Err(FrameError::UnrecognizedType(tag)) => Classification::Unrecognized(tag),
        Err(_) => Classification::Corrupt,
    }
}

/// Read the common header. Expects a buffer already checked with [`classify`].
pub fn decode_header(bytes: &[u8]) -> Result<FrameHeader> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(FrameError::HeaderTruncated {
            len: bytes.len(),
            min: MIN_FRAME_SIZE,
        });
    }

    let mut src = &bytes[1..HEADER_SIZE];
    let source_id = src.get_u8();
    let destination_id = src.get_u8();
    let transmission_id = src.get_u16();
    let mut timestamp = [0u8; TIMESTAMP_SIZE];
    src.copy_to_slice(&mut timestamp);
    let data_length = src.get_u8();

    Ok(FrameHeader {
        source_id,
        destination_id,
        transmission_id,
        timestamp: Timestamp::from_bytes(timestamp),
        data_length,
    })
}

/// Read a GPS body. Rejects buffers too short for a GPS frame.
pub fn decode_gps(bytes: &[u8]) -> Result<GpsFix> {
    let mut body = body(bytes, FrameKind::Gps)?;
    Ok(GpsFix {
        longitude: body.get_f32_le(),
        latitude: body.get_f32_le(),
    })
}

/// Read a predefined message body.
pub fn decode_predefined(bytes: &[u8]) -> Result<PredefinedMessage> {
    let body = body(bytes, FrameKind::Predefined)?;
    Ok(PredefinedMessage { msg_id: body[0] })
}

/// Read a custom message body. Invalid UTF-8 is replaced, not rejected.
pub fn decode_custom(bytes: &[u8]) -> Result<CustomMessage> {
    let body = body(bytes, FrameKind::Custom)?;
    Ok(CustomMessage {
        text: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Validate and decode a complete frame.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    let kind = validate(bytes)?;
    let header = decode_header(bytes)?;
    let body = match kind {
        FrameKind::Gps => FrameBody::Gps(decode_gps(bytes)?),
        FrameKind::Predefined => FrameBody::Predefined(decode_predefined(bytes)?),
        FrameKind::Custom => FrameBody::Custom(decode_custom(bytes)?),
    };
    Ok(Frame { header, body })
}

fn body(bytes: &[u8], kind: FrameKind) -> Result<&[u8]> {
    let min = kind.min_frame_len();
    if bytes.len() < min {
        return Err(FrameError::Truncated {
            kind,
            len: bytes.len(),
            min,
        });
    }

    if bytes.len() > MAX_FRAME_SIZE {
        return Err(FrameError::MessageTooLarge {
            size: bytes.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let declared = usize::from(bytes[DATA_LENGTH_OFFSET]);
    let available = bytes.len() - MIN_FRAME_SIZE;
    if declared != available {
        return Err(FrameError::LengthMismatch {
            kind,
            declared,
            available,
        });
    }
    if kind == FrameKind::Custom && declared > MAX_CUSTOM_LEN {
        return Err(FrameError::MessageTooLarge {
            size: declared,
            max: MAX_CUSTOM_LEN,
        });
    }
    if let Some(expected) = kind.fixed_body_len() {
        if declared != expected {
            return Err(FrameError::BodyLength {
                kind,
                len: declared,
                expected,
            });
        }
    }

    Ok(&bytes[HEADER_SIZE..HEADER_SIZE + declared])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time() -> Timestamp {
        Timestamp::from_bytes([25, 6, 1, 12, 30, 45])
    }

    fn session() -> DeviceSession {
        DeviceSession::configure(0x02, 0x01)
    }

    #[test]
    fn predefined_frame_matches_reference_layout() {
        let session = session().with_transmission_id(7);
        let frame = encode_predefined_at(&session, fixed_time(), 4);

        assert_eq!(
            &frame[..HEADER_SIZE + 1],
            &[0x02, 0x02, 0x01, 0x00, 0x07, 25, 6, 1, 12, 30, 45, 0x01, 0x04]
        );
        assert_eq!(frame.len(), 14);
        assert_eq!(frame[13], checksum(&frame[..13]));

        assert_eq!(classify(&frame), Classification::Frame(FrameKind::Predefined));
        let header = decode_header(&frame).unwrap();
        assert_eq!(header.source_id, 0x02);
        assert_eq!(header.destination_id, 0x01);
        assert_eq!(header.transmission_id, 7);
        assert_eq!(header.timestamp, fixed_time());
        assert_eq!(header.data_length, 1);
        assert_eq!(decode_predefined(&frame).unwrap().msg_id, 4);
    }

    #[test]
    fn transmission_id_is_big_endian() {
        let session = session().with_transmission_id(0xABCD);
        let frame = encode_predefined_at(&session, fixed_time(), 0);
        assert_eq!(&frame[3..5], &[0xAB, 0xCD]);
        assert_eq!(decode_header(&frame).unwrap().transmission_id, 0xABCD);
    }

    #[test]
    fn gps_floats_are_little_endian() {
        let frame = encode_gps_at(&session(), fixed_time(), 1.0, -2.5);
        assert_eq!(frame.len(), 21);
        assert_eq!(frame[11], 8);
        assert_eq!(&frame[12..16], &1.0f32.to_le_bytes());
        assert_eq!(&frame[16..20], &(-2.5f32).to_le_bytes());
    }

    #[test]
    fn gps_round_trip_boundaries() {
        let values = [
            0.0f32,
            -0.0,
            f32::MAX,
            f32::MIN,
            f32::MIN_POSITIVE,
            f32::from_bits(1),
            -f32::from_bits(0x007F_FFFF),
            77.5946,
            -122.4194,
        ];
        for &longitude in &values {
            for &latitude in &values {
                let frame = encode_gps_at(&session(), fixed_time(), longitude, latitude);
                let fix = decode_gps(&frame).unwrap();
                assert_eq!(fix.longitude.to_bits(), longitude.to_bits());
                assert_eq!(fix.latitude.to_bits(), latitude.to_bits());
            }
        }
    }

    #[test]
    fn predefined_round_trip_boundaries() {
        for msg_id in [0u8, 1, 127, 255] {
            let frame = encode_predefined_at(&session(), fixed_time(), msg_id);
            assert_eq!(decode_predefined(&frame).unwrap().msg_id, msg_id);
        }
    }

    #[test]
    fn custom_round_trip_boundaries() {
        for len in [0usize, 1, MAX_CUSTOM_LEN] {
            let text = "x".repeat(len);
            let frame = encode_custom_at(&session(), fixed_time(), &text).unwrap();
            assert_eq!(frame.len(), MIN_FRAME_SIZE + len);
            assert_eq!(classify(&frame), Classification::Frame(FrameKind::Custom));
            assert_eq!(decode_custom(&frame).unwrap().text, text);
        }
    }

    #[test]
    fn custom_message_one_over_budget_is_rejected() {
        let text = "y".repeat(MAX_FRAME_SIZE - 13);
        let err = encode_custom_at(&session(), fixed_time(), &text).unwrap_err();
        assert_eq!(
            err,
            FrameError::MessageTooLarge {
                size: MAX_CUSTOM_LEN + 1,
                max: MAX_CUSTOM_LEN
            }
        );
    }

    #[test]
    fn custom_budget_counts_bytes_not_chars() {
        // 44 two-byte characters = 88 bytes.
        let text = "é".repeat(44);
        assert!(encode_custom_at(&session(), fixed_time(), &text).is_err());
    }

    #[test]
    fn every_single_bit_flip_is_detected() {
        let frames = [
            encode_gps_at(&session(), fixed_time(), 3.25, 51.5),
            encode_predefined_at(&session(), fixed_time(), 9),
            encode_custom_at(&session(), fixed_time(), "help").unwrap(),
        ];
        for frame in &frames {
            for index in 0..frame.len() {
                for bit in 0..8 {
                    let mut corrupted = frame.to_vec();
                    corrupted[index] ^= 1 << bit;
                    assert_eq!(
                        classify(&corrupted),
                        Classification::Corrupt,
                        "flip of bit {bit} in byte {index} went undetected"
                    );
                }
            }
        }
    }

    #[test]
    fn paired_flips_in_same_bit_position_are_a_known_blind_spot() {
        let frame = encode_predefined_at(&session(), fixed_time(), 3);
        let mut corrupted = frame.to_vec();
        corrupted[1] ^= 0x10;
        corrupted[2] ^= 0x10;
        assert_eq!(
            classify(&corrupted),
            Classification::Frame(FrameKind::Predefined)
        );
    }

    #[test]
    fn classify_empty_is_corrupt() {
        assert_eq!(classify(&[]), Classification::Corrupt);
        assert_eq!(validate(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn validate_reports_checksum_values() {
        let mut frame = encode_predefined_at(&session(), fixed_time(), 1).to_vec();
        let good = frame[13];
        frame[13] ^= 0xFF;
        assert_eq!(
            validate(&frame),
            Err(FrameError::ChecksumMismatch {
                expected: good,
                actual: good ^ 0xFF
            })
        );
    }

    #[test]
    fn unknown_tag_with_good_checksum_is_unrecognized() {
        let mut frame = encode_predefined_at(&session(), fixed_time(), 1).to_vec();
        frame[0] = 0x07;
        let last = frame.len() - 1;
        frame[last] = checksum(&frame[..last]);
        assert_eq!(classify(&frame), Classification::Unrecognized(0x07));
        assert_eq!(decode_frame(&frame), Err(FrameError::UnrecognizedType(0x07)));
    }

    #[test]
    fn short_frames_are_rejected_not_misread() {
        // A valid checksum over a two-byte buffer claiming to be GPS.
        let short = [0x01, 0x01];
        assert_eq!(classify(&short), Classification::Frame(FrameKind::Gps));
        assert!(matches!(
            decode_header(&short),
            Err(FrameError::HeaderTruncated { len: 2, min: 13 })
        ));
        assert!(matches!(
            decode_gps(&short),
            Err(FrameError::Truncated {
                kind: FrameKind::Gps,
                len: 2,
                min: 21
            })
        ));
        assert!(decode_frame(&short).is_err());
    }

    #[test]
    fn gps_frame_missing_body_bytes_is_truncated() {
        let frame = encode_gps_at(&session(), fixed_time(), 1.0, 2.0);
        let mut cut = frame[..17].to_vec();
        cut.push(checksum(&cut));
        assert_eq!(classify(&cut), Classification::Frame(FrameKind::Gps));
        assert!(matches!(
            decode_gps(&cut),
            Err(FrameError::Truncated { len: 18, .. })
        ));
    }

    #[test]
    fn custom_declared_length_beyond_buffer_is_rejected() {
        let frame = encode_custom_at(&session(), fixed_time(), "hello").unwrap();
        let mut lying = frame[..frame.len() - 1].to_vec();
        lying[DATA_LENGTH_OFFSET] = 40;
        lying.push(checksum(&lying));
        assert_eq!(
            decode_custom(&lying),
            Err(FrameError::LengthMismatch {
                kind: FrameKind::Custom,
                declared: 40,
                available: 5
            })
        );
    }

    #[test]
    fn custom_body_over_limit_is_rejected_on_decode() {
        let text = "x".repeat(MAX_CUSTOM_LEN);
        let frame = encode_custom_at(&session(), fixed_time(), &text).unwrap();
        let mut raw = frame[..frame.len() - 1].to_vec();
        raw[DATA_LENGTH_OFFSET] = (MAX_CUSTOM_LEN + 1) as u8;
        raw.push(b'x');
        raw.push(checksum(&raw));
        assert_eq!(raw.len(), MAX_FRAME_SIZE);
        assert_eq!(
            decode_custom(&raw),
            Err(FrameError::MessageTooLarge {
                size: MAX_CUSTOM_LEN + 1,
                max: MAX_CUSTOM_LEN
            })
        );
        assert!(decode_frame(&raw).is_err());
    }

    #[test]
    fn frame_longer_than_radio_limit_is_rejected() {
        let frame = encode_custom_at(&session(), fixed_time(), "hi").unwrap();
        let mut raw = frame[..HEADER_SIZE].to_vec();
        raw[DATA_LENGTH_OFFSET] = 120;
        raw.resize(HEADER_SIZE + 120, b'y');
        raw.push(checksum(&raw));
        assert_eq!(
            decode_custom(&raw),
            Err(FrameError::MessageTooLarge {
                size: MIN_FRAME_SIZE + 120,
                max: MAX_FRAME_SIZE
            })
        );
    }

    #[test]
    fn predefined_with_oversized_body_is_rejected() {
        let mut raw = encode_predefined_at(&session(), fixed_time(), 1)[..13].to_vec();
        raw[DATA_LENGTH_OFFSET] = 2;
        raw.push(0xEE);
        raw.push(checksum(&raw));
        assert_eq!(
            decode_predefined(&raw),
            Err(FrameError::BodyLength {
                kind: FrameKind::Predefined,
                len: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn decode_frame_dispatches_by_kind() {
        let session = session().with_transmission_id(42);
        let frame = decode_frame(&encode_custom_at(&session, fixed_time(), "on my way").unwrap())
            .unwrap();
        assert_eq!(frame.kind(), FrameKind::Custom);
        assert_eq!(frame.header.transmission_id, 42);
        assert_eq!(frame.wire_size(), MIN_FRAME_SIZE + 9);
        assert_eq!(
            frame.body,
            FrameBody::Custom(CustomMessage {
                text: "on my way".to_string()
            })
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut raw = encode_custom_at(&session(), fixed_time(), "ab").unwrap()[..14].to_vec();
        raw[12] = 0xFF;
        raw.push(checksum(&raw));
        assert_eq!(decode_custom(&raw).unwrap().text, "\u{FFFD}b");
    }

    #[test]
    fn encoding_does_not_advance_the_counter() {
        let session = session();
        let _ = encode_predefined(&session, 1);
        let _ = encode_gps(&session, 0.0, 0.0);
        assert_eq!(session.transmission_id(), 0);
    }
}
