use loralink_frame::{Frame, FrameBody, FrameError, FrameKind};
use tracing::{info, warn};

use crate::command::Command;
use crate::signal::SignalReading;

/// Something a station role observed or did.
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// A frame passed validation and decoded cleanly.
    Received {
        frame: Frame,
        /// Catalog text for predefined messages, when the id is in range.
        message: Option<&'static str>,
        signal: Option<SignalReading>,
        /// False when this role does not expect frames of this kind.
        expected: bool,
    },
    /// Empty buffer or checksum mismatch; the bytes were dropped.
    Corrupt {
        len: usize,
        signal: Option<SignalReading>,
    },
    /// Checksum holds but the type tag is unknown; the bytes were dropped.
    Unrecognized {
        tag: u8,
        len: usize,
        signal: Option<SignalReading>,
    },
    /// Checksum and tag hold but the body is inconsistent with the header.
    Malformed {
        error: FrameError,
        len: usize,
        signal: Option<SignalReading>,
    },
    /// A command was encoded and handed to the radio.
    Transmitted {
        command: Command,
        transmission_id: u16,
        kind: FrameKind,
        len: usize,
        /// Catalog text for predefined messages, when the id is in range.
        message: Option<&'static str>,
    },
    /// A command was refused and nothing was sent.
    Rejected { command: Command, reason: String },
    /// An input line produced no command.
    InputIgnored { line: String, reason: String },
}

/// Sink for station events. Called from every role thread.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &StationEvent);
}

/// Reports events as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &StationEvent) {
        match event {
            StationEvent::Received {
                frame,
                message,
                signal,
                expected,
            } => {
                let header = &frame.header;
                let rssi = signal.map(|s| s.dbm);
                let band = signal.map(|s| s.band.name());
                match &frame.body {
                    FrameBody::Gps(fix) => info!(
                        source_id = header.source_id,
                        destination_id = header.destination_id,
                        transmission_id = header.transmission_id,
                        timestamp = %header.timestamp,
                        longitude = fix.longitude,
                        latitude = fix.latitude,
                        rssi,
                        band,
                        expected,
                        "received GPS frame"
                    ),
                    FrameBody::Predefined(msg) => info!(
                        source_id = header.source_id,
                        destination_id = header.destination_id,
                        transmission_id = header.transmission_id,
                        timestamp = %header.timestamp,
                        msg_number = u16::from(msg.msg_id) + 1,
                        text = message.unwrap_or("unknown message"),
                        rssi,
                        band,
                        expected,
                        "received predefined message"
                    ),
                    FrameBody::Custom(msg) => info!(
                        source_id = header.source_id,
                        destination_id = header.destination_id,
                        transmission_id = header.transmission_id,
                        timestamp = %header.timestamp,
                        text = %msg.text,
                        rssi,
                        band,
                        expected,
                        "received custom message"
                    ),
                }
            }
            StationEvent::Corrupt { len, signal } => warn!(
                len,
                rssi = signal.map(|s| s.dbm),
                "received unknown payload or checksum error"
            ),
            StationEvent::Unrecognized { tag, len, signal } => warn!(
                tag,
                len,
                rssi = signal.map(|s| s.dbm),
                "received frame with unrecognized type"
            ),
            StationEvent::Malformed { error, len, signal } => warn!(
                %error,
                len,
                rssi = signal.map(|s| s.dbm),
                "received malformed frame"
            ),
            StationEvent::Transmitted {
                command,
                transmission_id,
                kind,
                len,
                message,
            } => info!(
                %command,
                transmission_id,
                kind = kind.name(),
                len,
                text = message.unwrap_or(""),
                "transmitted"
            ),
            StationEvent::Rejected { command, reason } => {
                warn!(%command, %reason, "command rejected")
            }
            StationEvent::InputIgnored { line, reason } => {
                warn!(%line, %reason, "input ignored")
            }
        }
    }
}
