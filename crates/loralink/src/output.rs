use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use loralink_frame::{Frame, FrameBody};
use loralink_station::{Reporter, SignalReading, StationEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One flat record per event; absent fields are omitted from JSON.
#[derive(Serialize, Default, Debug)]
struct EventOutput {
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transmission_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rssi: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    band: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<String>,
}

impl EventOutput {
    fn with_signal(mut self, signal: Option<SignalReading>) -> Self {
        self.rssi = signal.map(|s| s.dbm);
        self.band = signal.map(|s| s.band.name());
        self
    }

    fn with_frame(mut self, frame: &Frame, message: Option<&'static str>) -> Self {
        let header = &frame.header;
        self.kind = Some(frame.kind().name());
        self.source_id = Some(header.source_id);
        self.destination_id = Some(header.destination_id);
        self.transmission_id = Some(header.transmission_id);
        self.timestamp = Some(header.timestamp.to_string());
        match &frame.body {
            FrameBody::Gps(fix) => {
                self.longitude = Some(fix.longitude);
                self.latitude = Some(fix.latitude);
            }
            FrameBody::Predefined(msg) => {
                self.msg_number = Some(u16::from(msg.msg_id) + 1);
                self.text = Some(message.unwrap_or("unknown message").to_string());
            }
            FrameBody::Custom(msg) => self.text = Some(msg.text.clone()),
        }
        self
    }

    /// Human summary of what the event carried.
    fn detail(&self) -> String {
        match (self.longitude, self.latitude, &self.text, &self.reason) {
            (Some(lon), Some(lat), _, _) => format!("{lon:.6},{lat:.6}"),
            (_, _, Some(text), _) => match self.msg_number {
                Some(n) => format!("#{n} {text}"),
                None => text.clone(),
            },
            (_, _, _, Some(reason)) => reason.clone(),
            _ => String::new(),
        }
    }
}

fn event_output(event: &StationEvent) -> EventOutput {
    match event {
        StationEvent::Received {
            frame,
            message,
            signal,
            expected,
        } => EventOutput {
            event: "received",
            expected: Some(*expected),
            ..EventOutput::default()
        }
        .with_frame(frame, *message)
        .with_signal(*signal),
        StationEvent::Corrupt { len, signal } => EventOutput {
            event: "corrupt",
            len: Some(*len),
            ..EventOutput::default()
        }
        .with_signal(*signal),
        StationEvent::Unrecognized { tag, len, signal } => EventOutput {
            event: "unrecognized",
            len: Some(*len),
            reason: Some(format!("type {tag:#04x}")),
            ..EventOutput::default()
        }
        .with_signal(*signal),
        StationEvent::Malformed { error, len, signal } => EventOutput {
            event: "malformed",
            len: Some(*len),
            reason: Some(error.to_string()),
            ..EventOutput::default()
        }
        .with_signal(*signal),
        StationEvent::Transmitted {
            command,
            transmission_id,
            kind,
            len,
            message,
        } => EventOutput {
            event: "transmitted",
            kind: Some(kind.name()),
            transmission_id: Some(*transmission_id),
            len: Some(*len),
            text: message
                .map(str::to_string)
                .or_else(|| Some(command.to_string())),
            ..EventOutput::default()
        },
        StationEvent::Rejected { command, reason } => EventOutput {
            event: "rejected",
            kind: Some(command.kind().name()),
            text: Some(command.to_string()),
            reason: Some(reason.clone()),
            ..EventOutput::default()
        },
        StationEvent::InputIgnored { line, reason } => EventOutput {
            event: "input-ignored",
            text: Some(line.clone()),
            reason: Some(reason.clone()),
            ..EventOutput::default()
        },
    }
}

fn print_output(out: &EventOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "KIND", "FROM", "TID", "DETAIL", "SIGNAL"])
                .add_row(vec![
                    out.event.to_string(),
                    out.kind.unwrap_or("-").to_string(),
                    opt(out.source_id),
                    opt(out.transmission_id),
                    out.detail(),
                    signal_cell(out),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!("{} {}", out.event, out.kind.unwrap_or("-"));
            if let Some(source_id) = out.source_id {
                line.push_str(&format!(" from={source_id:#04x}"));
            }
            if let Some(tid) = out.transmission_id {
                line.push_str(&format!(" tid={tid}"));
            }
            if let Some(ts) = &out.timestamp {
                line.push_str(&format!(" at={ts}"));
            }
            let detail = out.detail();
            if !detail.is_empty() {
                line.push_str(&format!(" {detail}"));
            }
            if out.rssi.is_some() {
                line.push_str(&format!(" [{}]", signal_cell(out)));
            }
            println!("{line}");
        }
        OutputFormat::Raw => {
            if out.event == "received" {
                let mut text = out.detail().into_bytes();
                text.push(b'\n');
                print_raw(&text);
            }
        }
    }
}

pub fn print_event(event: &StationEvent, format: OutputFormat) {
    print_output(&event_output(event), format);
}

/// Print an offline-decoded frame along with its wire bytes.
pub fn print_decoded(
    frame: &Frame,
    message: Option<&'static str>,
    bytes: &[u8],
    format: OutputFormat,
) {
    let out = EventOutput {
        event: "decoded",
        len: Some(bytes.len()),
        frame: Some(hex::encode(bytes)),
        ..EventOutput::default()
    }
    .with_frame(frame, message);
    print_output(&out, format);
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn signal_cell(out: &EventOutput) -> String {
    match (out.rssi, out.band) {
        (Some(dbm), Some(band)) => format!("{dbm} dBm - {band}"),
        _ => "-".to_string(),
    }
}

/// Prints every station event to stdout and counts inbound ones.
#[derive(Debug)]
pub struct OutputReporter {
    format: OutputFormat,
    inbound: AtomicUsize,
}

impl OutputReporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            inbound: AtomicUsize::new(0),
        }
    }

    /// Frames seen on the receive path, valid or not.
    pub fn inbound(&self) -> usize {
        self.inbound.load(Ordering::SeqCst)
    }
}

impl Reporter for OutputReporter {
    fn report(&self, event: &StationEvent) {
        if matches!(
            event,
            StationEvent::Received { .. }
                | StationEvent::Corrupt { .. }
                | StationEvent::Unrecognized { .. }
                | StationEvent::Malformed { .. }
        ) {
            self.inbound.fetch_add(1, Ordering::SeqCst);
        }
        print_event(event, self.format);
    }
}
