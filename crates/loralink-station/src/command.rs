use std::fmt;

use loralink_frame::FrameKind;

/// Highest operator-facing predefined message number (maps to msg id 255).
const MAX_MESSAGE_NUMBER: i64 = 256;

/// An operator's intent to send something, queued for the transmitter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send a predefined message by zero-based catalog index.
    Predefined { msg_id: u8 },
    /// Send free text.
    Custom { text: String },
    /// Send a GPS position.
    Position { longitude: f32, latitude: f32 },
}

impl Command {
    /// Frame kind this command encodes to.
    pub fn kind(&self) -> FrameKind {
        match self {
            Command::Predefined { .. } => FrameKind::Predefined,
            Command::Custom { .. } => FrameKind::Custom,
            Command::Position { .. } => FrameKind::Gps,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Predefined { msg_id } => write!(f, "predefined #{}", u16::from(*msg_id) + 1),
            Command::Custom { text } => write!(f, "custom {text:?}"),
            Command::Position {
                longitude,
                latitude,
            } => write!(f, "position {longitude:.6},{latitude:.6}"),
        }
    }
}

/// Why an input line did not produce a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("not a message number: {0:?}")]
    InvalidNumber(String),

    #[error("message number {0} out of range (1-256)")]
    OutOfRange(i64),

    #[error("invalid position {0:?} (expected G:<longitude>,<latitude>)")]
    InvalidPosition(String),
}

/// Parse one line of the local text command protocol.
///
/// - blank lines yield `Ok(None)`
/// - `C:<text>` (any case) is a custom message; the text is trimmed
/// - `G:<longitude>,<latitude>` (any case) is a position report
/// - anything else must be a 1-based predefined message number
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(text) = strip_marker(line, 'c') {
        return Ok(Some(Command::Custom {
            text: text.trim().to_string(),
        }));
    }

    if let Some(rest) = strip_marker(line, 'g') {
        return parse_position(rest.trim()).map(Some);
    }

    let number: i64 = line
        .parse()
        .map_err(|_| CommandParseError::InvalidNumber(line.to_string()))?;
    if !(1..=MAX_MESSAGE_NUMBER).contains(&number) {
        return Err(CommandParseError::OutOfRange(number));
    }
    Ok(Some(Command::Predefined {
        msg_id: (number - 1) as u8,
    }))
}

fn strip_marker(line: &str, marker: char) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if first.eq_ignore_ascii_case(&marker) && chars.next() == Some(':') {
        Some(&line[2..])
    } else {
        None
    }
}

fn parse_position(input: &str) -> Result<Command, CommandParseError> {
    let invalid = || CommandParseError::InvalidPosition(input.to_string());
    let (lon, lat) = input.split_once(',').ok_or_else(invalid)?;
    let longitude: f32 = lon.trim().parse().map_err(|_| invalid())?;
    let latitude: f32 = lat.trim().parse().map_err(|_| invalid())?;
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(invalid());
    }
    Ok(Command::Position {
        longitude,
        latitude,
    })
}
