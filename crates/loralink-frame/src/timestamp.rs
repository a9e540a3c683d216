use std::fmt;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// Number of timestamp bytes carried in every frame header.
pub const TIMESTAMP_SIZE: usize = 6;

/// Wall-clock capture carried in the frame header.
///
/// Purely informational: the sender's clock may jump, so nothing orders
/// frames by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp {
    /// Years since 2000.
    pub year_offset: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    /// Capture the local wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now().naive_local())
    }

    /// Convert a calendar time. Years outside 2000..=2255 are clamped.
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        let year_offset = (dt.year() - 2000).clamp(0, u8::MAX as i32) as u8;
        Self {
            year_offset,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        }
    }

    pub fn from_bytes(bytes: [u8; TIMESTAMP_SIZE]) -> Self {
        let [year_offset, month, day, hour, minute, second] = bytes;
        Self {
            year_offset,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn to_bytes(self) -> [u8; TIMESTAMP_SIZE] {
        [
            self.year_offset,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            2000 + u16::from(self.year_offset),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}
