//! Frame type tags.
//!
//! Tags 0x01-0x03 are the only defined kinds; any other first byte is
//! reported as unrecognized.

use std::fmt;

use crate::codec::{CHECKSUM_SIZE, HEADER_SIZE};

/// GPS fix: two little-endian IEEE-754 singles.
pub const GPS: u8 = 0x01;

/// Predefined message: one zero-based catalog index.
pub const PREDEFINED: u8 = 0x02;

/// Custom message: raw text bytes.
pub const CUSTOM: u8 = 0x03;

/// The three frame kinds carried on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Gps,
    Predefined,
    Custom,
}

impl FrameKind {
    /// All kinds, in tag order.
    pub const ALL: [FrameKind; 3] = [FrameKind::Gps, FrameKind::Predefined, FrameKind::Custom];

    /// Wire tag for this kind.
    pub fn tag(self) -> u8 {
        match self {
            FrameKind::Gps => GPS,
            FrameKind::Predefined => PREDEFINED,
            FrameKind::Custom => CUSTOM,
        }
    }

    /// Look up a kind by wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            GPS => Some(FrameKind::Gps),
            PREDEFINED => Some(FrameKind::Predefined),
            CUSTOM => Some(FrameKind::Custom),
            _ => None,
        }
    }

    /// Body length for kinds whose body size never varies.
    pub fn fixed_body_len(self) -> Option<usize> {
        match self {
            FrameKind::Gps => Some(8),
            FrameKind::Predefined => Some(1),
            FrameKind::Custom => None,
        }
    }

    /// Smallest complete frame of this kind, checksum included.
    pub fn min_frame_len(self) -> usize {
        HEADER_SIZE + self.fixed_body_len().unwrap_or(0) + CHECKSUM_SIZE
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Gps => "GPS",
            FrameKind::Predefined => "PREDEFINED",
            FrameKind::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in FrameKind::ALL {
            assert_eq!(FrameKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(FrameKind::from_tag(0x00), None);
        assert_eq!(FrameKind::from_tag(0x04), None);
        assert_eq!(FrameKind::from_tag(0xFF), None);
    }

    #[test]
    fn minimum_lengths() {
        assert_eq!(FrameKind::Gps.min_frame_len(), 21);
        assert_eq!(FrameKind::Predefined.min_frame_len(), 14);
        assert_eq!(FrameKind::Custom.min_frame_len(), 13);
    }
}
