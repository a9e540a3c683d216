use std::fmt;
use std::str::FromStr;

use loralink_frame::{DeviceIdentity, FrameKind};

use crate::catalog::{Catalog, BASE_MESSAGES, EMERGENCY_MESSAGES};
use crate::command::Command;

/// Which end of the link this station is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StationRole {
    /// Fixed base station: sends instructions, receives positions and calls.
    #[default]
    Base,
    /// Handheld field unit: sends emergency calls and positions.
    Field,
}

impl StationRole {
    /// Catalog for predefined messages this station sends.
    pub fn outbound_catalog(self) -> &'static Catalog {
        match self {
            StationRole::Base => &BASE_MESSAGES,
            StationRole::Field => &EMERGENCY_MESSAGES,
        }
    }

    /// Catalog for predefined messages this station receives.
    pub fn inbound_catalog(self) -> &'static Catalog {
        match self {
            StationRole::Base => &EMERGENCY_MESSAGES,
            StationRole::Field => &BASE_MESSAGES,
        }
    }

    /// Whether this station may transmit `command`.
    pub fn can_produce(self, command: &Command) -> bool {
        match command {
            Command::Predefined { .. } | Command::Custom { .. } => true,
            Command::Position { .. } => self == StationRole::Field,
        }
    }

    /// Whether frames of `kind` are expected from the other end.
    pub fn expects(self, kind: FrameKind) -> bool {
        match self {
            StationRole::Base => true,
            StationRole::Field => kind != FrameKind::Gps,
        }
    }

    /// Identity used when none is configured.
    pub fn default_identity(self) -> DeviceIdentity {
        match self {
            StationRole::Base => DeviceIdentity {
                source_id: 0x02,
                destination_id: 0x01,
            },
            StationRole::Field => DeviceIdentity {
                source_id: 0x01,
                destination_id: 0x02,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StationRole::Base => "base",
            StationRole::Field => "field",
        }
    }
}

impl fmt::Display for StationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(StationRole::Base),
            "field" => Ok(StationRole::Field),
            other => Err(format!("unknown station role: {other}")),
        }
    }
}
