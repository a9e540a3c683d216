//! Local device identity and the outbound transmission counter.

/// Source/destination pair configured once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub source_id: u8,
    pub destination_id: u8,
}

/// Identity plus the 16-bit transmission counter.
///
/// The counter advances only through [`DeviceSession::next_transmission_id`],
/// which takes `&mut self`: whoever owns the session is the single writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSession {
    identity: DeviceIdentity,
    transmission_id: u16,
}

impl DeviceSession {
    /// Configure a fresh session; the first frame carries transmission id 0.
    pub fn configure(source_id: u8, destination_id: u8) -> Self {
        Self {
            identity: DeviceIdentity {
                source_id,
                destination_id,
            },
            transmission_id: 0,
        }
    }

    /// Start the counter at `id` instead of 0.
    pub fn with_transmission_id(mut self, id: u16) -> Self {
        self.transmission_id = id;
        self
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    pub fn source_id(&self) -> u8 {
        self.identity.source_id
    }

    pub fn destination_id(&self) -> u8 {
        self.identity.destination_id
    }

    /// Transmission id the next encoded frame will carry.
    pub fn transmission_id(&self) -> u16 {
        self.transmission_id
    }

    /// Return the current id and advance, wrapping after 65535.
    pub fn next_transmission_id(&mut self) -> u16 {
        let id = self.transmission_id;
        self.transmission_id = id.wrapping_add(1);
        id
    }
}
