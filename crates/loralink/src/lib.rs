//! Two-station radio message link.
//!
//! A base station and a field unit exchange short checksummed frames
//! (GPS fixes, predefined catalog messages, free text) over a radio.
//!
//! # Crate Structure
//!
//! - [`frame`]: wire format, checksum, device session and timestamps
//! - [`transport`]: the `RadioLink` seam plus in-memory and Unix datagram links
//! - [`station`]: command queue and the receive/input/transmit roles
//!   (behind the `station` feature)

/// Re-export frame types.
pub mod frame {
    pub use loralink_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use loralink_transport::*;
}

/// Re-export station types (requires `station` feature).
#[cfg(feature = "station")]
pub mod station {
    pub use loralink_station::*;
}
