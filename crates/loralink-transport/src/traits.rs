use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;

/// Byte-level access to a half-duplex radio.
///
/// Methods take `&self` so that one link can be shared between the receiving
/// and transmitting roles of a station; implementations serialize access
/// internally.
pub trait RadioLink: Send + Sync {
    /// Transmit one complete frame.
    fn send(&self, frame: &[u8]) -> Result<()>;

    /// Whether a received frame is waiting to be drained.
    fn has_inbound_data(&self) -> Result<bool>;

    /// Drain every byte of the waiting frame.
    ///
    /// Returns an empty buffer when nothing is waiting.
    fn receive_available(&self) -> Result<Bytes>;

    /// Signal strength of the most recently received frame, in dBm.
    ///
    /// `None` when the link has no reading.
    fn last_signal_strength(&self) -> Option<i32>;
}

impl<T: RadioLink + ?Sized> RadioLink for Arc<T> {
    fn send(&self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn has_inbound_data(&self) -> Result<bool> {
        (**self).has_inbound_data()
    }

    fn receive_available(&self) -> Result<Bytes> {
        (**self).receive_available()
    }

    fn last_signal_strength(&self) -> Option<i32> {
        (**self).last_signal_strength()
    }
}
