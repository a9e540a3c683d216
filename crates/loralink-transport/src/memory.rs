use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::RadioLink;

/// In-process radio: frames sent on one end of a pair arrive on the other.
///
/// Delivery is lossless and ordered. Use [`MemoryLink::inject`] to place
/// arbitrary bytes (corrupt frames, noise) in this end's receive path.
#[derive(Debug)]
pub struct MemoryLink {
    outbound: Sender<Bytes>,
    loopback: Sender<Bytes>,
    inbound: Mutex<Inbound>,
    signal_strength: Option<i32>,
}

#[derive(Debug)]
struct Inbound {
    rx: Receiver<Bytes>,
    pending: Option<Bytes>,
}

impl MemoryLink {
    /// Create two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();
        let a = Self::new(b_tx.clone(), a_tx.clone(), a_rx);
        let b = Self::new(a_tx, b_tx, b_rx);
        (a, b)
    }

    fn new(outbound: Sender<Bytes>, loopback: Sender<Bytes>, rx: Receiver<Bytes>) -> Self {
        Self {
            outbound,
            loopback,
            inbound: Mutex::new(Inbound { rx, pending: None }),
            signal_strength: None,
        }
    }

    /// Report a fixed signal strength for every received frame.
    pub fn with_signal_strength(mut self, dbm: i32) -> Self {
        self.signal_strength = Some(dbm);
        self
    }

    /// Queue raw bytes as if they had been received over the air.
    pub fn inject(&self, bytes: impl Into<Bytes>) {
        // The receiver half lives in `self`, so this cannot fail.
        let _ = self.loopback.send(bytes.into());
    }

    fn lock_inbound(&self) -> Result<std::sync::MutexGuard<'_, Inbound>> {
        self.inbound
            .lock()
            .map_err(|_| TransportError::Io(std::io::Error::other("inbound lock poisoned")))
    }
}

impl RadioLink for MemoryLink {
    fn send(&self, frame: &[u8]) -> Result<()> {
        trace!(len = frame.len(), "memory link send");
        self.outbound
            .send(Bytes::copy_from_slice(frame))
            .map_err(|_| TransportError::Disconnected)
    }

    fn has_inbound_data(&self) -> Result<bool> {
        let mut inbound = self.lock_inbound()?;
        if inbound.pending.is_some() {
            return Ok(true);
        }
        match inbound.rx.try_recv() {
            Ok(bytes) => {
                inbound.pending = Some(bytes);
                Ok(true)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(false),
        }
    }

    fn receive_available(&self) -> Result<Bytes> {
        let mut inbound = self.lock_inbound()?;
        if let Some(bytes) = inbound.pending.take() {
            return Ok(bytes);
        }
        Ok(inbound.rx.try_recv().unwrap_or_default())
    }

    fn last_signal_strength(&self) -> Option<i32> {
        self.signal_strength
    }
}
