//! Radio link abstraction.
//!
//! The codec and the station pipeline never touch a transceiver directly;
//! they talk to a [`RadioLink`]. Two links are provided:
//! - [`MemoryLink`]: an in-process pair for tests and simulations
//! - [`DatagramLink`]: one Unix datagram socket per radio, so two processes
//!   on one host can act as the two ends of the air interface
//!
//! Every receive yields exactly one complete frame; links never reassemble
//! across calls.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod datagram;

pub use error::{Result, TransportError};
pub use memory::MemoryLink;
pub use traits::RadioLink;

#[cfg(unix)]
pub use datagram::{DatagramLink, DatagramLinkConfig};
