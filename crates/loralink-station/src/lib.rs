//! Station pipeline for a two-station radio message link.
//!
//! A station runs three concurrent roles around one bounded command queue:
//! - **Receiver** polls the radio, validates and decodes frames, reports them
//! - **Input producer** turns operator input (text lines or button presses)
//!   into [`Command`]s and pushes them onto the queue
//! - **Transmitter** pops commands, encodes frames, hands them to the radio
//!   and advances the session's transmission counter
//!
//! Base and field units share the same wiring; [`StationRole`] selects the
//! message catalogs, producible commands and expected inbound frame kinds.

pub mod catalog;
pub mod command;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod report;
pub mod role;
pub mod selection;
pub mod signal;

pub use catalog::{Catalog, BASE_MESSAGES, EMERGENCY_MESSAGES};
pub use command::{parse_line, Command, CommandParseError};
pub use error::{Result, StationError};
pub use pipeline::{
    InputProducer, LineInput, Receiver, Shutdown, Station, StationConfig, StationHandle,
    StationInput, TextInput, Transmitter,
};
pub use queue::{command_queue, CommandReceiver, CommandSender, DEFAULT_QUEUE_CAPACITY};
pub use report::{Reporter, StationEvent, TracingReporter};
pub use role::StationRole;
pub use selection::{
    Button, ButtonPoll, ButtonPoller, ButtonSource, Display, DisplayRenderer, InboxEntry, Row,
    Screen, Selection, SelectionState,
};
pub use signal::{SignalBand, SignalReading};
