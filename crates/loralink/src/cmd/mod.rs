use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use loralink_frame::{DeviceIdentity, DeviceSession};
use loralink_station::{Shutdown, StationRole};
use loralink_transport::{DatagramLink, DatagramLinkConfig};

use crate::exit::{transport_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a full station: receive, operator input and transmit.
    Run(RunArgs),
    /// Transmit a single command line and exit.
    Send(SendArgs),
    /// Print received frames.
    Listen(ListenArgs),
    /// Decode a hex-encoded frame offline.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Station identity and the simulated radio it talks through.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Which end of the link this station is.
    #[arg(long, default_value = "base")]
    pub role: StationRole,
    /// Socket path this radio receives on.
    #[arg(long, env = "LORALINK_LINK", value_name = "PATH")]
    pub link: PathBuf,
    /// Socket path of the other radio.
    #[arg(long, env = "LORALINK_PEER", value_name = "PATH")]
    pub peer: PathBuf,
    /// Source device id (decimal or 0x-hex). Default depends on role.
    #[arg(long, env = "LORALINK_SOURCE_ID", value_parser = parse_device_id)]
    pub source_id: Option<u8>,
    /// Destination device id (decimal or 0x-hex). Default depends on role.
    #[arg(long, env = "LORALINK_DESTINATION_ID", value_parser = parse_device_id)]
    pub destination_id: Option<u8>,
    /// Simulated signal strength reported for received frames, in dBm.
    #[arg(long, value_name = "DBM", allow_negative_numbers = true)]
    pub rssi: Option<i32>,
}

impl LinkArgs {
    /// Role defaults overridden by any ids given explicitly.
    pub fn identity(&self) -> DeviceIdentity {
        let defaults = self.role.default_identity();
        DeviceIdentity {
            source_id: self.source_id.unwrap_or(defaults.source_id),
            destination_id: self.destination_id.unwrap_or(defaults.destination_id),
        }
    }

    pub fn session(&self) -> DeviceSession {
        let identity = self.identity();
        DeviceSession::configure(identity.source_id, identity.destination_id)
    }

    pub fn bind(&self) -> CliResult<DatagramLink> {
        DatagramLink::bind(DatagramLinkConfig {
            signal_strength: self.rssi,
            ..DatagramLinkConfig::new(&self.link, &self.peer)
        })
        .map_err(|err| transport_error("bind failed", err))
    }
}

/// Operator input mode for `run`.
#[derive(Copy, Clone, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum InputMode {
    /// One command per stdin line: a message number, `C:<text>` or `G:<lon>,<lat>`.
    #[default]
    Text,
    /// One button per stdin line (`mode`, `up`, `down`, `ok`); the menu is drawn on stderr.
    Buttons,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// How commands are entered.
    #[arg(long, value_enum, default_value_t = InputMode::Text)]
    pub input: InputMode,
    /// Command queue depth.
    #[arg(long, default_value_t = loralink_station::DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Transmission id to stamp on the frame.
    #[arg(long, default_value_t = 0)]
    pub transmission_id: u16,
    /// Command line: a message number, `C:<text>` or `G:<lon>,<lat>`.
    pub message: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex; whitespace is ignored.
    pub hex: String,
    /// Role of the receiving station, for catalog lookups.
    #[arg(long, default_value = "base")]
    pub role: StationRole,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_device_id(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid device id {input:?} (expected 0-255 or 0x00-0xff)"))
}

/// Route Ctrl-C to the station's stop flag.
pub fn install_ctrlc_handler(shutdown: Shutdown) -> CliResult<()> {
    ctrlc::set_handler(move || shutdown.trigger())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
