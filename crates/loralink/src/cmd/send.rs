use std::sync::Arc;

use loralink_station::{command_queue, parse_line, StationConfig, Transmitter};

use crate::cmd::SendArgs;
use crate::exit::{station_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{OutputFormat, OutputReporter};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let role = args.link.role;
    let command = parse_line(&args.message)
        .map_err(|err| CliError::new(USAGE, format!("invalid message: {err}")))?
        .ok_or_else(|| CliError::new(USAGE, "message must not be empty"))?;
    if !role.can_produce(&command) {
        return Err(CliError::new(
            USAGE,
            format!("{role} stations cannot send {}", command.kind()),
        ));
    }

    let link = args.link.bind()?;
    let session = args
        .link
        .session()
        .with_transmission_id(args.transmission_id);

    // One-shot: the queue only satisfies the transmitter's wiring.
    let (_commands, queue) = command_queue(1);
    let mut transmitter = Transmitter::new(
        session,
        queue,
        Arc::new(link),
        Arc::new(OutputReporter::new(format)),
        role,
        StationConfig::for_role(role).transmit_interval,
    );

    match transmitter
        .transmit(command)
        .map_err(|err| station_error("send failed", err))?
    {
        Some(_) => Ok(SUCCESS),
        None => Ok(DATA_INVALID),
    }
}
