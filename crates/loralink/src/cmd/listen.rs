use std::sync::Arc;
use std::thread;

use loralink_station::{Receiver, Shutdown, StationConfig};

use crate::cmd::{install_ctrlc_handler, ListenArgs};
use crate::exit::{station_error, CliResult, SUCCESS};
use crate::output::{OutputFormat, OutputReporter};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let role = args.link.role;
    let link = args.link.bind()?;
    let reporter = Arc::new(OutputReporter::new(format));
    let interval = StationConfig::for_role(role).receive_interval;
    let receiver = Receiver::new(Arc::new(link), reporter.clone(), role, interval);

    let shutdown = Shutdown::new();
    install_ctrlc_handler(shutdown.clone())?;

    while !shutdown.is_triggered() {
        let got = receiver
            .poll_once()
            .map_err(|err| station_error("receive failed", err))?;

        if let Some(count) = args.count {
            if reporter.inbound() >= count {
                return Ok(SUCCESS);
            }
        }
        if !got {
            thread::sleep(interval);
        }
    }

    Ok(SUCCESS)
}
