use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use loralink_station::{
    Button, ButtonPoll, ButtonSource, Display, LineInput, Screen, Station, StationConfig,
    StationInput,
};
use tracing::info;

use crate::cmd::{install_ctrlc_handler, InputMode, RunArgs};
use crate::exit::{station_error, CliResult, SUCCESS};
use crate::output::{OutputFormat, OutputReporter};

const SUPERVISE_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let link = args.link.bind()?;
    let config = StationConfig {
        queue_capacity: args.queue_capacity,
        ..StationConfig::for_role(args.link.role)
    };
    let station = Station::new(
        config,
        args.link.session(),
        Arc::new(link),
        Arc::new(OutputReporter::new(format)),
    );

    let input = match args.input {
        InputMode::Text => {
            StationInput::Text(Box::new(LineInput::new(BufReader::new(io::stdin()))))
        }
        InputMode::Buttons => StationInput::Buttons {
            source: Box::new(ButtonLines::new(BufReader::new(io::stdin()))),
            display: Box::new(TerminalDisplay::new(io::stderr())),
        },
    };

    let handle = station
        .spawn(input)
        .map_err(|err| station_error("station start failed", err))?;
    let stop = handle.shutdown_flag();
    install_ctrlc_handler(stop.clone())?;

    while !stop.is_triggered() && !handle.input_finished() {
        thread::sleep(SUPERVISE_INTERVAL);
    }

    if stop.is_triggered() {
        info!("interrupted, stopping station");
        handle.shutdown();
    } else {
        handle.wait();
    }
    Ok(SUCCESS)
}

/// Button presses typed one per line.
struct ButtonLines<R> {
    reader: R,
}

impl<R> ButtonLines<R> {
    fn new(reader: R) -> Self {
        Self { reader }
    }
}

fn parse_button(line: &str) -> Option<Button> {
    match line.trim().to_ascii_lowercase().as_str() {
        "m" | "mode" => Some(Button::Mode),
        "u" | "up" => Some(Button::Up),
        "d" | "down" => Some(Button::Down),
        "o" | "ok" => Some(Button::Ok),
        _ => None,
    }
}

impl<R: BufRead + Send> ButtonSource for ButtonLines<R> {
    fn poll(&mut self) -> io::Result<ButtonPoll> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(ButtonPoll::Closed);
        }
        let line = String::from_utf8_lossy(&line);
        Ok(parse_button(&line).map_or(ButtonPoll::Idle, ButtonPoll::Pressed))
    }
}

/// Draws the menu as a framed block of text.
struct TerminalDisplay<W> {
    out: W,
}

impl<W> TerminalDisplay<W> {
    fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Display for TerminalDisplay<W> {
    fn draw(&mut self, screen: &Screen) -> io::Result<()> {
        writeln!(self.out, "+------------------------")?;
        for line in screen.lines() {
            writeln!(self.out, "| {line}")?;
        }
        writeln!(self.out, "+------------------------")?;
        self.out.flush()
    }
}
