use loralink_frame::{classify, decode_frame, Classification, FrameBody};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_decoded, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;

    if let Classification::Unrecognized(tag) = classify(&bytes) {
        return Err(CliError::new(
            DATA_INVALID,
            format!("decode failed: unrecognized frame type {tag:#04x}"),
        ));
    }
    let frame = decode_frame(&bytes).map_err(|err| frame_error("decode failed", err))?;

    let message = match &frame.body {
        FrameBody::Predefined(msg) => args.role.inbound_catalog().get(msg.msg_id),
        _ => None,
    };
    print_decoded(&frame, message, &bytes, format);
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.strip_prefix("0x").unwrap_or(compact.as_str());
    hex::decode(compact).map_err(|err| CliError::new(USAGE, format!("invalid hex frame: {err}")))
}
