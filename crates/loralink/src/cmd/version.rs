use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("loralink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: loralink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LORALINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("LORALINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "wire: max_frame={} max_custom={}",
        loralink_frame::MAX_FRAME_SIZE,
        loralink_frame::MAX_CUSTOM_LEN
    );
    println!(
        "features: station={}, cli=true",
        cfg!(feature = "station")
    );

    Ok(SUCCESS)
}
