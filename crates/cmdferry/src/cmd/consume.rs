use cmdferry_session::{run_consumer, ConsumerConfig};

use crate::cmd::ConsumeArgs;
use crate::exit::{session_error, CliResult};

pub fn run(args: ConsumeArgs) -> CliResult<i32> {
    let config = ConsumerConfig {
        fifo_path: args.length_fifo,
        payload_fd: args.payload_fd,
        max_payload: args.max_payload,
    };

    let status =
        run_consumer(&config).map_err(|err| session_error("receive failed", err))?;

    // Exit with the invoked command's code so the producer's wait sees it.
    Ok(status.code().unwrap_or(-1))
}
