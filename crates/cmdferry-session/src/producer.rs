use std::path::PathBuf;
use std::process::ExitStatus;

use cmdferry_channel::{BytePipe, LengthFifo};
use cmdferry_proto::{encode_length, CommandSender, ProtoConfig, DEFAULT_MAX_PAYLOAD};
use tracing::{debug, info};

use crate::error::Result;
use crate::spawn::spawn_consumer;

/// Configuration for the producer role.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Filesystem path of the length FIFO to create for this transfer.
    pub fifo_path: PathBuf,
    /// Maximum payload size accepted by either side.
    pub max_payload: usize,
}

impl ProducerConfig {
    pub fn new(fifo_path: impl Into<PathBuf>) -> Self {
        Self {
            fifo_path: fifo_path.into(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Outcome of a completed transfer, as observed by the producer.
#[derive(Debug, Clone, Copy)]
pub struct TransferReport {
    /// Byte length of the transferred command.
    pub payload_len: usize,
    /// Process id of the consumer that executed it.
    pub consumer_pid: u32,
    /// The consumer's exit status (the invoked command's, surfaced).
    pub status: ExitStatus,
}

impl TransferReport {
    /// The consumer's exit code, `-1` if it was terminated by a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }
}

/// Drive the producer role for one transfer.
///
/// Creates both channels, spawns the consumer with the endpoints
/// pre-established, sends the command, and waits for the consumer to
/// finish. The FIFO entry is unlinked when this function returns, on
/// success and error paths alike.
pub fn run_producer(command: &str, config: &ProducerConfig) -> Result<TransferReport> {
    let fifo = LengthFifo::create(&config.fifo_path)?;
    let (pipe_reader, pipe_writer) = BytePipe::create()?;

    // The consumer must inherit only the read end; with a write-end copy
    // in the child, the payload read loop could never observe EOF.
    pipe_writer.set_cloexec()?;

    let consumer = spawn_consumer(fifo.path(), pipe_reader, config.max_payload)?;
    let consumer_pid = consumer.id();

    let proto_config = ProtoConfig {
        max_payload: config.max_payload,
    };
    let sender = CommandSender::open(&fifo, pipe_writer, proto_config)?;

    debug!(
        len = command.len(),
        token = %encode_length(command.len()),
        consumer_pid,
        "transfer starting"
    );
    sender.send(command.as_bytes())?;

    let status = consumer.wait()?;
    info!(consumer_pid, code = status.code(), "consumer finished");

    Ok(TransferReport {
        payload_len: command.len(),
        consumer_pid,
        status,
    })
}
