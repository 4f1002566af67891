use std::os::fd::RawFd;
use std::path::PathBuf;
use std::process::ExitStatus;

use cmdferry_channel::PipeReader;
use cmdferry_proto::{CommandReceiver, ProtoConfig, DEFAULT_MAX_PAYLOAD};
use tracing::debug;

use crate::error::{Result, SessionError};
use crate::exec::execute;

/// Configuration for the consumer role, parsed from the spawn arguments.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Filesystem path of the length FIFO created by the producer.
    pub fifo_path: PathBuf,
    /// Inherited pipe read descriptor carrying the payload.
    pub payload_fd: RawFd,
    /// Maximum payload size accepted by either side.
    pub max_payload: usize,
}

impl ConsumerConfig {
    pub fn new(fifo_path: impl Into<PathBuf>, payload_fd: RawFd) -> Self {
        Self {
            fifo_path: fifo_path.into(),
            payload_fd,
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Drive the consumer role for one transfer.
///
/// Adopts the inherited payload descriptor, receives the command, and
/// executes it, returning the command's exit status.
pub fn run_consumer(config: &ConsumerConfig) -> Result<ExitStatus> {
    // SAFETY: the spawn contract passes ownership of this inherited
    // descriptor to exactly this process; nothing else closes it.
    let payload = unsafe { PipeReader::from_raw_fd(config.payload_fd) };

    let proto_config = ProtoConfig {
        max_payload: config.max_payload,
    };
    let receiver = CommandReceiver::open(&config.fifo_path, payload, proto_config)?;
    let bytes = receiver.recv()?;

    let command = std::str::from_utf8(&bytes).map_err(|_| SessionError::CommandNotUtf8)?;
    debug!(len = bytes.len(), "command received, executing");

    execute(command)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::fd::IntoRawFd;
    use std::path::PathBuf;

    use cmdferry_channel::{BytePipe, LengthFifo};
    use cmdferry_proto::{CommandSender, ProtoConfig, ProtoError};

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("cmdferry-consumer-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Run the consumer in-process against a producer thread.
    fn transfer_and_consume(tag: &str, command: &'static [u8]) -> Result<ExitStatus> {
        let dir = temp_dir(tag);
        let fifo = LengthFifo::create(dir.join("len.fifo")).unwrap();
        let (pipe_reader, pipe_writer) = BytePipe::create().unwrap();

        let producer = std::thread::spawn(move || {
            let sender = CommandSender::open(&fifo, pipe_writer, ProtoConfig::default()).unwrap();
            sender.send(command).unwrap();
            fifo
        });

        let config = ConsumerConfig::new(dir.join("len.fifo"), pipe_reader.into_raw_fd());
        let result = run_consumer(&config);

        drop(producer.join().unwrap());
        let _ = std::fs::remove_dir_all(&dir);
        result
    }

    #[test]
    fn executes_received_command_and_surfaces_status() {
        let status = transfer_and_consume("exit-code", b"exit 7").unwrap();
        assert_eq!(status.code(), Some(7));
    }

    #[test]
    fn empty_command_executes_as_no_op() {
        let status = transfer_and_consume("empty", b"").unwrap();
        assert!(status.success());
    }

    #[test]
    fn malformed_token_aborts_before_execution() {
        let dir = temp_dir("bad-token");
        let fifo = LengthFifo::create(dir.join("len.fifo")).unwrap();
        let (pipe_reader, _pipe_writer) = BytePipe::create().unwrap();

        let producer = std::thread::spawn(move || {
            let mut writer = fifo.open_writer().unwrap();
            writer.write_all(b"not-a-number").unwrap();
            drop(writer);
            fifo
        });

        let config = ConsumerConfig::new(dir.join("len.fifo"), pipe_reader.into_raw_fd());
        let err = run_consumer(&config).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Proto(ProtoError::MalformedToken(_))
        ));

        drop(producer.join().unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        let status = transfer_and_consume("non-utf8", b"\xff\xfe\x00");
        assert!(matches!(status, Err(SessionError::CommandNotUtf8)));
    }
}
