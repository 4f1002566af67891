use std::fs::File;
use std::io::{ErrorKind, Write};

use cmdferry_channel::{ChannelError, LengthFifo, PipeWriter};
use tracing::debug;

use crate::error::{ProtoError, Result};
use crate::token::{encode_length, ProtoConfig};

/// Producer half of the transfer protocol.
///
/// Owns the write ends of both channels. `send` consumes the sender: the
/// protocol carries exactly one command per channel pair lifetime.
pub struct CommandSender<L: Write, P: Write> {
    length: L,
    payload: P,
    config: ProtoConfig,
}

impl<L: Write, P: Write> CommandSender<L, P> {
    /// Create a sender with default configuration.
    pub fn new(length: L, payload: P) -> Self {
        Self::with_config(length, payload, ProtoConfig::default())
    }

    /// Create a sender with explicit configuration.
    pub fn with_config(length: L, payload: P, config: ProtoConfig) -> Self {
        Self {
            length,
            payload,
            config,
        }
    }

    /// Transfer one command: token over the length channel, then the raw
    /// bytes over the payload channel.
    ///
    /// The length half is closed between the two writes; its end-of-stream
    /// is what delimits the token for the consumer.
    pub fn send(self, command: &[u8]) -> Result<()> {
        if command.len() > self.config.max_payload {
            return Err(ProtoError::PayloadTooLarge {
                size: command.len(),
                max: self.config.max_payload,
            });
        }

        let Self {
            mut length,
            mut payload,
            ..
        } = self;

        let token = encode_length(command.len());
        write_full(&mut length, token.as_bytes())?;
        flush_full(&mut length)?;
        drop(length);
        debug!(len = command.len(), token = %token, "length token sent");

        write_full(&mut payload, command)?;
        flush_full(&mut payload)?;
        debug!("payload sent");

        Ok(())
    }
}

impl CommandSender<File, PipeWriter> {
    /// Open the send halves over concrete channel endpoints.
    ///
    /// Blocks on the FIFO open until the consumer has attached its read
    /// end — the transfer's rendezvous.
    pub fn open(fifo: &LengthFifo, payload: PipeWriter, config: ProtoConfig) -> Result<Self> {
        let length = fifo.open_writer().map_err(channel_to_proto_error)?;
        Ok(Self::with_config(length, payload, config))
    }
}

/// Write the whole buffer, retrying short writes.
fn write_full<W: Write>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match writer.write(&buf[offset..]) {
            Ok(0) => return Err(ProtoError::Closed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }
    Ok(())
}

fn flush_full<W: Write>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }
}

fn channel_to_proto_error(err: ChannelError) -> ProtoError {
    match err {
        ChannelError::Io(io) | ChannelError::PipeCreate(io) => ProtoError::Io(io),
        ChannelError::FifoCreate { source, .. } | ChannelError::FifoOpen { source, .. } => {
            ProtoError::Io(source)
        }
        ChannelError::Closed => ProtoError::Closed,
    }
}
