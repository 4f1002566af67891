use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::{Bytes, BytesMut};
use cmdferry_channel::{ChannelError, LengthFifo, PipeReader};
use tracing::debug;

use crate::error::{ProtoError, Result};
use crate::token::{decode_length, token_preview, ProtoConfig, MAX_TOKEN_LEN};

const TOKEN_CHUNK_SIZE: usize = 64;

/// Consumer half of the transfer protocol.
///
/// Owns the read ends of both channels. `recv` consumes the receiver:
/// one transfer per channel pair lifetime.
pub struct CommandReceiver<L: Read, P: Read> {
    length: L,
    payload: P,
    config: ProtoConfig,
}

impl<L: Read, P: Read> CommandReceiver<L, P> {
    /// Create a receiver with default configuration.
    pub fn new(length: L, payload: P) -> Self {
        Self::with_config(length, payload, ProtoConfig::default())
    }

    /// Create a receiver with explicit configuration.
    pub fn with_config(length: L, payload: P, config: ProtoConfig) -> Self {
        Self {
            length,
            payload,
            config,
        }
    }

    /// Receive one command: token first, then exactly the declared number
    /// of payload bytes.
    ///
    /// The token read blocks until the producer has written and closed the
    /// length channel, so the payload buffer is never sized from a partial
    /// token.
    pub fn recv(self) -> Result<Bytes> {
        let Self {
            mut length,
            mut payload,
            config,
        } = self;

        let expected = read_token(&mut length, &config)?;
        drop(length);
        debug!(len = expected, "length token received");

        let command = read_exact_payload(&mut payload, expected)?;
        debug!("payload received");

        Ok(command)
    }
}

impl CommandReceiver<File, PipeReader> {
    /// Open the receive halves over concrete channel endpoints.
    ///
    /// Blocks on the FIFO open until the producer has attached its write
    /// end — the transfer's rendezvous.
    pub fn open(fifo_path: &Path, payload: PipeReader, config: ProtoConfig) -> Result<Self> {
        let length = LengthFifo::open_reader(fifo_path).map_err(channel_to_proto_error)?;
        Ok(Self::with_config(length, payload, config))
    }
}

/// Read the length token to end-of-stream and decode it.
fn read_token<L: Read>(length: &mut L, config: &ProtoConfig) -> Result<usize> {
    let mut token = Vec::with_capacity(MAX_TOKEN_LEN);
    let mut chunk = [0u8; TOKEN_CHUNK_SIZE];

    loop {
        match length.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                token.extend_from_slice(&chunk[..n]);
                if token.len() > MAX_TOKEN_LEN {
                    return Err(ProtoError::MalformedToken(token_preview(&token)));
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }

    decode_length(&token, config.max_payload)
}

/// Accumulate exactly `expected` payload bytes across short reads.
///
/// The buffer is allocated only after `decode_length` has bound-checked
/// `expected`.
fn read_exact_payload<P: Read>(payload: &mut P, expected: usize) -> Result<Bytes> {
    let mut buf = BytesMut::zeroed(expected);
    let mut received = 0usize;

    while received < expected {
        match payload.read(&mut buf[received..]) {
            Ok(0) => return Err(ProtoError::Incomplete { expected, received }),
            Ok(n) => received += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }

    Ok(buf.freeze())
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
