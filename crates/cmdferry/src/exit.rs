use std::fmt;
use std::io;

use cmdferry_channel::ChannelError;
use cmdferry_proto::ProtoError;
use cmdferry_session::SessionError;

// Exit code taxonomy: transfer-layer failures are distinguishable from
// the invoked command's own exit code, which `run` passes through.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const CHANNEL_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const PROTOCOL_ERROR: i32 = 60;
#[allow(dead_code)]
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    match err {
        ChannelError::Io(source) => io_error(context, source),
        ChannelError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(CHANNEL_ERROR, format!("{context}: {other}")),
    }
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    match err {
        ProtoError::Io(source) => io_error(context, source),
        ProtoError::MalformedToken(_) | ProtoError::PayloadTooLarge { .. } => {
            CliError::new(PROTOCOL_ERROR, format!("{context}: {err}"))
        }
        ProtoError::Incomplete { .. } | ProtoError::Closed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Channel(err) => channel_error(context, err),
        SessionError::Proto(err) => proto_error(context, err),
        SessionError::Spawn(source) | SessionError::Wait(source) | SessionError::Shell(source) => {
            io_error(context, source)
        }
        SessionError::CommandNotUtf8 => {
            CliError::new(PROTOCOL_ERROR, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_token_maps_to_protocol_error() {
        let err = proto_error(
            "receive failed",
            ProtoError::MalformedToken("\"abc\"".to_string()),
        );
        assert_eq!(err.code, PROTOCOL_ERROR);
        assert!(err.message.contains("receive failed"));
    }

    #[test]
    fn fifo_create_maps_to_channel_error() {
        let err = channel_error(
            "startup failed",
            ChannelError::FifoCreate {
                path: "/tmp/x.fifo".into(),
                source: io::Error::other("boom"),
            },
        );
        assert_eq!(err.code, CHANNEL_ERROR);
    }

    #[test]
    fn incomplete_transfer_maps_to_failure() {
        let err = proto_error(
            "receive failed",
            ProtoError::Incomplete {
                expected: 10,
                received: 4,
            },
        );
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn permission_denied_is_distinguished() {
        let err = io_error(
            "open failed",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
