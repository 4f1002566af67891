/// Errors that can occur while running a transfer session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Channel endpoint creation or opening failed.
    #[error("channel error: {0}")]
    Channel(#[from] cmdferry_channel::ChannelError),

    /// The transfer protocol failed mid-flight.
    #[error("transfer error: {0}")]
    Proto(#[from] cmdferry_proto::ProtoError),

    /// The consumer process could not be spawned.
    #[error("failed to spawn consumer process: {0}")]
    Spawn(std::io::Error),

    /// Waiting on the consumer process failed.
    #[error("failed waiting for consumer process: {0}")]
    Wait(std::io::Error),

    /// The command interpreter itself could not be invoked.
    #[error("failed to invoke command interpreter: {0}")]
    Shell(std::io::Error),

    /// The received payload is not valid UTF-8 and cannot be a shell
    /// command.
    #[error("received command is not valid UTF-8")]
    CommandNotUtf8,
}

pub type Result<T> = std::result::Result<T, SessionError>;
