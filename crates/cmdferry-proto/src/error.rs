/// Errors that can occur during a command transfer.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The length token is not a decimal number. Indicates protocol
    /// desynchronization; the transfer must be abandoned.
    #[error("malformed length token: {0}")]
    MalformedToken(String),

    /// The declared or requested payload exceeds the configured bound.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload channel ended before the declared byte count arrived.
    #[error("incomplete transfer ({received} of {expected} bytes)")]
    Incomplete { expected: usize, received: usize },

    /// The peer closed a channel before the transfer completed.
    #[error("channel closed before transfer completed")]
    Closed,

    /// An I/O error occurred on one of the channels.
    #[error("transfer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
