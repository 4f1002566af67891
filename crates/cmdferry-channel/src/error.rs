use std::path::PathBuf;

/// Errors that can occur while creating or opening channel endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The kernel could not allocate an anonymous pipe.
    #[error("failed to allocate pipe: {0}")]
    PipeCreate(std::io::Error),

    /// The named FIFO could not be created.
    #[error("failed to create fifo at {path}: {source}")]
    FifoCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The named FIFO could not be opened.
    #[error("failed to open fifo at {path}: {source}")]
    FifoOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on a channel endpoint.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed its end of the channel.
    #[error("channel closed by peer")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ChannelError>;
