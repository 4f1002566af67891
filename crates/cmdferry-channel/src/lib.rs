//! Kernel channel endpoints for cmdferry.
//!
//! Two transports, one per concern:
//! - [`BytePipe`]: an anonymous pipe carrying the raw command payload
//!   between the producer and its spawned consumer.
//! - [`LengthFifo`]: a named FIFO carrying the decimal length token, so
//!   the consumer can size its payload read exactly.
//!
//! This is the lowest layer of cmdferry. The transfer protocol in
//! `cmdferry-proto` builds on the endpoint types provided here.

pub mod error;

#[cfg(unix)]
pub mod fifo;
#[cfg(unix)]
pub mod pipe;

pub use error::{ChannelError, Result};

#[cfg(unix)]
pub use fifo::LengthFifo;
#[cfg(unix)]
pub use pipe::{BytePipe, PipeReader, PipeWriter};
