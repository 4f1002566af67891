//! Producer/consumer process lifecycle for cmdferry.
//!
//! The producer creates both channels, relaunches its own executable in
//! the consumer role with the endpoints pre-established (FIFO path by
//! name, pipe read end by inherited descriptor), drives the send half of
//! the transfer protocol, and waits for the consumer. The consumer adopts
//! its endpoints, drives the receive half, and hands the command to the
//! executor.
//!
//! The split is spawn-based rather than a bare `fork()`: each role has
//! its own entry point, and the role a process takes is decided by how it
//! was invoked, not by branching on a duplication return value.

pub mod consumer;
pub mod error;
pub mod exec;
pub mod producer;
pub mod spawn;

pub use consumer::{run_consumer, ConsumerConfig};
pub use error::{Result, SessionError};
pub use exec::execute;
pub use producer::{run_producer, ProducerConfig, TransferReport};
pub use spawn::{consumer_args, spawn_consumer, ConsumerHandle, CONSUMER_SUBCOMMAND};
