//! Two-channel length-prefixed command transfer.
//!
//! This is the core value-add layer of cmdferry. A single command string
//! travels from producer to consumer over two independent channels:
//!
//! - The **length channel** carries the payload's byte length as decimal
//!   text (the length token), delimited by the producer closing its end.
//! - The **payload channel** carries the raw command bytes, which the
//!   consumer reads into a buffer sized exactly by the decoded token.
//!
//! Sequencing, producer side: compute length → send token → close length
//! half → send payload → done. Consumer side: read token to end-of-stream
//! → parse and bound-check → read exactly that many payload bytes → hand
//! off. The token is always fully consumed before the payload read
//! begins, so the receive buffer is never sized from partial data.
//!
//! Short reads and short writes are handled internally — callers always
//! see a complete transfer or an error.

pub mod error;
pub mod recv;
pub mod send;
pub mod token;

pub use error::{ProtoError, Result};
pub use recv::CommandReceiver;
pub use send::CommandSender;
pub use token::{decode_length, encode_length, ProtoConfig, DEFAULT_MAX_PAYLOAD, MAX_TOKEN_LEN};
