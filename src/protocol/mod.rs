//! Wire protocol module.
//!
//! Defines the response type, the binary codec, and message framing for
//! socket communication.
//!
//! ## Wire Format
//!
//! Frames are length-prefixed postcard:
//! ```text
//! [4 bytes: length (big-endian u32)][postcard payload]
//! ```
//!
//! Outbound frames carry a [`ReplResponse`]; inbound frames carry a single
//! command string. Both peers agree on this format out of band; there is no
//! negotiation step.

mod codec;
mod response;
mod wire;

pub use codec::{decode_command, decode_response, encode_command, encode_response};
pub use response::{ReplResponse, ResponseStatus};
pub use wire::{read_frame, read_frame_with_timeout, write_frame, DEFAULT_MAX_FRAME_SIZE};
