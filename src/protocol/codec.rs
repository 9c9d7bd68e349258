//! Binary codec shared by both directions of the transport.
//!
//! Postcard is used for the frame payloads: responses out, command strings
//! in. Strings are varint-length-prefixed inside the payload, so partial
//! reads can never misinterpret a boundary and no text delimiters exist
//! anywhere in the format.

use crate::error::ReplResult;
use crate::protocol::ReplResponse;

/// Encode a response for the outbound direction.
pub fn encode_response(response: &ReplResponse) -> ReplResult<Vec<u8>> {
    Ok(postcard::to_stdvec(response)?)
}

/// Decode a response (client side of the wire).
pub fn decode_response(bytes: &[u8]) -> ReplResult<ReplResponse> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Encode a command string for the inbound direction.
pub fn encode_command(command: &str) -> ReplResult<Vec<u8>> {
    Ok(postcard::to_stdvec(command)?)
}

/// Decode a command string.
pub fn decode_command(bytes: &[u8]) -> ReplResult<String> {
    Ok(postcard::from_bytes(bytes)?)
}
