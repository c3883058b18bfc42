//! collab-protocol
//!
//! Wire-level encoding/decoding for the collaboration server.
//!
//! This crate is responsible for turning logical messages
//! (`collab_core::InboundMessage` / `OutboundMessage`) into UTF-8 JSON
//! text frames and back again.
//!
//! - [`wire_types`] : the `type` tags used on the wire
//! - [`json_codec`] : envelope parsing and serialization

pub mod wire_types;
pub mod json_codec;

pub use wire_types::WireKind;
pub use json_codec::{
    ProtocolError,
    decode_inbound,
    encode_inbound,
    encode_outbound,
};
