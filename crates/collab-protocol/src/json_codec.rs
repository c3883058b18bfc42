//! JSON envelope codec.
//!
//! Input format (text frame → `InboundMessage`):
//!
//! - Join:
//!   `{"type": "userevent", "username": <string>, ...other profile fields}`
//!
//! - Content change:
//!   `{"type": "contentchange", "content": <string>}`
//!
//! Output format (`OutboundMessage` → text frame):
//!
//! - Presence:
//!   `{"type": "userevent", "data": {"users": {id: profile, ...}, "userActivity": [..]}}`
//!
//! - Content:
//!   `{"type": "contentchange", "data": {"editorContent": <string>, "userActivity": [..]}}`
//!
//! The tag is checked once here; nothing downstream ever sees an unknown
//! kind or a half-filled envelope.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use collab_core::{InboundMessage, OutboundMessage, UserProfile};

use crate::wire_types::WireKind;

const TYPE_FIELD: &str = "type";
const USERNAME_FIELD: &str = "username";
const CONTENT_FIELD: &str = "content";

/// Errors that can occur while decoding or encoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("malformed JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Valid JSON, but not an object.
    #[error("envelope is not a JSON object")]
    NotAnObject,

    /// No string `type` field.
    #[error("envelope has no string `type` field")]
    MissingType,

    /// A well-formed envelope with a `type` we do not handle.
    #[error("unrecognized message type {0:?}")]
    UnrecognizedKind(String),

    /// A required payload field is missing or not a string.
    #[error("missing or non-string field `{0}`")]
    MissingField(&'static str),

    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ProtocolError {
    /// Whether the sender broke the envelope contract badly enough to be
    /// disconnected. Only an unknown tag on an otherwise valid envelope
    /// is survivable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProtocolError::UnrecognizedKind(_))
    }
}

/// Parse a single text frame into an `InboundMessage`.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text).map_err(ProtocolError::Json)?;

    let Value::Object(mut fields) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let tag = match fields.remove(TYPE_FIELD) {
        Some(Value::String(tag)) => tag,
        _ => return Err(ProtocolError::MissingType),
    };

    match WireKind::from_tag(&tag) {
        Some(WireKind::UserEvent) => {
            let username = take_string(&mut fields, USERNAME_FIELD)?;
            // Whatever else the client sent is part of its profile.
            Ok(InboundMessage::join(UserProfile {
                username,
                extra: fields,
            }))
        }
        Some(WireKind::ContentChange) => {
            let content = take_string(&mut fields, CONTENT_FIELD)?;
            Ok(InboundMessage::content_change(content))
        }
        None => Err(ProtocolError::UnrecognizedKind(tag)),
    }
}

/// Serialize an `OutboundMessage` into its text frame.
pub fn encode_outbound(msg: &OutboundMessage) -> Result<String, ProtocolError> {
    let envelope = OutboundEnvelope {
        kind: WireKind::of_outbound(msg).as_tag(),
        data: msg,
    };
    serde_json::to_string(&envelope).map_err(ProtocolError::Encode)
}

/// Serialize an `InboundMessage` the way a client would send it.
///
/// Used by tools and tests that play the client side.
pub fn encode_inbound(msg: &InboundMessage) -> Result<String, ProtocolError> {
    let mut fields = Map::new();
    fields.insert(
        TYPE_FIELD.to_string(),
        Value::from(WireKind::of_inbound(msg).as_tag()),
    );

    match msg {
        InboundMessage::PresenceJoin(join) => {
            for (key, value) in &join.profile.extra {
                fields.insert(key.clone(), value.clone());
            }
            fields.insert(
                USERNAME_FIELD.to_string(),
                Value::from(join.profile.username.as_str()),
            );
        }
        InboundMessage::ContentChange(change) => {
            fields.insert(
                CONTENT_FIELD.to_string(),
                Value::from(change.content.as_str()),
            );
        }
    }

    serde_json::to_string(&Value::Object(fields)).map_err(ProtocolError::Encode)
}

#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a OutboundMessage,
}

fn take_string(fields: &mut Map<String, Value>, key: &'static str) -> Result<String, ProtocolError> {
    match fields.remove(key) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(ProtocolError::MissingField(key)),
    }
}
