//! Wire frames exchanged with clients.
//!
//! ```text
//! Inbound:  { "op": 1, "data": { "event": <string>, "data": <payload> } }
//! Outbound: { "op": <1|2>, "data": <EventResponse or raw payload> }
//! ```
//!
//! `op = 1` carries request/response traffic; `op = 2` is an unsolicited push
//! that is not tied to a request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::response::EventResponse;

/// Outbound frame opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OpCode {
    /// Request/response envelope.
    ServerEvent,
    /// Unsolicited push.
    Push,
}

impl OpCode {
    /// Numeric value on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            OpCode::ServerEvent => 1,
            OpCode::Push => 2,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op.as_u8()
    }
}

impl TryFrom<u8> for OpCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::ServerEvent),
            2 => Ok(OpCode::Push),
            other => Err(format!("unknown opcode {}", other)),
        }
    }
}

/// A frame as received from a client.
///
/// The opcode is kept raw so frames with opcodes this server does not route
/// still parse and can be ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub op: i64,
    #[serde(default)]
    pub data: Value,
}

impl InboundFrame {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// True for frames routed through the event dispatcher.
    pub fn is_server_event(&self) -> bool {
        self.op == i64::from(OpCode::ServerEvent.as_u8())
    }

    /// Extract the named event carried by a server event frame.
    pub fn into_event(self) -> Result<InboundEvent, serde_json::Error> {
        serde_json::from_value(self.data)
    }
}

/// A named event with its still-undecoded payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundEvent {
    /// Create an event from a name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// A frame sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub op: OpCode,
    pub data: Value,
}

impl OutboundFrame {
    /// Wrap an event response in an `op = 1` frame.
    pub fn response(response: &EventResponse) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::ServerEvent,
            data: serde_json::to_value(response)?,
        })
    }

    /// Wrap a raw payload in an `op = 2` push frame.
    pub fn push<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            op: OpCode::Push,
            data: serde_json::to_value(payload)?,
        })
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbound_frame_exposes_event() {
        let frame = InboundFrame::parse(
            r#"{"op": 1, "data": {"event": "LOGIN_USER", "data": {"firebase_id": "fb"}}}"#,
        )
        .unwrap();
        assert!(frame.is_server_event());

        let event = frame.into_event().unwrap();
        assert_eq!(event.event, "LOGIN_USER");
        assert_eq!(event.data, json!({"firebase_id": "fb"}));
    }

    #[test]
    fn inbound_frame_with_other_opcode_still_parses() {
        let frame = InboundFrame::parse(r#"{"op": 7}"#).unwrap();
        assert!(!frame.is_server_event());
        assert_eq!(frame.data, Value::Null);
    }

    #[test]
    fn inbound_event_without_name_is_rejected() {
        let frame = InboundFrame::parse(r#"{"op": 1, "data": {"data": {}}}"#).unwrap();
        assert!(frame.into_event().is_err());
    }

    #[test]
    fn response_frame_uses_opcode_one() {
        let frame = OutboundFrame::response(&EventResponse::success("MARK_AS_READ", json!({})))
            .unwrap();
        let json: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["op"], 1);
        assert_eq!(json["data"]["event"], "MARK_AS_READ");
        assert_eq!(json["data"]["success"], true);
    }

    #[test]
    fn push_frame_carries_raw_payload() {
        let frame = OutboundFrame::push(&json!({"content": "hi"})).unwrap();
        let json: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json, json!({"op": 2, "data": {"content": "hi"}}));
    }

    #[test]
    fn opcode_rejects_unknown_values() {
        assert!(OpCode::try_from(3).is_err());
        assert_eq!(OpCode::try_from(2), Ok(OpCode::Push));
    }
}
