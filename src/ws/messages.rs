//! WebSocket frame types for the Bybit v5 stream protocol.
//!
//! Outbound frames are operation requests (`ping`, `auth`, `subscribe`,
//! `unsubscribe`); inbound frames are either operation acknowledgments or
//! topic pushes. Classification uses the discriminator fields the venue
//! provides: `topic` + `data` marks a push, `op` marks a control frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ws::topic::Topic;

/// An outbound operation frame.
///
/// The `args` array is heterogeneous: topic strings for subscribe frames,
/// `[api_key, expires, signature]` for auth frames.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OpRequest {
    /// Operation name (`ping`, `auth`, `subscribe`, `unsubscribe`)
    pub op: &'static str,
    /// Client request id, echoed back in the acknowledgment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req_id: Option<String>,
    /// Operation arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl OpRequest {
    /// Application-level ping frame: `{"op":"ping"}`.
    pub fn ping() -> Self {
        Self {
            op: "ping",
            req_id: None,
            args: Vec::new(),
        }
    }

    /// Authentication frame for the private stream.
    pub fn auth(api_key: &str, expires: u64, signature: &str) -> Self {
        Self {
            op: "auth",
            req_id: None,
            args: vec![
                Value::from(api_key),
                Value::from(expires),
                Value::from(signature),
            ],
        }
    }

    /// Subscribe frame for the given topics.
    pub fn subscribe(req_id: u64, topics: &[Topic]) -> Self {
        Self {
            op: "subscribe",
            req_id: Some(req_id.to_string()),
            args: topics.iter().map(|t| Value::from(t.as_str())).collect(),
        }
    }

    /// Unsubscribe frame for the given topics.
    pub fn unsubscribe(req_id: u64, topics: &[Topic]) -> Self {
        Self {
            op: "unsubscribe",
            req_id: Some(req_id.to_string()),
            args: topics.iter().map(|t| Value::from(t.as_str())).collect(),
        }
    }
}

/// Fields common to every inbound control frame.
#[derive(Debug, Clone, Deserialize)]
struct OpResponse {
    op: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    ret_msg: Option<String>,
    #[serde(default)]
    conn_id: Option<String>,
    #[serde(default)]
    req_id: Option<String>,
}

/// A decoded message pushed for a subscribed topic.
///
/// The payload stays as raw JSON: response-schema modeling is the caller's
/// concern, delivery and ordering are this crate's.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// The topic this message belongs to
    pub topic: Topic,
    /// Push type where the venue provides one (`snapshot`/`delta`)
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    /// Venue timestamp in milliseconds, when provided
    #[serde(default)]
    pub ts: Option<u64>,
    /// Cross sequence number, when provided
    #[serde(rename = "cs", default)]
    pub cross_seq: Option<u64>,
    /// Raw message payload
    pub data: Value,
}

/// A classified inbound frame.
#[derive(Debug, Clone)]
pub(crate) enum InboundFrame {
    /// Pong for an application-level ping. The private stream answers with
    /// `op: "pong"`, the public stream echoes `op: "ping"` with
    /// `ret_msg: "pong"`.
    Pong,
    /// Authentication acknowledgment
    AuthAck {
        success: bool,
        ret_msg: Option<String>,
        conn_id: Option<String>,
    },
    /// Subscribe acknowledgment
    SubscribeAck {
        req_id: Option<String>,
        success: bool,
        ret_msg: Option<String>,
    },
    /// Unsubscribe acknowledgment
    UnsubscribeAck {
        req_id: Option<String>,
        success: bool,
        ret_msg: Option<String>,
    },
    /// Data push for a subscribed topic
    Push(InboundMessage),
    /// Frame that matched no known shape
    Unknown,
}

/// Decode one raw text frame into its classified form.
pub(crate) fn decode_frame(raw: &str) -> Result<InboundFrame, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;

    if value.get("topic").is_some() && value.get("data").is_some() {
        let message: InboundMessage = serde_json::from_value(value)?;
        return Ok(InboundFrame::Push(message));
    }

    if value.get("op").is_some() {
        let ack: OpResponse = serde_json::from_value(value)?;
        if ack.op == "pong" || ack.ret_msg.as_deref() == Some("pong") {
            return Ok(InboundFrame::Pong);
        }
        let frame = match ack.op.as_str() {
            "auth" => InboundFrame::AuthAck {
                success: ack.success.unwrap_or(false),
                ret_msg: ack.ret_msg,
                conn_id: ack.conn_id,
            },
            "subscribe" => InboundFrame::SubscribeAck {
                req_id: ack.req_id,
                success: ack.success.unwrap_or(false),
                ret_msg: ack.ret_msg,
            },
            "unsubscribe" => InboundFrame::UnsubscribeAck {
                req_id: ack.req_id,
                success: ack.success.unwrap_or(false),
                ret_msg: ack.ret_msg,
            },
            _ => InboundFrame::Unknown,
        };
        return Ok(frame);
    }

    Ok(InboundFrame::Unknown)
}
