//! Messenger wire types: webhook envelope, messaging events, outbound messages and API replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A page-scoped user or page id (`{ "id": "..." }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Accepts `{ "id": "123" }` and `{ "id": 123 }`; anything else is not an identity.
    fn from_value(v: &Value) -> Option<Self> {
        match v.get("id")? {
            Value::String(s) => Some(Self::new(s.clone())),
            Value::Number(n) => Some(Self::new(n.to_string())),
            _ => None,
        }
    }
}

/// Webhook POST body: `{ "object": "page", "entry": [ { "messaging": [...] } ] }`.
///
/// Inbound payloads are read through [`crate::webhook::extract_events`], which tolerates any
/// shape; this type is for building well-formed payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

impl WebhookEnvelope {
    /// Page envelope with one entry holding `events`.
    pub fn page(events: Vec<MessagingEvent>) -> Self {
        Self {
            object: Some("page".to_string()),
            entry: vec![Entry {
                messaging: events,
                ..Entry::default()
            }],
        }
    }
}

/// One messaging event exactly as the platform sent it.
///
/// The raw JSON is kept untouched (message, postback, delivery, read, ...); accessors read the
/// fields the dispatcher cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessagingEvent(Value);

impl MessagingEvent {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Text message event from `sender_id`.
    pub fn text(sender_id: &str, text: &str) -> Self {
        Self(serde_json::json!({
            "sender": { "id": sender_id },
            "message": { "text": text }
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn sender(&self) -> Option<Identity> {
        self.0.get("sender").and_then(Identity::from_value)
    }

    pub fn recipient(&self) -> Option<Identity> {
        self.0.get("recipient").and_then(Identity::from_value)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.0.get("timestamp").and_then(Value::as_i64)
    }

    pub fn message(&self) -> Option<&Value> {
        self.0.get("message")
    }

    /// `message.text` when present. An empty string still counts; a non-string value is
    /// rendered as JSON text. `null` is treated as absent.
    pub fn message_text(&self) -> Option<Cow<'_, str>> {
        match self.message()?.get("text")? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

/// Send API request body: `{ "recipient": {...}, "message": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: Identity,
    pub message: Value,
}

impl OutboundMessage {
    pub fn text(recipient: Identity, text: &str) -> Self {
        Self {
            recipient,
            message: serde_json::json!({ "text": text }),
        }
    }
}

/// Send API success reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// User profile fields returned by the Graph API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub timezone: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
}
