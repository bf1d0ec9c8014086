//! Messenger Send API client: one authenticated HTTP call per outgoing message.

use crate::credentials::Credentials;
use crate::error::SendError;
use crate::messenger::protocol::{Identity, OutboundMessage, SendResponse, UserProfile};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v2.6";

const PROFILE_FIELDS: &str = "first_name,last_name,profile_pic,locale,timezone,gender";

/// Outbound side of the bot. Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct MessengerClient {
    client: reqwest::Client,
    api_base: String,
    credentials: Arc<Credentials>,
}

impl MessengerClient {
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            credentials,
        }
    }

    /// Point the client at another Graph API base (e.g. a newer version or a local mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Send a plain text message to `user`.
    pub async fn send(&self, user: &Identity, text: &str) -> Result<SendResponse, SendError> {
        self.send_message(&OutboundMessage::text(user.clone(), text))
            .await
    }

    /// POST an arbitrary message body to `/me/messages`. No retry.
    pub async fn send_message(&self, message: &OutboundMessage) -> Result<SendResponse, SendError> {
        let url = format!("{}/me/messages", self.api_base);
        let res = self
            .client
            .post(&url)
            .query(&[("access_token", self.credentials.access_token())])
            .json(message)
            .send()
            .await?;
        let reply = read_reply(res).await?;
        log::debug!(
            "messenger: sent message to {}",
            message.recipient.id
        );
        Ok(reply)
    }

    /// Fetch a user's public profile fields.
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, SendError> {
        let url = format!("{}/{}", self.api_base, user_id);
        let res = self
            .client
            .get(&url)
            .query(&[
                ("fields", PROFILE_FIELDS),
                ("access_token", self.credentials.access_token()),
            ])
            .send()
            .await?;
        read_reply(res).await
    }
}

/// Non-2xx status or a body with an `error` object is a platform failure.
async fn read_reply<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, SendError> {
    let status = res.status();
    let body = res.text().await?;
    let parsed = serde_json::from_str::<Value>(&body);
    if let Some(err) = parsed.as_ref().ok().and_then(|v| v.get("error")) {
        return Err(SendError::Platform {
            status: status.as_u16(),
            message: platform_error_message(err),
        });
    }
    if !status.is_success() {
        return Err(SendError::Platform {
            status: status.as_u16(),
            message: body,
        });
    }
    let value = parsed.map_err(SendError::InvalidResponse)?;
    serde_json::from_value(value).map_err(SendError::InvalidResponse)
}

/// Graph errors look like `{ "message": "...", "type": "OAuthException", "code": 190 }`.
fn platform_error_message(err: &Value) -> String {
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    match err.get("code").and_then(Value::as_i64) {
        Some(code) => format!("{} (code {})", message, code),
        None => message,
    }
}
