//! Error types for the webhook pipeline, the outbound sender and credential setup.

use axum::http::StatusCode;
use thiserror::Error;

/// Request body could not be turned into a JSON value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of one inbound webhook delivery. Carried by the "error" notification.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An app secret is configured but the request has no signature header.
    #[error("missing X-Hub-Signature-256 header")]
    MissingSignature,

    #[error("payload signature does not match")]
    SignatureMismatch,
}

impl WebhookError {
    /// Status sent back to the platform for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Decode(_) => StatusCode::BAD_REQUEST,
            WebhookError::MissingSignature | WebhookError::SignatureMismatch => {
                StatusCode::FORBIDDEN
            }
        }
    }
}

/// Outbound call to the platform failed.
#[derive(Debug, Error)]
pub enum SendError {
    /// Network or HTTP client failure. The request URL is stripped so the access token never shows up.
    #[error("request to messenger platform failed: {0}")]
    Transport(reqwest::Error),

    /// Platform answered with a non-2xx status or an `error` object.
    #[error("messenger platform returned {status}: {message}")]
    Platform { status: u16, message: String },

    #[error("unexpected response from messenger platform: {0}")]
    InvalidResponse(serde_json::Error),
}

impl From<reqwest::Error> for SendError {
    fn from(e: reqwest::Error) -> Self {
        SendError::Transport(e.without_url())
    }
}

/// A required secret was missing or empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("missing verify token (set messenger.verifyToken or MESSENGER_VERIFY_TOKEN)")]
    MissingVerifyToken,

    #[error("missing page access token (set messenger.pageAccessToken or MESSENGER_PAGE_ACCESS_TOKEN)")]
    MissingAccessToken,
}
