//! Subscription handshake (GET) and optional payload signature check (POST).

use crate::credentials::Credentials;
use crate::error::WebhookError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;

pub const VERIFY_TOKEN_PARAM: &str = "hub.verify_token";
pub const CHALLENGE_PARAM: &str = "hub.challenge";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Body sent (with 200) when the verify token does not match.
pub const WRONG_TOKEN_BODY: &str = "Error, wrong validation token";

/// Outcome of a GET handshake. Both variants are answered with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Token matched; echo the challenge.
    Confirmed(String),
    Mismatch,
}

impl Verification {
    pub fn into_body(self) -> String {
        match self {
            Verification::Confirmed(challenge) => challenge,
            Verification::Mismatch => WRONG_TOKEN_BODY.to_string(),
        }
    }
}

/// Exact comparison of `hub.verify_token` against the stored token. A missing challenge echoes as empty.
pub fn verify_subscription(
    credentials: &Credentials,
    query: &HashMap<String, String>,
) -> Verification {
    match query.get(VERIFY_TOKEN_PARAM) {
        Some(token) if token == credentials.verify_token() => Verification::Confirmed(
            query.get(CHALLENGE_PARAM).cloned().unwrap_or_default(),
        ),
        _ => Verification::Mismatch,
    }
}

/// Check `X-Hub-Signature-256: sha256=<hex>` against HMAC-SHA256(app_secret, body).
pub fn verify_signature(
    app_secret: &str,
    body: &[u8],
    header: Option<&str>,
) -> Result<(), WebhookError> {
    let header = header.ok_or(WebhookError::MissingSignature)?;
    let expected = header
        .trim()
        .strip_prefix("sha256=")
        .and_then(|h| hex::decode(h).ok())
        .ok_or(WebhookError::SignatureMismatch)?;
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .map_err(|_| WebhookError::SignatureMismatch)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::SignatureMismatch)
}
