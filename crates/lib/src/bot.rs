//! The bot: runs each inbound request through the webhook pipeline and republishes
//! what it finds as notifications.
//!
//! GET requests are subscription handshakes. Every other method is a delivery: the body is
//! (optionally) signature-checked, decoded, and its messaging events dispatched. Exactly one
//! response comes back per request: 200 for handshakes and deliveries, 400 for undecodable
//! bodies, 403 for bad signatures.

use crate::credentials::Credentials;
use crate::error::{SendError, WebhookError};
use crate::events::{EventBus, TextMessage};
use crate::messenger::{Identity, MessagingEvent, MessengerClient, SendResponse};
use crate::webhook::{self, Verification};
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Arc;

/// One HTTP request as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    /// GET handshake with the given query parameters.
    pub fn verification(query: &[(&str, &str)]) -> Self {
        Self {
            method: Method::GET,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// POST delivery with `body`.
    pub fn delivery(body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Status and plain-text body sent back to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: String,
}

impl WebhookResponse {
    fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            body: String::new(),
        }
    }
}

impl From<Verification> for WebhookResponse {
    fn from(v: Verification) -> Self {
        Self {
            status: StatusCode::OK,
            body: v.into_body(),
        }
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        (self.status, self.body).into_response()
    }
}

pub struct Bot {
    credentials: Arc<Credentials>,
    events: EventBus,
    client: MessengerClient,
}

impl Bot {
    pub fn new(credentials: Credentials) -> Self {
        let credentials = Arc::new(credentials);
        Self {
            client: MessengerClient::new(credentials.clone()),
            credentials,
            events: EventBus::new(),
        }
    }

    /// Use another Graph API base for outbound calls.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.client = self.client.with_api_base(api_base);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn client(&self) -> &MessengerClient {
        &self.client
    }

    /// Subscribe to "receive": the full event batch of a delivery, once per request.
    pub fn on_receive<F>(&mut self, handler: F)
    where
        F: Fn(&[MessagingEvent]) + Send + Sync + 'static,
    {
        self.events.on_receive(handler);
    }

    /// Subscribe to "message": one call per event carrying `message.text`.
    pub fn on_message<F>(&mut self, handler: F)
    where
        F: Fn(&TextMessage) + Send + Sync + 'static,
    {
        self.events.on_message(handler);
    }

    /// Subscribe to "error": deliveries that could not be decoded or authenticated.
    pub fn on_error<F>(&mut self, handler: F)
    where
        F: Fn(&WebhookError) + Send + Sync + 'static,
    {
        self.events.on_error(handler);
    }

    /// Send a text message to `user` via the Send API.
    pub async fn send(&self, user: &Identity, text: &str) -> Result<SendResponse, SendError> {
        self.client.send(user, text).await
    }

    /// Run one request through the pipeline. Never panics on bad input; always returns a response.
    pub fn handle(&self, request: InboundRequest) -> WebhookResponse {
        if request.method == Method::GET {
            let verification = webhook::verify_subscription(&self.credentials, &request.query);
            match verification {
                Verification::Confirmed(_) => log::info!("webhook: subscription verified"),
                Verification::Mismatch => log::warn!("webhook: verification failed, wrong verify token"),
            }
            return verification.into();
        }

        match self.accept(&request) {
            Ok(events) => {
                self.dispatch(&events);
                WebhookResponse::ok()
            }
            Err(e) => {
                log::warn!("webhook: rejected {} delivery: {}", request.method, e);
                let status = e.status();
                self.events.emit_error(&e);
                WebhookResponse {
                    status,
                    body: String::new(),
                }
            }
        }
    }

    /// Signature check (when an app secret is set), decode, extract.
    fn accept(&self, request: &InboundRequest) -> Result<Vec<MessagingEvent>, WebhookError> {
        if let Some(secret) = self.credentials.app_secret() {
            let header = request
                .headers
                .get(webhook::SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok());
            webhook::verify_signature(secret, &request.body, header)?;
        }
        let body = webhook::decode_body(&request.body)?;
        Ok(webhook::extract_events(body))
    }

    /// "receive" once with the whole batch, then "message" per text event in order.
    pub fn dispatch(&self, events: &[MessagingEvent]) {
        if events.is_empty() {
            return;
        }
        log::debug!("webhook: dispatching {} messaging event(s)", events.len());
        self.events.emit_receive(events);
        for event in events {
            if let Some(text) = event.message_text() {
                let message = TextMessage {
                    sender: event.sender(),
                    message: text.into_owned(),
                    raw: event.clone(),
                };
                self.events.emit_message(&message);
            }
        }
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("credentials", &self.credentials)
            .field("events", &self.events)
            .field("api_base", &self.client.api_base())
            .finish()
    }
}
