//! Messenger platform: wire types and the outbound Send API client.

mod client;
mod protocol;

pub use client::{MessengerClient, DEFAULT_API_BASE};
pub use protocol::{
    Entry, Identity, MessagingEvent, OutboundMessage, SendResponse, UserProfile, WebhookEnvelope,
};
