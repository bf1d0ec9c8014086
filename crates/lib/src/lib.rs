//! Messenger bot library — webhook verification and dispatch, notification bus,
//! outbound Send API client, and the HTTP listener used by the CLI.

pub mod bot;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod init;
pub mod messenger;
pub mod server;
pub mod webhook;

pub use bot::{Bot, InboundRequest, WebhookResponse};
pub use credentials::Credentials;
pub use error::{CredentialsError, DecodeError, SendError, WebhookError};
pub use events::{EventKind, TextMessage};
pub use messenger::{Identity, MessagingEvent, MessengerClient};
