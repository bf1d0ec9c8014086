//! Notification bus owned by the bot: subscriber lists for "receive", "message" and "error".
//!
//! Subscribers are registered before the bot is shared, so dispatch reads the lists without
//! locking. Handlers run synchronously in subscription order; a panicking handler is not caught.

use crate::error::WebhookError;
use crate::messenger::{Identity, MessagingEvent};
use std::fmt;

/// A messaging event whose `message.text` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessage {
    /// `None` when the event has no usable `sender.id`.
    pub sender: Option<Identity>,
    pub message: String,
    pub raw: MessagingEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Receive,
    Message,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Receive => "receive",
            EventKind::Message => "message",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ReceiveHandler = Box<dyn Fn(&[MessagingEvent]) + Send + Sync>;
pub type MessageHandler = Box<dyn Fn(&TextMessage) + Send + Sync>;
pub type ErrorHandler = Box<dyn Fn(&WebhookError) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    receive: Vec<ReceiveHandler>,
    message: Vec<MessageHandler>,
    error: Vec<ErrorHandler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_receive<F>(&mut self, handler: F)
    where
        F: Fn(&[MessagingEvent]) + Send + Sync + 'static,
    {
        self.receive.push(Box::new(handler));
    }

    pub fn on_message<F>(&mut self, handler: F)
    where
        F: Fn(&TextMessage) + Send + Sync + 'static,
    {
        self.message.push(Box::new(handler));
    }

    pub fn on_error<F>(&mut self, handler: F)
    where
        F: Fn(&WebhookError) + Send + Sync + 'static,
    {
        self.error.push(Box::new(handler));
    }

    pub fn emit_receive(&self, events: &[MessagingEvent]) {
        for h in &self.receive {
            h(events);
        }
    }

    pub fn emit_message(&self, message: &TextMessage) {
        for h in &self.message {
            h(message);
        }
    }

    pub fn emit_error(&self, error: &WebhookError) {
        for h in &self.error {
            h(error);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("receive", &self.receive.len())
            .field("message", &self.message.len())
            .field("error", &self.error.len())
            .finish()
    }
}
