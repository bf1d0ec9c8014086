//! Webhook pipeline stages: subscription verification, body decoding, event extraction.
//!
//! Each stage is a plain function returning a value or a `Result`; [`crate::bot::Bot::handle`]
//! threads them together and is the single place where failures become responses.

mod decode;
mod extract;
mod verify;

pub use decode::decode_body;
pub use extract::extract_events;
pub use verify::{
    verify_signature, verify_subscription, Verification, CHALLENGE_PARAM, SIGNATURE_HEADER,
    VERIFY_TOKEN_PARAM, WRONG_TOKEN_BODY,
};
