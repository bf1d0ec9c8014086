//! Pull messaging events out of a decoded webhook body.

use crate::messenger::MessagingEvent;
use serde_json::Value;

/// Events under `entry[0].messaging`, in delivery order.
///
/// Only the first entry is read. A missing `entry`, an empty `entry`, or a missing or
/// non-array `messaging` yields no events.
pub fn extract_events(mut body: Value) -> Vec<MessagingEvent> {
    match body.pointer_mut("/entry/0/messaging").map(Value::take) {
        Some(Value::Array(events)) => events.into_iter().map(MessagingEvent::from_value).collect(),
        _ => Vec::new(),
    }
}
