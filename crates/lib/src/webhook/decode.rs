//! Raw request body to JSON.

use crate::error::DecodeError;
use serde_json::Value;

/// UTF-8 first, then JSON. Any valid JSON value is accepted; shape is checked later.
pub fn decode_body(body: &[u8]) -> Result<Value, DecodeError> {
    let text = std::str::from_utf8(body)?;
    Ok(serde_json::from_str(text)?)
}
