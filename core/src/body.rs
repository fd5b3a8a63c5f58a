//! Request and response body codec.
//!
//! Bodies travel through the client as `serde_json::Value` so transforms can
//! edit them in place. `Value::Null` stands for "no body".

use serde_json::Value;

use crate::error::Error;

/// Turn a body into the text handed to the transport.
///
/// In JSON mode the value is serialized. Otherwise strings go out verbatim
/// and any other value falls back to its JSON text.
pub fn encode(body: &Value, json: bool) -> Result<Option<String>, Error> {
    match body {
        Value::Null => Ok(None),
        Value::String(text) if !json => Ok(Some(text.clone())),
        other => serde_json::to_string(other)
            .map(Some)
            .map_err(|e| Error::InvalidArgument(format!("request body cannot be encoded: {e}"))),
    }
}

/// Turn response text into a body value.
///
/// In JSON mode text that does not parse is kept as a string.
pub fn decode(text: &str, json: bool) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if json {
        if let Ok(value) = serde_json::from_str(text) {
            return value;
        }
    }
    Value::String(text.to_string())
}
