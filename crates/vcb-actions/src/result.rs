//! Successful action outcome.

use std::time::Duration;

use serde_json::Value;

/// Value returned by a handler plus execution metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    /// Action that produced the value.
    pub action_id: String,
    /// The handler's return value.
    pub value: Value,
    /// Wall-clock execution time.
    pub duration: Duration,
}

impl ActionResult {
    /// User-facing feedback message.
    ///
    /// A string result is its own message; an object result contributes its
    /// `message` field. Anything else has no message.
    pub fn message(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("message").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The handler's reported `status`, defaulting to `"success"`.
    pub fn status(&self) -> &str {
        self.value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("success")
    }

    /// Failure the handler reported in its return value.
    ///
    /// An object carrying an `error` key, or `status: "error"`, is a failure
    /// even though the handler returned normally. The message prefers
    /// `message`, then a string `error`.
    pub fn reported_error(&self) -> Option<String> {
        let Value::Object(map) = &self.value else {
            return None;
        };
        if !map.contains_key("error") && self.status() != "error" {
            return None;
        }
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| map.get("error").and_then(Value::as_str))
            .map_or_else(
                || format!("Error executing action '{}'.", self.action_id),
                str::to_owned,
            );
        Some(message)
    }

    /// Consume the result, keeping only the handler's value.
    pub fn into_value(self) -> Value {
        self.value
    }
}
