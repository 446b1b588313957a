//! Transport-safe error records.
//!
//! A failure that crosses the channel is flattened into a plain record with
//! `name`, `message`, an optional `stack`, and whatever extra fields the
//! thrower attached. The receiving peer surfaces the record verbatim as the
//! rejection value; it never reconstructs a live error object.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plain, serializable rendering of a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Error class name (`"Error"` unless the thrower says otherwise).
    pub name: String,
    /// Human-readable description.
    pub message: String,
    /// Optional stack or cause-chain rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Additional own fields carried alongside the standard three.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorRecord {
    /// Create a record with an explicit name.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
            extra: Map::new(),
        }
    }

    /// Create a plain `"Error"`-named record.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    /// Render any [`std::error::Error`] into a record.
    ///
    /// The message is the error's `Display` output; the source chain, if
    /// any, is recorded in `stack`.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            name: "Error".to_owned(),
            message: error.to_string(),
            stack: if causes.is_empty() {
                None
            } else {
                Some(causes.join("\n"))
            },
            extra: Map::new(),
        }
    }

    /// Attach an extra own field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The record as a JSON value, ready to travel in a negative return.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_owned(), Value::String(self.name.clone()));
        map.insert("message".to_owned(), Value::String(self.message.clone()));
        if let Some(stack) = &self.stack {
            map.insert("stack".to_owned(), Value::String(stack.clone()));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}
