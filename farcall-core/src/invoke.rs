//! Wire model for call and return frames.
//!
//! The discriminant between the two shapes is field presence: a frame with a
//! `listener` string is a call, anything else is a return. [`Invoke`] keeps
//! that rule implicit through `#[serde(untagged)]`, so the serializer never
//! emits a `listener` field on returns and deserialization recovers the
//! correct variant from the fields alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A wire frame: call request or call response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Invoke {
    /// Call request; carries the `listener` path.
    Function(InvokeFunction),
    /// Call response; settles the call with the matching uid.
    Return(InvokeReturn),
}

impl Invoke {
    /// The correlation uid carried by either frame shape.
    pub fn uid(&self) -> u64 {
        match self {
            Invoke::Function(function) => function.uid,
            Invoke::Return(ret) => ret.uid,
        }
    }
}

/// Call request: invoke a function of the remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeFunction {
    /// Correlation uid, unique among the sending peer's outstanding calls.
    ///
    /// Kept within 2^53 in practice so that JSON-number peers can represent
    /// it losslessly.
    pub uid: u64,
    /// Dot-separated member path resolved against the remote provider.
    pub listener: String,
    /// Positional arguments.
    pub parameters: Vec<InvokeParameter>,
}

/// One positional argument of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeParameter {
    /// Primitive-category token of the argument (`"number"`, `"string"`,
    /// `"boolean"`, `"object"`). Preserved for debugging only; the callee
    /// ignores it.
    #[serde(rename = "type")]
    pub kind: String,
    /// The argument value itself.
    pub value: Value,
}

impl InvokeParameter {
    /// Wrap an argument value, deriving its category token.
    pub fn of(value: Value) -> Self {
        Self {
            kind: primitive_category(&value).to_owned(),
            value,
        }
    }
}

/// Category token of a JSON value, after the JavaScript `typeof`
/// vocabulary: `null`, arrays and maps are all `"object"`.
fn primitive_category(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Call response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeReturn {
    /// Correlation uid of the call being answered.
    pub uid: u64,
    /// `true` for a normal return, `false` when `value` is a failure value.
    pub success: bool,
    /// The return value on success, the serialized failure otherwise.
    #[serde(default)]
    pub value: Value,
}
