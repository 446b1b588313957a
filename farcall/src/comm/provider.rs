//! Provider object model: the locally-exposed function tree.
//!
//! Rust has no runtime attribute interception, so the provider is an
//! explicit tree of named members: objects holding further members, and
//! functions taking the decoded argument vector. Anything may be
//! registered; the access rules are enforced by the dispatch engine at call
//! time, not at registration.
//!
//! # Example
//!
//! ```rust
//! use farcall::{CallFault, ProviderObject};
//! use serde_json::{Value, json};
//!
//! let provider = ProviderObject::new()
//!     .function("echo", |mut args: Vec<Value>| async move {
//!         Ok(args.pop().unwrap_or(Value::Null))
//!     })
//!     .object(
//!         "math",
//!         ProviderObject::new().function("add", |args: Vec<Value>| async move {
//!             let a = args[0].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
//!             let b = args[1].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
//!             Ok(json!(a + b))
//!         }),
//!     );
//! assert_eq!(provider.len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use farcall_core::ErrorRecord;
use futures::future::LocalBoxFuture;
use serde_json::Value;

/// Failure raised by a provider function.
#[derive(Debug, Clone, PartialEq)]
pub enum CallFault {
    /// An error; serialized into a plain record before crossing the wire.
    Error(ErrorRecord),
    /// A non-error value; passed through to the caller unchanged.
    Value(Value),
}

impl CallFault {
    /// Shorthand for a plain `"Error"`-named fault.
    pub fn error(message: impl Into<String>) -> Self {
        CallFault::Error(ErrorRecord::error(message))
    }

    /// The transport-safe value sent in a negative return.
    pub fn into_value(self) -> Value {
        match self {
            CallFault::Error(record) => record.to_value(),
            CallFault::Value(value) => value,
        }
    }
}

impl From<ErrorRecord> for CallFault {
    fn from(record: ErrorRecord) -> Self {
        CallFault::Error(record)
    }
}

/// Future returned by a provider function.
pub type ProviderFuture = LocalBoxFuture<'static, Result<Value, CallFault>>;

/// Type-erased provider function.
pub type ProviderFn = Rc<dyn Fn(Vec<Value>) -> ProviderFuture>;

/// One member of a provider tree.
#[derive(Clone)]
pub enum ProviderNode {
    /// A nested object with further members.
    Object(ProviderObject),
    /// A callable function.
    Function(ProviderFn),
}

impl fmt::Debug for ProviderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderNode::Object(object) => fmt::Debug::fmt(object, f),
            ProviderNode::Function(_) => f.write_str("<function>"),
        }
    }
}

/// The object a peer exposes for remote invocation.
///
/// Built with the chainable [`function`](Self::function) and
/// [`object`](Self::object) registrars, or with the
/// [`provider_object!`](crate::provider_object) macro. Members are ordered
/// by name, which keeps diagnostics stable.
#[derive(Clone, Default)]
pub struct ProviderObject {
    members: BTreeMap<String, ProviderNode>,
}

impl ProviderObject {
    /// Create an empty provider object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function member, replacing any previous member of the
    /// same name.
    pub fn function<F, Fut>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value, CallFault>> + 'static,
    {
        let function: ProviderFn = Rc::new(move |arguments| Box::pin(function(arguments)));
        self.members
            .insert(name.into(), ProviderNode::Function(function));
        self
    }

    /// Register a nested object member.
    pub fn object(mut self, name: impl Into<String>, object: ProviderObject) -> Self {
        self.members.insert(name.into(), ProviderNode::Object(object));
        self
    }

    /// Look up a direct member.
    pub fn get(&self, name: &str) -> Option<&ProviderNode> {
        self.members.get(name)
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the object has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for ProviderObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.members.iter()).finish()
    }
}
