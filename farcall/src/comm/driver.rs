//! Driver: the virtual remote object for outbound calls.
//!
//! A driver turns member paths into remote calls without any knowledge of
//! the remote interface. `driver.path("math.add")` materializes a handle;
//! calling the handle sends a call frame with `listener = "math.add"` and
//! one parameter per argument. [`RemoteFunction::member`] extends the path
//! the way attribute access would, so handles compose freely.
//!
//! Handles hold no state beyond the path string and the communicator they
//! close over: two handles for the same chain are interchangeable.
//!
//! See also the [`remote_call!`](crate::remote_call) macro, which restores
//! the chained-attribute spelling at compile time.

use std::rc::Rc;

use farcall_core::InvokeParameter;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::communicator::Communicator;
use crate::error::CallError;

/// Virtual object whose member invocations are forwarded to the remote
/// provider.
#[derive(Clone)]
pub struct Driver {
    comm: Rc<Communicator>,
}

impl Driver {
    pub(crate) fn new(comm: Rc<Communicator>) -> Self {
        Self { comm }
    }

    /// Materialize a handle for a dot-separated member path.
    pub fn path(&self, listener: impl Into<String>) -> RemoteFunction {
        RemoteFunction {
            comm: Rc::clone(&self.comm),
            listener: listener.into(),
        }
    }
}

/// Handle addressing one remote member path.
#[derive(Clone)]
pub struct RemoteFunction {
    comm: Rc<Communicator>,
    listener: String,
}

impl RemoteFunction {
    /// Extend the path by one member, as attribute access would.
    pub fn member(&self, name: &str) -> RemoteFunction {
        RemoteFunction {
            comm: Rc::clone(&self.comm),
            listener: format!("{}.{}", self.listener, name),
        }
    }

    /// The dot-separated path this handle addresses.
    pub fn listener(&self) -> &str {
        &self.listener
    }

    /// Invoke the remote function with raw JSON arguments.
    ///
    /// Resolves with the remote return value, or rejects with the remote
    /// failure, a not-ready error, or the teardown error if the connection
    /// closes first.
    pub async fn call(&self, arguments: Vec<Value>) -> Result<Value, CallError> {
        let parameters = arguments.into_iter().map(InvokeParameter::of).collect();
        self.comm.call_function(&self.listener, parameters).await
    }

    /// Invoke the remote function and decode the result into `R`.
    pub async fn invoke<R: DeserializeOwned>(&self, arguments: Vec<Value>) -> Result<R, CallError> {
        let value = self.call(arguments).await?;
        serde_json::from_value(value).map_err(|error| CallError::Decode {
            message: error.to_string(),
        })
    }
}
