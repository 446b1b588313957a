//! Error types for the farcall communicator.
//!
//! Three surfaces, three types:
//! - [`NotReadyError`] is raised synchronously when a call or join is
//!   attempted on a communicator whose gate is not ready.
//! - [`CallError`] is the rejection value of an outbound call: the remote
//!   peer's failure, a teardown, or a local decode problem.
//! - [`TransmitError`] is what [`Transmit`](crate::Transmit) implementations
//!   report when delivery fails.
//!
//! Dispatch-side faults never appear here: they travel back to the caller as
//! negative return frames, not as Rust errors.

use farcall_core::ErrorRecord;
use serde_json::Value;

/// Raised synchronously when an operation is attempted on a communicator
/// that is not ready to issue calls.
///
/// Produced by [`ReadyGate`](crate::ReadyGate) implementations. Carries the
/// concrete connector name and the operation that triggered the check, so
/// the message reads e.g.
/// `Error on WebSocketConnector.call(): connect first.`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error on {connector}.{method}(): {hint}")]
pub struct NotReadyError {
    /// Concrete connector (or communicator) type name.
    pub connector: String,
    /// The operation that failed the readiness check.
    pub method: String,
    /// Human-readable state hint.
    pub hint: String,
}

/// Rejection value of an outbound remote call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// The communicator was not ready; nothing was transmitted.
    #[error(transparent)]
    NotReady(#[from] NotReadyError),

    /// The remote peer reported a failure (`success = false`).
    ///
    /// Carries the peer's failure value verbatim: an error record
    /// (`{ name, message, stack, .. }`) when the remote function failed with
    /// an error, or the raw thrown value otherwise.
    #[error("remote function failed: {0}")]
    Remote(Value),

    /// The connection was torn down, or the send failed, while the call was
    /// outstanding.
    #[error("{}", .0.message)]
    Disconnected(ErrorRecord),

    /// The return value could not be decoded into the requested type.
    #[error("failed to decode return value: {message}")]
    Decode {
        /// Decoder diagnostic.
        message: String,
    },
}

impl CallError {
    /// The remote failure value, if this is a [`CallError::Remote`].
    pub fn remote_value(&self) -> Option<&Value> {
        match self {
            CallError::Remote(value) => Some(value),
            _ => None,
        }
    }
}

/// Errors a [`Transmit`](crate::Transmit) implementation may report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransmitError {
    /// The underlying channel is closed.
    #[error("channel closed")]
    Closed,
    /// The frame could not be encoded for the wire.
    #[error("encode failed: {0}")]
    Encode(String),
    /// Transport-specific delivery failure.
    #[error("transport error: {0}")]
    Transport(String),
}
