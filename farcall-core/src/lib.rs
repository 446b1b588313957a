//! # farcall-core
//!
//! Foundational types for the farcall remote function call runtime.
//!
//! This crate defines everything two peers must agree on before a single
//! call crosses the channel: the wire frames, the error record format, the
//! pluggable frame codec, and the time abstraction used by timed waits.
//! The communicator machinery lives in the `farcall` crate on top of these.
//!
//! ## Wire protocol
//!
//! The channel carries exactly two frame shapes, discriminated by field
//! presence: a frame carrying a `listener` string is a call, anything else
//! is a return:
//!
//! ```text
//! call:   { "uid": 7, "listener": "math.add",
//!           "parameters": [ { "type": "number", "value": 2 },
//!                           { "type": "number", "value": 3 } ] }
//! return: { "uid": 7, "success": true, "value": 5 }
//! ```
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Invoke`] | Sum of the two frame shapes |
//! | [`ErrorRecord`] | Transport-safe rendering of a failure |
//! | [`MessageCodec`] / [`JsonCodec`] | Pluggable frame serialization |
//! | [`TimeProvider`] / [`TokioTimeProvider`] | Sleep, now, timeout |

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

mod codec;
mod invoke;
mod record;
mod time;

// Codec exports
pub use codec::{CodecError, JsonCodec, MessageCodec};

// Wire model exports
pub use invoke::{Invoke, InvokeFunction, InvokeParameter, InvokeReturn};

// Error record exports
pub use record::ErrorRecord;

// Time provider exports
pub use time::{TimeError, TimeProvider, TokioTimeProvider};
